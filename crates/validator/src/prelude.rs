//! Prelude module for convenient imports.
//!
//! Provides a single `use keel_validator::prelude::*;` import that brings
//! in the engine entry points, the composers and the built-in leaves.
//!
//! # Examples
//!
//! ```rust,ignore
//! use keel_validator::prelude::*;
//!
//! let username = every(vec![required(), length(3, 20)]);
//! let age = vec![required(), range(18.0, 130.0)];
//! let signup = props(fields! { "username" => username, "age" => age });
//! ```

// ============================================================================
// FOUNDATION: Engine types and entry points
// ============================================================================

pub use crate::foundation::{
    Context, Deferred, DeferredHandle, IntoOutcome, Outcome, PropsSource, Validate, ValidationConfig,
    ValidationResult, Validator, ValidatorError, ValidatorExt, validate, validate_async, validate_async_watching,
};

// ============================================================================
// COMBINATORS: Composers and middleware
// ============================================================================

pub use crate::combinators::{Every, Formatted, Props, every, format_result, props, validation_errors};

// ============================================================================
// LEAVES-GATED: Built-in leaf validators
// ============================================================================

#[cfg(feature = "leaves")]
#[allow(clippy::wildcard_imports)]
pub use crate::validators::*;

// ============================================================================
// DECLARATIVE
// ============================================================================

pub use crate::fields;
pub use crate::schema::Registry;

pub use serde_json::{Value, json};
