//! Core validation types and traits
//!
//! This module contains the engine itself; composers live in
//! [`combinators`](crate::combinators) and leaf checks in
//! [`validators`](crate::validators).
//!
//! - **Shapes**: [`Validator`], [`Validate`]
//! - **Results**: [`Outcome`], [`ValidationResult`], [`DeferredHandle`]
//! - **Ambient**: [`Context`], [`ValidationConfig`], [`ValidatorError`]
//!
//! # Two-phase results
//!
//! [`validate`] always returns immediately. When some child could not finish
//! synchronously the result is invalid and carries a [`DeferredHandle`];
//! the caller drives the remaining work by invoking it:
//!
//! ```rust,ignore
//! use keel_validator::prelude::*;
//!
//! let result = validate(&username, &json!("marty"), &Context::new())?;
//! let result = match result.deferred() {
//!     Some(handle) => handle.resolve().await?,
//!     None => result,
//! };
//! ```
//!
//! [`validate_async`] does exactly this.

pub mod config;
pub mod context;
pub mod deferred;
pub mod error;
pub mod normalize;
pub mod outcome;
pub mod result;
pub mod traits;
pub mod validator;

pub use config::ValidationConfig;
pub use context::{Context, PropsSource};
pub use deferred::{DeferredHandle, ValueAccessor};
pub use error::ValidatorError;
pub use normalize::normalize;
pub use outcome::{Deferred, IntoOutcome, Outcome};
pub use result::{DEFERRED_MARKER, RESERVED_KEYS, ValidationResult, merge_layers};
pub use traits::{FnValidator, Validate, ValidatorExt};
pub use validator::{Validator, validate, validate_async, validate_async_watching};
