//! # keel-validator
//!
//! A composable validation engine over JSON values with a two-phase
//! (immediate, then deferred) result model.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use keel_validator::prelude::*;
//!
//! // Sequences run in order and stop at the first invalid child.
//! let username = vec![required(), min_length(5)];
//! let result = validate(&username.into(), &json!("abc"), &Context::new())?;
//! assert!(!result.is_valid);
//! assert_eq!(result.field("length"), Some(&json!(3)));
//!
//! // Field maps validate every member of an object.
//! let person: Validator = fields! { "first" => required(), "last" => required() }.into();
//! let result = validate(&person, &json!({"first": "", "last": "B"}), &Context::new())?;
//! assert!(!result.props.unwrap()["first"].is_valid);
//! ```
//!
//! ## Deferred Validation
//!
//! A validator may return work that cannot finish synchronously. The
//! immediate result is then invalid and carries a
//! [`DeferredHandle`](foundation::DeferredHandle); resolving it finishes the
//! remaining work and rejects with a staleness error if the watched value
//! changed in the meantime. See [`foundation`] for the full model.
//!
//! ## Modules
//!
//! - [`foundation`]: results, outcomes, context, the dispatcher
//! - [`combinators`]: [`every`](combinators::every),
//!   [`props`](combinators::props), [`format_result`](combinators::format_result)
//! - [`validators`]: built-in leaves (feature `leaves`, on by default)
//! - [`schema`]: building validators from JSON descriptions

pub mod combinators;
pub mod foundation;
mod macros;
pub mod prelude;
pub mod schema;
#[cfg(feature = "leaves")]
pub mod validators;

pub use indexmap;
pub use serde_json;
