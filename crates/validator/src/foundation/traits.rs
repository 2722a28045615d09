//! Core traits for the validation system
//!
//! [`Validate`] is the seam every function validator implements, whether it
//! is a leaf check, a composer with declared props, or a middleware.

use std::fmt;
use std::marker::PhantomData;

use serde_json::Value;

use crate::combinators::format_result;
use crate::foundation::{Context, IntoOutcome, Outcome, ValidationResult, Validator, ValidatorError};

// ============================================================================
// CORE VALIDATOR TRAIT
// ============================================================================

/// A function validator: `(value, context) -> outcome`.
///
/// Returning `Ok` with an invalid outcome is the ordinary way to reject a
/// value. `Err` is reserved for conditions under which no result can be
/// produced, such as a missing mandatory property.
///
/// # Examples
///
/// ```rust,ignore
/// use keel_validator::foundation::{Context, Outcome, Validate, ValidatorError};
/// use serde_json::Value;
///
/// struct NotBlank;
///
/// impl Validate for NotBlank {
///     fn validate(&self, value: &Value, _: &Context) -> Result<Outcome, ValidatorError> {
///         Ok(Outcome::Valid(value.as_str().is_some_and(|s| !s.trim().is_empty())))
///     }
/// }
/// ```
pub trait Validate: Send + Sync {
    /// Produces the raw outcome for `value`.
    ///
    /// Implementations must not mutate `value` or `context`.
    fn validate(&self, value: &Value, context: &Context) -> Result<Outcome, ValidatorError>;
}

// ============================================================================
// CLOSURE ADAPTER
// ============================================================================

/// Adapts a closure into a [`Validate`] implementation.
///
/// Created by [`Validator::from_fn`].
pub struct FnValidator<F, O> {
    check: F,
    _outcome: PhantomData<fn() -> O>,
}

impl<F, O> FnValidator<F, O>
where
    F: Fn(&Value, &Context) -> O + Send + Sync,
    O: IntoOutcome,
{
    /// Wraps `check`.
    pub fn new(check: F) -> Self {
        Self {
            check,
            _outcome: PhantomData,
        }
    }
}

impl<F, O> Validate for FnValidator<F, O>
where
    F: Fn(&Value, &Context) -> O + Send + Sync,
    O: IntoOutcome,
{
    fn validate(&self, value: &Value, context: &Context) -> Result<Outcome, ValidatorError> {
        (self.check)(value, context).into_outcome()
    }
}

impl<F, O> fmt::Debug for FnValidator<F, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnValidator")
    }
}

// ============================================================================
// EXTENSION TRAIT
// ============================================================================

/// Extension methods for anything that converts into a [`Validator`].
pub trait ValidatorExt: Into<Validator> + Sized {
    /// Post-processes every result of this validator with `formatter`,
    /// including the resolved form of a deferred result.
    ///
    /// ```rust,ignore
    /// let validator = every(vec![required(), min_length(5)])
    ///     .formatted(|result| {
    ///         let failed = result.every.iter().flatten().filter(|r| !r.is_valid).count();
    ///         result.with_field("failed", failed)
    ///     });
    /// ```
    fn formatted<F>(self, formatter: F) -> Validator
    where
        F: Fn(ValidationResult) -> ValidationResult + Send + Sync + 'static,
    {
        format_result(formatter, self)
    }
}

impl<T: Into<Validator>> ValidatorExt for T {}
