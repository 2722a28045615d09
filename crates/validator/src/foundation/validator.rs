//! Validator shapes and the dispatcher
//!
//! A [`Validator`] is one of three shapes: a function, an ordered sequence
//! (sequential composition) or a field map (structural composition).
//! [`validate`] pattern-matches on the shape at every composition level, so
//! children may be written as bare sequences and maps instead of explicit
//! composer calls.
//!
//! ```rust,ignore
//! use keel_validator::prelude::*;
//!
//! let person: Validator = fields! {
//!     "name" => vec![required(), min_length(2)],
//!     "address" => fields! { "city" => required() },
//! }
//! .into();
//! let result = validate(&person, &json!({"name": "Al", "address": {}}), &Context::new())?;
//! assert!(!result.is_valid);
//! ```

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::combinators::{every, props};
use crate::foundation::normalize::normalize;
use crate::foundation::{
    Context, FnValidator, IntoOutcome, PropsSource, Validate, ValidationResult, ValidatorError, ValueAccessor,
};

// ============================================================================
// VALIDATOR
// ============================================================================

/// A validator in one of its three shapes.
///
/// Cloning is cheap; all shapes share their contents.
#[derive(Clone)]
pub enum Validator {
    /// Invoked directly; its outcome is normalized.
    Function(Arc<dyn Validate>),
    /// Runs every child against the same value, in order.
    Sequence(Arc<[Validator]>),
    /// Runs one child per named field of a composite value.
    FieldMap(Arc<IndexMap<String, Validator>>),
}

impl Validator {
    /// Wraps a [`Validate`] implementation.
    pub fn new<V>(validator: V) -> Self
    where
        V: Validate + 'static,
    {
        Self::Function(Arc::new(validator))
    }

    /// Wraps a closure whose return value converts into an outcome.
    ///
    /// ```rust,ignore
    /// let even = Validator::from_fn(|value, _| value.as_i64().map(|n| n % 2 == 0));
    /// ```
    pub fn from_fn<F, O>(check: F) -> Self
    where
        F: Fn(&Value, &Context) -> O + Send + Sync + 'static,
        O: IntoOutcome + 'static,
    {
        Self::new(FnValidator::new(check))
    }

    /// Builds an ordered sequence.
    pub fn sequence<I>(children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Validator>,
    {
        Self::Sequence(children.into_iter().map(Into::into).collect())
    }

    /// Builds a field map.
    pub fn field_map<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Validator)>,
        K: Into<String>,
    {
        Self::FieldMap(Arc::new(
            fields.into_iter().map(|(name, validator)| (name.into(), validator)).collect(),
        ))
    }

    /// Name of the shape, for diagnostics.
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Function(_) => "function",
            Self::Sequence(_) => "sequence",
            Self::FieldMap(_) => "field map",
        }
    }

    /// Validates `value`; see [`validate`].
    pub fn validate(&self, value: &Value, context: &Context) -> Result<ValidationResult, ValidatorError> {
        validate(self, value, context)
    }

    /// Validates `value` and resolves any deferred work; see [`validate_async`].
    pub async fn validate_async(&self, value: &Value, context: &Context) -> Result<ValidationResult, ValidatorError> {
        validate_async(self, value, context).await
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function(_) => f.write_str("Validator::Function"),
            Self::Sequence(children) => f.debug_tuple("Validator::Sequence").field(children).finish(),
            Self::FieldMap(fields) => f.debug_tuple("Validator::FieldMap").field(fields).finish(),
        }
    }
}

impl From<Vec<Validator>> for Validator {
    fn from(children: Vec<Validator>) -> Self {
        Self::Sequence(children.into())
    }
}

impl<const N: usize> From<[Validator; N]> for Validator {
    fn from(children: [Validator; N]) -> Self {
        Self::Sequence(Arc::from(children.to_vec()))
    }
}

impl From<IndexMap<String, Validator>> for Validator {
    fn from(fields: IndexMap<String, Validator>) -> Self {
        Self::FieldMap(Arc::new(fields))
    }
}

impl From<Arc<dyn Validate>> for Validator {
    fn from(validator: Arc<dyn Validate>) -> Self {
        Self::Function(validator)
    }
}

// ============================================================================
// ENTRY POINTS
// ============================================================================

/// Validates `value`, returning immediately.
///
/// The result may carry a deferred handle if some child could not finish
/// synchronously; see [`ValidationResult::deferred`].
///
/// # Errors
///
/// Fatal child errors propagate unchanged; no partial result is returned.
pub fn validate(validator: &Validator, value: &Value, context: &Context) -> Result<ValidationResult, ValidatorError> {
    match validator {
        Validator::Function(check) => {
            tracing::trace!("dispatching function validator");
            let outcome = check.validate(value, context)?;
            normalize(outcome, value, context)
        }
        Validator::Sequence(children) => {
            tracing::trace!(children = children.len(), "dispatching sequence");
            every::run(children, &PropsSource::Empty, value, context)
        }
        Validator::FieldMap(fields) => {
            tracing::trace!(fields = fields.len(), "dispatching field map");
            props::run(fields, &PropsSource::Empty, value, context)
        }
    }
}

/// Validates `value` and awaits any deferred work.
///
/// # Errors
///
/// As [`validate`], plus any error raised while resolving deferred work.
#[tracing::instrument(level = "debug", skip_all, fields(shape = validator.shape()))]
pub async fn validate_async(
    validator: &Validator,
    value: &Value,
    context: &Context,
) -> Result<ValidationResult, ValidatorError> {
    let result = validate(validator, value, context)?;
    match result.deferred() {
        Some(handle) => handle.resolve().await,
        None => Ok(result),
    }
}

/// Validates the value read from a live input and resolves deferred work
/// with the staleness guard bound to the same input.
///
/// # Errors
///
/// [`ValidatorError::StaleValidationResult`] if the live value changed
/// before or during deferred resolution. Callers should drop such results.
#[tracing::instrument(level = "debug", skip_all, fields(shape = validator.shape()))]
pub async fn validate_async_watching<A>(
    validator: &Validator,
    accessor: A,
    context: &Context,
) -> Result<ValidationResult, ValidatorError>
where
    A: Fn() -> Value + Send + Sync + 'static,
{
    let accessor: ValueAccessor = Arc::new(accessor);
    let value = accessor();
    let result = validate(validator, &value, context)?;
    match result.deferred() {
        Some(handle) => handle.resolve_with_accessor(accessor).await,
        None => Ok(result),
    }
}
