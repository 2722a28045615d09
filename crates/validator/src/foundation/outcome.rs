//! Raw validator outcomes
//!
//! A validator may answer with a boolean, a partial record, a deferred
//! computation, or a partial record together with its continuation. The
//! [`normalize`](crate::foundation::normalize) step turns any of these into a
//! canonical [`ValidationResult`].

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use serde_json::Value;

use crate::foundation::result::{DEFERRED_MARKER, truthy};
use crate::foundation::{ValidationResult, ValidatorError};

type OutcomeFuture = BoxFuture<'static, Result<Outcome, ValidatorError>>;
type OutcomeFactory = dyn Fn() -> OutcomeFuture + Send + Sync;

// ============================================================================
// OUTCOME
// ============================================================================

/// The literal answer of a validator, before normalization.
#[derive(Clone)]
pub enum Outcome {
    /// Plain validity.
    Valid(bool),
    /// A record with descriptive fields. Any handle it carries is kept.
    Record(ValidationResult),
    /// Work that has not completed yet.
    Deferred(Deferred),
    /// An immediate partial record plus the work that will replace it.
    Pending(ValidationResult, Deferred),
}

impl Outcome {
    /// Interprets a loosely-typed JSON outcome.
    ///
    /// `null`/`false` are invalid, `true` is valid, and an object is a record
    /// whose `is_valid` key is coerced by truthiness. Anything else, or an
    /// object that claims to carry a continuation, is malformed.
    pub fn from_json(value: Value) -> Result<Self, ValidatorError> {
        match value {
            Value::Null => Ok(Self::Valid(false)),
            Value::Bool(b) => Ok(Self::Valid(b)),
            Value::Object(mut object) => {
                if object.contains_key(DEFERRED_MARKER) {
                    return Err(ValidatorError::malformed(
                        "`validate_async` must be a deferred computation, found a JSON value",
                    ));
                }
                let is_valid = object.remove("is_valid").is_some_and(|v| truthy(&v));
                object.remove("value");
                Ok(Self::Record(ValidationResult::new(is_valid).with_fields(object)))
            }
            Value::Number(_) => Err(ValidatorError::malformed("expected a boolean or an object, found a number")),
            Value::String(_) => Err(ValidatorError::malformed("expected a boolean or an object, found a string")),
            Value::Array(_) => Err(ValidatorError::malformed("expected a boolean or an object, found an array")),
        }
    }
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid(b) => f.debug_tuple("Valid").field(b).finish(),
            Self::Record(r) => f.debug_tuple("Record").field(r).finish(),
            Self::Deferred(d) => f.debug_tuple("Deferred").field(d).finish(),
            Self::Pending(r, d) => f.debug_tuple("Pending").field(r).field(d).finish(),
        }
    }
}

// ============================================================================
// DEFERRED
// ============================================================================

/// A computation whose outcome is not yet known.
///
/// `Future` wraps an already-running computation; it is shared, so awaiting
/// it again yields the same outcome without re-running it. `Factory` starts a
/// fresh computation every time the continuation is invoked.
#[derive(Clone)]
pub enum Deferred {
    /// A pending computation, awaited at most once.
    Future(Shared<OutcomeFuture>),
    /// A factory producing a new computation per invocation.
    Factory(Arc<OutcomeFactory>),
}

impl Deferred {
    /// Wraps a pending future.
    pub fn future<Fut, O>(fut: Fut) -> Self
    where
        Fut: Future<Output = O> + Send + 'static,
        O: IntoOutcome,
    {
        Self::Future(async move { fut.await.into_outcome() }.boxed().shared())
    }

    /// Wraps a factory that starts the computation on demand.
    pub fn factory<F, Fut, O>(factory: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = O> + Send + 'static,
        O: IntoOutcome,
    {
        Self::Factory(Arc::new(move || {
            let fut = factory();
            async move { fut.await.into_outcome() }.boxed()
        }))
    }

    /// Starts (or re-joins) the computation.
    pub(crate) fn run(&self) -> OutcomeFuture {
        match self {
            Self::Future(shared) => shared.clone().boxed(),
            Self::Factory(factory) => factory(),
        }
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Future(_) => f.write_str("Deferred::Future(<pending>)"),
            Self::Factory(_) => f.write_str("Deferred::Factory(<function>)"),
        }
    }
}

// ============================================================================
// INTO OUTCOME
// ============================================================================

/// Conversion from the things a validator closure may return.
pub trait IntoOutcome {
    /// Converts `self` into an outcome, or reports a fatal error.
    fn into_outcome(self) -> Result<Outcome, ValidatorError>;
}

impl IntoOutcome for Outcome {
    fn into_outcome(self) -> Result<Outcome, ValidatorError> {
        Ok(self)
    }
}

impl IntoOutcome for bool {
    fn into_outcome(self) -> Result<Outcome, ValidatorError> {
        Ok(Outcome::Valid(self))
    }
}

impl IntoOutcome for ValidationResult {
    fn into_outcome(self) -> Result<Outcome, ValidatorError> {
        Ok(Outcome::Record(self))
    }
}

impl IntoOutcome for Deferred {
    fn into_outcome(self) -> Result<Outcome, ValidatorError> {
        Ok(Outcome::Deferred(self))
    }
}

impl IntoOutcome for Value {
    fn into_outcome(self) -> Result<Outcome, ValidatorError> {
        Outcome::from_json(self)
    }
}

/// An absent outcome is invalid.
impl<T: IntoOutcome> IntoOutcome for Option<T> {
    fn into_outcome(self) -> Result<Outcome, ValidatorError> {
        match self {
            Some(inner) => inner.into_outcome(),
            None => Ok(Outcome::Valid(false)),
        }
    }
}

impl<T: IntoOutcome> IntoOutcome for Result<T, ValidatorError> {
    fn into_outcome(self) -> Result<Outcome, ValidatorError> {
        self.and_then(IntoOutcome::into_outcome)
    }
}
