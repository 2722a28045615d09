//! Error types for the validation engine
//!
//! A validator reporting "invalid" is **not** an error: that is an ordinary
//! [`ValidationResult`] with `is_valid == false`. The variants here are the
//! conditions under which a result cannot be produced at all, plus the
//! staleness signal raised by the deferred-resolution guard.
//!
//! # Examples
//!
//! ```rust,ignore
//! use keel_validator::foundation::ValidatorError;
//!
//! match handle.resolve_watching(accessor).await {
//!     Ok(result) => apply(result),
//!     Err(err) if err.is_stale() => {} // superseded by a newer validation
//!     Err(err) => return Err(err),
//! }
//! ```

use std::borrow::Cow;

use crate::foundation::ValidationResult;

// ============================================================================
// VALIDATOR ERROR
// ============================================================================

/// Fatal validation conditions and the staleness signal.
///
/// `Clone` is required because errors travel through shared deferred
/// computations that may be awaited more than once.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum ValidatorError {
    /// The validator description is neither a function, an ordered
    /// sequence, nor a field map.
    #[error("validator must be a function, an ordered sequence, or a field map; found {found}")]
    InvalidValidatorShape {
        /// Description of what was found instead.
        found: Cow<'static, str>,
    },

    /// A leaf validator was invoked without a mandatory property.
    #[error("the `{validator}` validator requires a `{property}` property")]
    MissingRequiredProperty {
        /// Name of the leaf validator.
        validator: Cow<'static, str>,
        /// Name of the missing property.
        property: Cow<'static, str>,
    },

    /// A deferred outcome resolved to something that cannot be normalized.
    #[error("deferred outcome could not be interpreted: {reason}")]
    MalformedAsyncResult {
        /// What was wrong with the outcome.
        reason: Cow<'static, str>,
    },

    /// The value changed while a deferred validation was pending.
    ///
    /// This is an expected signal: a newer validation superseded the one
    /// that produced it. Carries the result the handle was attached to.
    #[error("validation of a superseded value was discarded")]
    StaleValidationResult {
        /// The partial result the stale handle belonged to.
        result: Box<ValidationResult>,
    },

    /// Failure reported by a leaf validator (typically an I/O-backed check).
    #[error("[{code}] {message}")]
    Custom {
        /// Machine-readable code.
        code: Cow<'static, str>,
        /// Human-readable message.
        message: Cow<'static, str>,
    },
}

// ============================================================================
// CONSTRUCTOR HELPERS
// ============================================================================

impl ValidatorError {
    /// Creates an `InvalidValidatorShape` error.
    pub fn invalid_shape(found: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidValidatorShape {
            found: found.into(),
        }
    }

    /// Creates a `MissingRequiredProperty` error.
    pub fn missing_property(
        validator: impl Into<Cow<'static, str>>,
        property: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::MissingRequiredProperty {
            validator: validator.into(),
            property: property.into(),
        }
    }

    /// Creates a `MalformedAsyncResult` error.
    pub fn malformed(reason: impl Into<Cow<'static, str>>) -> Self {
        Self::MalformedAsyncResult {
            reason: reason.into(),
        }
    }

    /// Creates a `StaleValidationResult` error carrying the superseded result.
    pub fn stale(result: ValidationResult) -> Self {
        Self::StaleValidationResult {
            result: Box::new(result),
        }
    }

    /// Creates a custom leaf failure.
    pub fn custom(code: impl Into<Cow<'static, str>>, message: impl Into<Cow<'static, str>>) -> Self {
        Self::Custom {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Returns `true` for the staleness signal.
    ///
    /// Callers should treat a stale rejection as "ignore", not as a crash.
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::StaleValidationResult { .. })
    }

    /// Returns the superseded result if this is the staleness signal.
    pub fn stale_result(&self) -> Option<&ValidationResult> {
        match self {
            Self::StaleValidationResult { result } => Some(result),
            _ => None,
        }
    }
}
