//! Result formatting middleware
//!
//! Wraps a validator so that every result it produces passes through a
//! formatter: the immediate result, and again the resolved result when the
//! immediate one is pending. The formatter may add or rewrite descriptive
//! fields but cannot change `value`. A pending result keeps its handle and
//! stays invalid whatever the formatter returns.
//!
//! ```rust,ignore
//! use keel_validator::prelude::*;
//!
//! let signup = format_result(validation_errors, fields! {
//!     "name" => required(),
//!     "email" => vec![required(), pattern(email_regex)],
//! });
//! let result = validate(&signup, &json!({"name": ""}), &Context::new())?;
//! // [{"prop_name": "name", "is_valid": false, ...}, {"prop_name": "email", ...}]
//! println!("{}", result.field("validation_errors").unwrap());
//! ```

use std::fmt;
use std::sync::Arc;

use serde_json::{Value, json};

use crate::foundation::{Context, Outcome, Validate, ValidationResult, Validator, ValidatorError, validate};

type Formatter = dyn Fn(ValidationResult) -> ValidationResult + Send + Sync;

// ============================================================================
// FORMATTED VALIDATOR
// ============================================================================

/// A validator whose results are post-processed by a formatter.
#[derive(Clone)]
pub struct Formatted {
    formatter: Arc<Formatter>,
    inner: Validator,
}

impl Formatted {
    /// Wraps `inner` with `formatter`.
    pub fn new<F>(formatter: F, inner: impl Into<Validator>) -> Self
    where
        F: Fn(ValidationResult) -> ValidationResult + Send + Sync + 'static,
    {
        Self {
            formatter: Arc::new(formatter),
            inner: inner.into(),
        }
    }

    /// Returns the wrapped validator.
    pub fn inner(&self) -> &Validator {
        &self.inner
    }
}

impl Validate for Formatted {
    fn validate(&self, value: &Value, context: &Context) -> Result<Outcome, ValidatorError> {
        let result = validate(&self.inner, value, context)?;
        Ok(Outcome::Record(apply_format(&self.formatter, result)))
    }
}

impl fmt::Debug for Formatted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Formatted").field("inner", &self.inner).finish_non_exhaustive()
    }
}

impl From<Formatted> for Validator {
    fn from(formatted: Formatted) -> Self {
        Validator::new(formatted)
    }
}

/// Wraps `validator` so every result it produces passes through `formatter`.
pub fn format_result<F>(formatter: F, validator: impl Into<Validator>) -> Validator
where
    F: Fn(ValidationResult) -> ValidationResult + Send + Sync + 'static,
{
    Formatted::new(formatter, validator).into()
}

/// Formats one phase of a result, keeping what the formatter may not touch.
fn apply_format(formatter: &Arc<Formatter>, result: ValidationResult) -> ValidationResult {
    let value = result.value.clone();
    let pending = result.deferred.clone();

    let mut formatted = formatter(result);
    formatted.value = value;
    if pending.is_some() {
        formatted.is_valid = false;
    }
    formatted.deferred = pending.map(|handle| {
        let formatter = Arc::clone(formatter);
        handle.and_then(move |resolved| Ok(apply_format(&formatter, resolved)))
    });
    formatted
}

// ============================================================================
// BUILT-IN FORMATTERS
// ============================================================================

/// Adds a `validation_errors` array listing the children that failed.
///
/// Sequential traces contribute their invalid entries; structural traces
/// contribute their invalid fields, each tagged with `prop_name`. Entries
/// that are still pending are not errors yet and are left out.
pub fn validation_errors(result: ValidationResult) -> ValidationResult {
    let mut errors = Vec::new();
    if let Some(every) = &result.every {
        errors.extend(
            every
                .iter()
                .filter(|entry| !entry.is_valid && !entry.is_pending())
                .map(ValidationResult::to_json_value),
        );
    }
    if let Some(props) = &result.props {
        for (name, entry) in props {
            if entry.is_valid || entry.is_pending() {
                continue;
            }
            let mut error = entry.to_json_value();
            if let Value::Object(object) = &mut error {
                object.insert("prop_name".into(), json!(name));
            }
            errors.push(error);
        }
    }
    result.with_field("validation_errors", Value::Array(errors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::Deferred;
    use futures::executor::block_on;
    use serde_json::json;

    fn later(valid: bool) -> Validator {
        Validator::from_fn(move |_, _| Outcome::Deferred(Deferred::factory(move || async move { valid })))
    }

    #[test]
    fn test_formatter_sees_the_immediate_result() {
        let validator = format_result(|r| r.with_field("checked", true), Validator::from_fn(|_, _| false));
        let result = validate(&validator, &json!(3), &Context::new()).expect("no error");
        assert!(!result.is_valid);
        assert_eq!(result.field("checked"), Some(&json!(true)));
    }

    #[test]
    fn test_formatter_cannot_change_value() {
        let validator = format_result(
            |mut r| {
                r.value = json!("rewritten");
                r
            },
            Validator::from_fn(|_, _| true),
        );
        let result = validate(&validator, &json!("original"), &Context::new()).expect("no error");
        assert_eq!(result.value, json!("original"));
    }

    #[test]
    fn test_formatter_runs_again_after_resolution() {
        let validator = format_result(
            |r| {
                let phase = if r.is_pending() { "pending" } else { "resolved" };
                r.with_field("phase", phase)
            },
            vec![later(true)],
        );
        let result = validate(&validator, &json!(1), &Context::new()).expect("no error");
        assert!(result.is_pending());

        let resolved = block_on(result.resolve()).expect("resolves");
        assert!(resolved.is_valid);
        assert_eq!(resolved.field("phase"), Some(&json!("resolved")));
    }

    #[test]
    fn test_validation_errors_lists_failed_sequence_entries() {
        let failing = Validator::from_fn(|_, _| ValidationResult::invalid().with_field("message", "too short"));
        let validator = format_result(validation_errors, vec![Validator::from_fn(|_, _| true), failing]);
        let result = validate(&validator, &json!("ab"), &Context::new()).expect("no error");
        assert_eq!(
            result.field("validation_errors"),
            Some(&json!([{"is_valid": false, "value": "ab", "message": "too short"}]))
        );
    }

    #[test]
    fn test_formatter_cannot_validate_a_pending_result() {
        let validator = format_result(
            |mut r| {
                r.is_valid = true;
                r
            },
            later(false),
        );
        let result = validate(&validator, &json!(1), &Context::new()).expect("no error");
        assert!(result.is_pending());
        assert!(!result.is_valid);

        let resolved = block_on(result.resolve()).expect("resolves");
        assert!(resolved.is_valid);
    }
}
