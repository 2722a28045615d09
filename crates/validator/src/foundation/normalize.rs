//! Result normalization
//!
//! Turns any [`Outcome`] into a canonical [`ValidationResult`] for the value
//! that was validated. Deferred outcomes become a pending result whose
//! handle re-normalizes the eventual outcome through this same function.

use serde_json::Value;

use crate::foundation::result::{DEFERRED_MARKER, merge_layers, underlay};
use crate::foundation::{Context, Deferred, DeferredHandle, Outcome, ValidationResult, ValidatorError};

/// Normalizes a raw outcome produced for `value`.
///
/// The returned result always carries `value`. A pending result is invalid
/// and its handle is bound to `value`, so resolving it through
/// [`DeferredHandle::resolve_watching`] applies the staleness guard.
///
/// # Errors
///
/// [`ValidatorError::MalformedAsyncResult`] if a record claims to carry a
/// continuation in its fields. Deferred outcomes that resolve to something
/// malformed surface the same error from the handle's future.
pub fn normalize(outcome: Outcome, value: &Value, context: &Context) -> Result<ValidationResult, ValidatorError> {
    let mut result = match outcome {
        Outcome::Valid(is_valid) => ValidationResult::new(is_valid),
        Outcome::Record(record) => settle_record(record, value, context)?,
        Outcome::Deferred(deferred) => {
            let mut pending = ValidationResult::invalid();
            pending.deferred = Some(deferred_handle(deferred, value, context));
            pending
        }
        Outcome::Pending(partial, deferred) => {
            let mut partial = settle_record(partial, value, context)?;
            partial.is_valid = false;
            partial.deferred = Some(deferred_handle(deferred, value, context));
            partial
        }
    };

    result.value = value.clone();
    if context.config().merge_context_fields {
        result = underlay(result, context.properties());
    }

    Ok(bind_pending(result))
}

/// Binds a pending result's handle to the result's value and to the result
/// itself, so a stale resolution can report what it superseded.
pub(crate) fn bind_pending(mut result: ValidationResult) -> ValidationResult {
    if let Some(handle) = result.deferred.take() {
        tracing::debug!(is_valid = result.is_valid, "validation deferred");
        let snapshot = result.clone();
        result.deferred = Some(handle.bind(&result.value, snapshot));
    }
    result
}

/// Checks a record and re-wraps any handle it already carries.
///
/// A record that still carries a handle is invalid.
fn settle_record(
    mut record: ValidationResult,
    value: &Value,
    context: &Context,
) -> Result<ValidationResult, ValidatorError> {
    if record.fields.contains_key(DEFERRED_MARKER) {
        return Err(ValidatorError::malformed(
            "`validate_async` must be a deferred computation, found a field value",
        ));
    }
    record.fields = merge_layers([&record.fields]);

    if let Some(handle) = record.deferred.take() {
        record.is_valid = false;
        let value = value.clone();
        let context = context.clone();
        record.deferred = Some(handle.and_then(move |resolved| {
            normalize(Outcome::Record(resolved), &value, &context)
        }));
    }
    Ok(record)
}

/// Builds the handle for a raw deferred outcome.
///
/// The eventual outcome is normalized again; if that still leaves work
/// pending, the chain is followed until a settled result is reached.
fn deferred_handle(deferred: Deferred, value: &Value, context: &Context) -> DeferredHandle {
    let value = value.clone();
    let context = context.clone();
    DeferredHandle::new(move || {
        let pending = deferred.run();
        let value = value.clone();
        let context = context.clone();
        async move {
            let outcome = pending.await?;
            let resolved = normalize(outcome, &value, &context)?;
            match resolved.deferred() {
                Some(next) => next.resolve().await,
                None => {
                    tracing::debug!(is_valid = resolved.is_valid, "deferred validation resolved");
                    Ok(resolved)
                }
            }
        }
    })
}
