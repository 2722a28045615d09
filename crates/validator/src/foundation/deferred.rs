//! Deferred resolution handles
//!
//! A [`DeferredHandle`] is attached to a result whose validation could not
//! finish synchronously. Invoking it returns a future of the fully resolved
//! result. Work only progresses when the caller invokes the handle.
//!
//! # Staleness guard
//!
//! A handle created by the engine remembers the value it was validating.
//! [`DeferredHandle::resolve_watching`] takes a [`ValueAccessor`] that re-reads
//! the live value; if the live value differs from the remembered one before
//! or after awaiting, the future fails with
//! [`ValidatorError::StaleValidationResult`] instead of resolving.
//!
//! ```rust,ignore
//! let live = Arc::new(Mutex::new(json!("marty")));
//! let reader = Arc::clone(&live);
//! let result = validate(&username, &live.lock().clone(), &ctx)?;
//!
//! if let Some(handle) = result.deferred() {
//!     *live.lock() = json!("mcfly");
//!     let err = handle.resolve_watching(move || reader.lock().clone()).await.unwrap_err();
//!     assert!(err.is_stale());
//! }
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;

use crate::foundation::{ValidationResult, ValidatorError};

type ResolveFuture = BoxFuture<'static, Result<ValidationResult, ValidatorError>>;
type ResolveFn = dyn Fn() -> ResolveFuture + Send + Sync;

/// Re-reads the current value of a live input.
pub type ValueAccessor = Arc<dyn Fn() -> Value + Send + Sync>;

// ============================================================================
// DEFERRED HANDLE
// ============================================================================

/// Continuation that produces the resolved form of a pending result.
///
/// Cloning is cheap; clones share the same continuation.
#[derive(Clone)]
pub struct DeferredHandle {
    resolve: Arc<ResolveFn>,
    binding: Option<Binding>,
}

/// The value a handle was created for and the partial result it belongs to.
#[derive(Clone)]
struct Binding {
    origin: Arc<Value>,
    snapshot: Arc<ValidationResult>,
}

impl DeferredHandle {
    /// Creates an unbound handle from a continuation.
    ///
    /// The engine binds handles to their originating value during
    /// normalization; an unbound handle skips the staleness check.
    pub fn new<F, Fut>(resolve: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ValidationResult, ValidatorError>> + Send + 'static,
    {
        Self {
            resolve: Arc::new(move || resolve().boxed()),
            binding: None,
        }
    }

    /// Starts resolution without a staleness check.
    pub fn resolve(&self) -> ResolveFuture {
        (self.resolve)()
    }

    /// Starts resolution guarded by `accessor`.
    ///
    /// The accessor is consulted before the continuation starts and again
    /// after it completes. A mismatch with the originating value fails with
    /// [`ValidatorError::StaleValidationResult`] carrying the original partial
    /// result.
    pub fn resolve_watching<A>(&self, accessor: A) -> ResolveFuture
    where
        A: Fn() -> Value + Send + Sync + 'static,
    {
        self.resolve_with_accessor(Arc::new(accessor))
    }

    /// Like [`resolve_watching`](Self::resolve_watching) with a shared accessor.
    pub fn resolve_with_accessor(&self, accessor: ValueAccessor) -> ResolveFuture {
        let Some(binding) = self.binding.clone() else {
            return self.resolve();
        };

        if accessor() != *binding.origin {
            tracing::debug!("value changed before deferred validation started, discarding");
            let stale = binding.snapshot.as_ref().clone();
            return async move { Err(ValidatorError::stale(stale)) }.boxed();
        }

        let pending = self.resolve();
        async move {
            let resolved = pending.await?;
            if accessor() != *binding.origin {
                tracing::debug!("value changed while deferred validation was running, discarding");
                return Err(ValidatorError::stale(binding.snapshot.as_ref().clone()));
            }
            Ok(resolved)
        }
        .boxed()
    }

    /// Returns the value this handle was bound to, if any.
    pub fn origin(&self) -> Option<&Value> {
        self.binding.as_ref().map(|b| b.origin.as_ref())
    }

    /// Binds the handle to the value being validated and the partial result
    /// it is attached to.
    pub(crate) fn bind(mut self, origin: &Value, snapshot: ValidationResult) -> Self {
        self.binding = Some(Binding {
            origin: Arc::new(origin.clone()),
            snapshot: Arc::new(snapshot),
        });
        self
    }

    /// Post-processes the resolved result, keeping the binding.
    pub(crate) fn and_then<F>(&self, step: F) -> Self
    where
        F: Fn(ValidationResult) -> Result<ValidationResult, ValidatorError> + Send + Sync + 'static,
    {
        let inner = Arc::clone(&self.resolve);
        let step = Arc::new(step);
        Self {
            resolve: Arc::new(move || {
                let pending = inner();
                let step = Arc::clone(&step);
                async move { pending.await.and_then(|resolved| step(resolved)) }.boxed()
            }),
            binding: self.binding.clone(),
        }
    }
}

impl fmt::Debug for DeferredHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredHandle")
            .field("origin", &self.origin())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use parking_lot::Mutex;
    use serde_json::json;

    fn resolved_valid() -> DeferredHandle {
        DeferredHandle::new(|| async { Ok(ValidationResult::valid().with_field("checked", true)) })
    }

    #[test]
    fn unbound_handles_ignore_the_accessor() {
        let handle = resolved_valid();
        let result = block_on(handle.resolve_watching(|| json!("anything"))).expect("resolves");
        assert!(result.is_valid);
    }

    #[test]
    fn bound_handle_resolves_when_value_is_unchanged() {
        let handle = resolved_valid().bind(&json!("marty"), ValidationResult::invalid());
        let result = block_on(handle.resolve_watching(|| json!("marty"))).expect("resolves");
        assert_eq!(result.field("checked"), Some(&json!(true)));
    }

    #[test]
    fn changed_value_rejects_with_the_original_result() {
        let original = ValidationResult::invalid().with_field("message", "Checking...");
        let handle = resolved_valid().bind(&json!("marty"), original.clone());
        let err = block_on(handle.resolve_watching(|| json!("mcfly"))).expect_err("stale");
        assert_eq!(err.stale_result(), Some(&original));
    }

    #[test]
    fn change_during_resolution_is_detected_after_awaiting() {
        let live = Arc::new(Mutex::new(json!("marty")));
        let writer = Arc::clone(&live);
        let handle = DeferredHandle::new(move || {
            let writer = Arc::clone(&writer);
            async move {
                *writer.lock() = json!("mcfly");
                Ok(ValidationResult::valid())
            }
        })
        .bind(&json!("marty"), ValidationResult::invalid());

        let reader = Arc::clone(&live);
        let err = block_on(handle.resolve_watching(move || reader.lock().clone())).expect_err("stale");
        assert!(err.is_stale());
    }

    #[test]
    fn and_then_keeps_the_binding() {
        let handle = resolved_valid()
            .bind(&json!(1), ValidationResult::invalid())
            .and_then(|r| Ok(r.with_field("formatted", true)));
        assert_eq!(handle.origin(), Some(&json!(1)));
        let result = block_on(handle.resolve()).expect("resolves");
        assert_eq!(result.field("formatted"), Some(&json!(true)));
    }
}
