//! Integration tests for deferred validation and the staleness guard.

#![cfg(feature = "leaves")]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use keel_validator::prelude::*;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;

/// Two-stage availability check: immediately invalid with a progress
/// message, then resolved against a list of taken names.
fn available(lookups: Arc<AtomicUsize>) -> Validator {
    Validator::from_fn(move |value, _| {
        let name = value.as_str().unwrap_or_default().to_owned();
        let lookups = Arc::clone(&lookups);
        ValidationResult::invalid()
            .with_field("message", "Checking availability...")
            .pending(Deferred::factory(move || {
                let name = name.clone();
                lookups.fetch_add(1, Ordering::SeqCst);
                async move {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    if name == "marty" {
                        json!({"is_valid": false, "message": "taken"})
                    } else {
                        json!(true)
                    }
                }
            }))
    })
}

fn later(valid: bool) -> Validator {
    Validator::from_fn(move |_, _| Outcome::Deferred(Deferred::factory(move || async move { valid })))
}

// ============================================================================
// TWO-STAGE RESULTS
// ============================================================================

#[tokio::test]
async fn taken_username_is_reported_in_two_stages() {
    let lookups = Arc::new(AtomicUsize::new(0));
    let validator = available(Arc::clone(&lookups));

    let immediate = validate(&validator, &json!("marty"), &Context::new()).expect("no error");
    assert!(!immediate.is_valid);
    assert!(immediate.is_pending());
    assert_eq!(immediate.field("message"), Some(&json!("Checking availability...")));
    assert_eq!(lookups.load(Ordering::SeqCst), 0);

    let resolved = immediate.resolve().await.expect("resolves");
    assert_eq!(
        resolved.to_json_value(),
        json!({"is_valid": false, "value": "marty", "message": "taken"})
    );
    assert!(!resolved.is_pending());
    assert_eq!(lookups.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn free_username_resolves_valid() {
    let validator = available(Arc::new(AtomicUsize::new(0)));
    let resolved = validate_async(&validator, &json!("doc"), &Context::new()).await.expect("resolves");

    assert!(resolved.is_valid);
    assert_eq!(resolved.value, json!("doc"));
}

#[tokio::test]
async fn resolving_twice_gives_equal_results() {
    let validator = every(vec![later(true), available(Arc::new(AtomicUsize::new(0)))]);
    let immediate = validate(&validator, &json!("marty"), &Context::new()).expect("no error");

    let first = immediate.resolve().await.expect("resolves");
    let second = immediate.resolve().await.expect("resolves");
    assert_eq!(first, second);
}

#[tokio::test]
async fn shared_futures_run_once() {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&runs);
    let validator = Validator::from_fn(move |_, _| {
        let counter = Arc::clone(&counter);
        Deferred::future(async move {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        })
    });
    let immediate = validate(&validator, &json!(1), &Context::new()).expect("no error");

    assert!(immediate.resolve().await.expect("resolves").is_valid);
    assert!(immediate.resolve().await.expect("resolves").is_valid);
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

// ============================================================================
// COMPOSITION
// ============================================================================

#[tokio::test]
async fn sequences_continue_after_a_pending_child() {
    let validator = every(vec![later(true), later(true), Validator::from_fn(|_, _| false)]);
    let immediate = validate(&validator, &json!(0), &Context::new()).expect("no error");

    assert!(!immediate.is_valid);
    assert_eq!(immediate.every.as_ref().map(Vec::len), Some(1));

    let resolved = immediate.resolve().await.expect("resolves");
    assert!(!resolved.is_valid);
    assert_eq!(resolved.every.map(|t| t.len()), Some(3));
}

#[tokio::test]
async fn sequences_stop_at_a_child_that_resolves_invalid() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let tail = Validator::from_fn(move |_, _| {
        counter.fetch_add(1, Ordering::SeqCst);
        true
    });
    let validator = every(vec![later(false), tail]);
    let resolved = validate_async(&validator, &json!(0), &Context::new()).await.expect("resolves");

    assert!(!resolved.is_valid);
    assert_eq!(resolved.every.map(|t| t.len()), Some(1));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn field_maps_resolve_pending_fields_in_place() {
    for concurrent in [true, false] {
        let ctx = Context::new().with_config(ValidationConfig::new().concurrent_field_resolution(concurrent));
        let validator = props(fields! {
            "a" => later(true),
            "b" => Validator::from_fn(|_, _| true),
            "c" => later(false),
        });
        let immediate = validate(&validator, &json!({}), &ctx).expect("no error");
        assert!(!immediate.is_valid);
        assert!(immediate.is_pending());

        let resolved = immediate.resolve().await.expect("resolves");
        let trace = resolved.props.expect("trace");
        assert_eq!(trace.keys().cloned().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert!(trace["a"].is_valid);
        assert!(!trace["c"].is_valid);
        assert!(trace.values().all(|r| !r.is_pending()));
    }
}

#[tokio::test]
async fn malformed_resolution_is_an_error() {
    let validator = Validator::from_fn(|_, _| Deferred::factory(|| async { json!("yes") }));
    let err = validate_async(&validator, &json!(1), &Context::new()).await.expect_err("malformed");
    assert!(matches!(err, ValidatorError::MalformedAsyncResult { .. }));
}

// ============================================================================
// STALENESS
// ============================================================================

#[tokio::test]
async fn changed_input_discards_the_pending_result() {
    let live = Arc::new(Mutex::new(json!("marty")));
    let validator = available(Arc::new(AtomicUsize::new(0)));
    let immediate = validate(&validator, &live.lock().clone(), &Context::new()).expect("no error");

    *live.lock() = json!("mcfly");
    let reader = Arc::clone(&live);
    let handle = immediate.deferred().expect("pending");
    let err = handle.resolve_watching(move || reader.lock().clone()).await.expect_err("stale");

    assert!(err.is_stale());
    match err {
        ValidatorError::StaleValidationResult { result } => {
            assert_eq!(result.value, json!("marty"));
            assert_eq!(result.field("message"), Some(&json!("Checking availability...")));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn input_changing_mid_flight_is_stale() {
    let live = Arc::new(Mutex::new(json!("marty")));
    let writer = Arc::clone(&live);
    let validator = Validator::from_fn(move |_, _| {
        let writer = Arc::clone(&writer);
        Deferred::factory(move || {
            let writer = Arc::clone(&writer);
            async move {
                *writer.lock() = json!("biff");
                true
            }
        })
    });
    let reader = Arc::clone(&live);
    let err = validate_async_watching(&validator, move || reader.lock().clone(), &Context::new())
        .await
        .expect_err("stale");
    assert!(err.is_stale());
}

#[tokio::test]
async fn sequences_with_a_deferred_leaf_are_stale_when_the_input_changes() {
    let live = Arc::new(Mutex::new(json!("marty")));
    let validator = every(vec![required(), available(Arc::new(AtomicUsize::new(0)))]);
    let immediate = validate(&validator, &live.lock().clone(), &Context::new()).expect("no error");
    assert!(immediate.is_pending());
    assert!(!immediate.is_valid);

    *live.lock() = json!("mcfly");
    let reader = Arc::clone(&live);
    let err = immediate
        .deferred()
        .expect("pending")
        .resolve_watching(move || reader.lock().clone())
        .await
        .expect_err("stale");

    assert!(err.is_stale());
    match err {
        ValidatorError::StaleValidationResult { result } => {
            assert_eq!(result.value, json!("marty"));
            assert_eq!(result.every.map(|trace| trace.len()), Some(2));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn unchanged_input_resolves() {
    let live = Arc::new(Mutex::new(json!("doc")));
    let reader = Arc::clone(&live);
    let validator = every(vec![required(), available(Arc::new(AtomicUsize::new(0)))]);
    let resolved = validate_async_watching(&validator, move || reader.lock().clone(), &Context::new())
        .await
        .expect("resolves");
    assert!(resolved.is_valid);
}

#[tokio::test]
async fn composite_handles_watch_the_whole_value() {
    let live = Arc::new(Mutex::new(json!({"username": "marty"})));
    let validator = props(fields! { "username" => available(Arc::new(AtomicUsize::new(0))) });
    let immediate = validate(&validator, &live.lock().clone(), &Context::new()).expect("no error");

    live.lock()["username"] = json!("doc");
    let reader = Arc::clone(&live);
    let err = immediate
        .deferred()
        .expect("pending")
        .resolve_watching(move || reader.lock().clone())
        .await
        .expect_err("stale");
    assert!(err.is_stale());
}
