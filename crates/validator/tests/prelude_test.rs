//! Integration tests for the prelude module.
//!
//! Verifies that `use keel_validator::prelude::*` brings in everything
//! a consumer needs for common validation scenarios.

#![cfg(feature = "leaves")]

use keel_validator::prelude::*;

// ============================================================================
// PRELUDE IMPORT SMOKE TEST
// ============================================================================

#[test]
fn prelude_import_provides_entry_points() {
    let v = every(vec![min_length(3), max_length(20)]);
    assert!(validate(&v, &json!("hello"), &Context::new()).expect("no error").is_valid);
    assert!(!validate(&v, &json!("hi"), &Context::new()).expect("no error").is_valid);
}

#[test]
fn prelude_import_provides_the_validate_trait() {
    struct Even;

    impl Validate for Even {
        fn validate(&self, value: &Value, _: &Context) -> Result<Outcome, ValidatorError> {
            Ok(Outcome::Valid(value.as_i64().is_some_and(|n| n % 2 == 0)))
        }
    }

    let v = Validator::new(Even);
    assert!(v.validate(&json!(4), &Context::new()).expect("no error").is_valid);
}

// ============================================================================
// LEAVES VIA PRELUDE
// ============================================================================

#[test]
fn leaves_via_prelude() {
    let ctx = Context::new();
    let checks = [
        (required(), json!("x"), true),
        (optional(), json!(null), true),
        (compare("a"), json!("b"), false),
        (min(1.0), json!(0), false),
        (max(1.0), json!(0), true),
        (range(1.0, 3.0), json!(2), true),
        (length(1, 2), json!("abc"), false),
        (pattern(regex::Regex::new("^a").expect("regex")), json!("abc"), true),
    ];
    for (validator, value, expected) in checks {
        assert_eq!(validate(&validator, &value, &ctx).expect("no error").is_valid, expected, "{value}");
    }
}

// ============================================================================
// COMPOSITION VIA PRELUDE
// ============================================================================

#[test]
fn composition_via_prelude() {
    let signup = props(fields! {
        "username" => every(vec![required(), length(3, 20)]),
        "age" => vec![required(), range(18.0, 130.0)],
    })
    .formatted(validation_errors);

    let result = validate(&signup, &json!({"username": "doc", "age": 17}), &Context::new()).expect("no error");
    assert!(!result.is_valid);
    assert_eq!(
        result.field("validation_errors").and_then(Value::as_array).map(Vec::len),
        Some(1)
    );
}

#[tokio::test]
async fn async_entry_points_via_prelude() {
    let v = Validator::from_fn(|_, _| Deferred::factory(|| async { true }));
    let result = validate_async(&v, &json!(1), &Context::new()).await.expect("resolves");
    assert!(result.is_valid);

    let result = v.validate_async(&json!(1), &Context::new()).await.expect("resolves");
    assert!(result.is_valid);
}
