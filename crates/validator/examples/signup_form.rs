//! Validating a sign-up form with a deferred availability check.

use std::sync::Arc;
use std::time::Duration;

use keel_validator::prelude::*;
use parking_lot::Mutex;

const TAKEN: [&str; 2] = ["marty", "doc"];

fn available() -> Validator {
    Validator::from_fn(|value, _| {
        let name = value.as_str().unwrap_or_default().to_owned();
        ValidationResult::invalid()
            .with_field("message", "Checking availability...")
            .pending(Deferred::factory(move || {
                let name = name.clone();
                async move {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    if TAKEN.contains(&name.as_str()) {
                        json!({"is_valid": false, "message": "That username is taken"})
                    } else {
                        json!(true)
                    }
                }
            }))
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), ValidatorError> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    let signup = props(fields! {
        "username" => vec![required(), length(3, 20), available()],
        "age" => vec![required(), range(18.0, 130.0)],
    })
    .formatted(validation_errors);

    let form = Arc::new(Mutex::new(json!({"username": "marty", "age": 21})));

    let immediate = validate(&signup, &form.lock().clone(), &Context::new())?;
    println!("immediate: {}", serde_json::to_string_pretty(&immediate).unwrap_or_default());

    let reader = Arc::clone(&form);
    let resolved = validate_async_watching(&signup, move || reader.lock().clone(), &Context::new()).await?;
    println!("resolved: {}", serde_json::to_string_pretty(&resolved).unwrap_or_default());

    Ok(())
}
