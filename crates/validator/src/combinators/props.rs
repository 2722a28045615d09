//! Structural composition
//!
//! Runs one child validator per named field of an object value. Every field
//! is evaluated on every call, whatever the other fields report, so a
//! result always describes each field. A missing field is validated as
//! `null`; whether that is acceptable is the child's decision.
//!
//! ```rust,ignore
//! use keel_validator::prelude::*;
//!
//! let person = props(fields! {
//!     "first" => required(),
//!     "last" => required(),
//! });
//! let result = validate(&person, &json!({"first": "", "last": "B"}), &Context::new())?;
//!
//! assert!(!result.is_valid);
//! let trace = result.props.expect("structural trace");
//! assert!(!trace["first"].is_valid);
//! assert!(trace["last"].is_valid);
//! ```

use std::sync::Arc;

use futures::TryFutureExt;
use futures::future::try_join_all;
use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::combinators::every::apply_props;
use crate::foundation::{
    Context, DeferredHandle, Outcome, PropsSource, Validate, ValidationResult, Validator, ValidatorError, validate,
};

// ============================================================================
// PROPS COMPOSER
// ============================================================================

/// Structural composer with optional declared props.
#[derive(Debug, Clone)]
pub struct Props {
    fields: Arc<IndexMap<String, Validator>>,
    props: PropsSource,
}

impl Props {
    /// Creates a composer over `fields`, kept in declaration order.
    pub fn new<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Validator)>,
        K: Into<String>,
    {
        Self {
            fields: Arc::new(fields.into_iter().map(|(name, v)| (name.into(), v)).collect()),
            props: PropsSource::Empty,
        }
    }

    /// Declares static props.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_props(mut self, props: impl Into<PropsSource>) -> Self {
        self.props = props.into();
        self
    }

    /// Declares props computed from the context on each validation call.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_props_fn<F>(mut self, resolve: F) -> Self
    where
        F: Fn(&Context) -> Map<String, Value> + Send + Sync + 'static,
    {
        self.props = PropsSource::resolver(resolve);
        self
    }

    /// Returns the declared field validators.
    pub fn fields(&self) -> &IndexMap<String, Validator> {
        &self.fields
    }
}

impl Validate for Props {
    fn validate(&self, value: &Value, context: &Context) -> Result<Outcome, ValidatorError> {
        run(&self.fields, &self.props, value, context).map(Outcome::Record)
    }
}

impl From<Props> for Validator {
    fn from(props: Props) -> Self {
        Validator::new(props)
    }
}

impl From<IndexMap<String, Validator>> for Props {
    fn from(fields: IndexMap<String, Validator>) -> Self {
        Self {
            fields: Arc::new(fields),
            props: PropsSource::Empty,
        }
    }
}

/// Creates a structural composer.
///
/// Accepts a field map (such as the output of [`fields!`](crate::fields)) or
/// any iterator of `(name, validator)` pairs.
pub fn props<I, K>(fields: I) -> Validator
where
    I: IntoIterator<Item = (K, Validator)>,
    K: Into<String>,
{
    Props::new(fields).into()
}

// ============================================================================
// ALGORITHM
// ============================================================================

/// Runs each field validator against the matching member of `value`.
pub(crate) fn run(
    fields: &Arc<IndexMap<String, Validator>>,
    props: &PropsSource,
    value: &Value,
    context: &Context,
) -> Result<ValidationResult, ValidatorError> {
    let declared = props.resolve(context);
    let Value::Object(object) = value else {
        tracing::trace!("structural validation of a non-object value");
        return Ok(apply_props(
            ValidationResult {
                is_valid: true,
                value: value.clone(),
                ..ValidationResult::default()
            },
            declared,
        ));
    };

    let scope = context.merged(&declared);
    let missing = Value::Null;
    let mut results = IndexMap::with_capacity(fields.len());
    let mut pending = Vec::new();
    for (name, validator) in fields.iter() {
        let member = object.get(name).unwrap_or(&missing);
        let result = validate(validator, member, &scope)?;
        if result.is_pending() {
            pending.push(name.clone());
        }
        results.insert(name.clone(), result);
    }

    let mut composite = ValidationResult {
        is_valid: results.values().all(|r| r.is_valid),
        value: value.clone(),
        props: Some(results),
        ..ValidationResult::default()
    };
    if !pending.is_empty() {
        tracing::trace!(pending = ?pending, "structural validation deferred");
        composite.deferred = Some(resolve_fields(
            composite.clone(),
            pending.into(),
            context.config().concurrent_field_resolution,
        ));
    }
    Ok(apply_props(composite, declared))
}

/// Handle that resolves every pending field and re-assembles the trace.
///
/// Resolved results replace the pending ones in place, so the trace keeps
/// declaration order regardless of completion order.
fn resolve_fields(partial: ValidationResult, pending: Arc<[String]>, concurrent: bool) -> DeferredHandle {
    let partial = Arc::new(partial);
    DeferredHandle::new(move || {
        let partial = Arc::clone(&partial);
        let pending = Arc::clone(&pending);
        async move {
            let mut trace = partial.props.clone().unwrap_or_default();

            let resolved = if concurrent {
                let jobs = pending.iter().filter_map(|name| {
                    let name = name.clone();
                    trace.get(&name).map(|r| r.resolve().map_ok(move |res| (name, res)))
                });
                try_join_all(jobs).await?
            } else {
                let mut resolved = Vec::with_capacity(pending.len());
                for name in pending.iter() {
                    if let Some(job) = trace.get(name).map(ValidationResult::resolve) {
                        resolved.push((name.clone(), job.await?));
                    }
                }
                resolved
            };

            for (name, result) in resolved {
                trace.insert(name, result);
            }
            tracing::trace!(fields = trace.len(), "structural validation resolved");
            Ok(ValidationResult {
                is_valid: trace.values().all(|r| r.is_valid),
                props: Some(trace),
                ..partial.settled()
            })
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields;
    use crate::foundation::Deferred;
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn non_empty() -> Validator {
        Validator::from_fn(|value, _| value.as_str().is_some_and(|s| !s.is_empty()))
    }

    fn later(valid: bool) -> Validator {
        Validator::from_fn(move |_, _| Outcome::Deferred(Deferred::factory(move || async move { valid })))
    }

    #[test]
    fn test_every_field_is_reported() {
        let validator = props(fields! { "first" => non_empty(), "last" => non_empty() });
        let result = validate(&validator, &json!({"first": "", "last": "B"}), &Context::new()).expect("no error");
        assert!(!result.is_valid);

        let trace = result.props.expect("trace");
        assert_eq!(trace.keys().collect::<Vec<_>>(), vec!["first", "last"]);
        assert!(!trace["first"].is_valid);
        assert!(trace["last"].is_valid);
        assert_eq!(trace["last"].value, json!("B"));
    }

    #[test]
    fn test_missing_member_is_null() {
        let seen = Validator::from_fn(|value, _| value.is_null());
        let result = validate(&props(fields! { "absent" => seen }), &json!({}), &Context::new()).expect("no error");
        assert!(result.is_valid);
    }

    #[test]
    fn test_non_object_value_has_no_trace() {
        let validator = props(fields! { "first" => non_empty() });
        let result = validate(&validator, &json!("scalar"), &Context::new()).expect("no error");
        assert!(result.is_valid);
        assert!(result.props.is_none());
    }

    #[test]
    fn test_pending_fields_are_substituted_in_place() {
        let validator = props(fields! {
            "a" => later(true),
            "b" => non_empty(),
            "c" => later(false),
        });
        let result = validate(&validator, &json!({"b": "x"}), &Context::new()).expect("no error");
        assert!(!result.is_valid);
        assert!(result.is_pending());

        let resolved = block_on(result.resolve()).expect("resolves");
        assert!(!resolved.is_valid);
        let trace = resolved.props.expect("trace");
        assert_eq!(trace.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert!(trace["a"].is_valid);
        assert!(!trace["c"].is_valid);
        assert!(trace.values().all(|r| !r.is_pending()));
    }

    #[test]
    fn test_sequential_resolution_matches_concurrent() {
        let validator = props(fields! { "a" => later(true), "b" => later(true) });
        let config = crate::foundation::ValidationConfig::new().concurrent_field_resolution(false);
        let ctx = Context::new().with_config(config);
        let result = validate(&validator, &json!({}), &ctx).expect("no error");
        let resolved = block_on(result.resolve()).expect("resolves");
        assert!(resolved.is_valid);
    }

    #[test]
    fn test_declared_props_are_merged() {
        let validator: Validator = Props::new(fields_vec()).with_props(json!({"form": "signup"})).into();
        let result = validate(&validator, &json!({"name": "x"}), &Context::new()).expect("no error");
        assert_eq!(result.field("form"), Some(&json!("signup")));
    }

    fn fields_vec() -> Vec<(&'static str, Validator)> {
        vec![("name", non_empty())]
    }
}
