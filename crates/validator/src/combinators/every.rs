//! Sequential composition
//!
//! Runs every child against the same value, in declared order, and stops at
//! the first child that is invalid. A child that cannot finish synchronously
//! also stops the run; the composite result then carries a handle that
//! resolves that child and continues with the remaining children.
//!
//! # Examples
//!
//! ```rust,ignore
//! use keel_validator::prelude::*;
//!
//! let username = every(vec![required(), min_length(5)]);
//! let result = validate(&username, &json!("abc"), &Context::new())?;
//!
//! assert!(!result.is_valid);
//! assert_eq!(result.field("length"), Some(&json!(3)));
//! assert_eq!(result.every.map(|trace| trace.len()), Some(2));
//! ```

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::foundation::normalize::bind_pending;
use crate::foundation::result::{merge_layers, underlay};
use crate::foundation::{
    Context, DeferredHandle, Outcome, PropsSource, Validate, ValidationResult, Validator, ValidatorError, validate,
};

// ============================================================================
// EVERY COMPOSER
// ============================================================================

/// Sequential composer with optional declared props.
///
/// Declared props sit underneath the children's fields: a child reporting
/// the same key wins.
#[derive(Debug, Clone)]
pub struct Every {
    children: Arc<[Validator]>,
    props: PropsSource,
}

impl Every {
    /// Creates a composer over `children`.
    pub fn new<I>(children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Validator>,
    {
        Self {
            children: children.into_iter().map(Into::into).collect(),
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

    /// Returns the children in execution order.
    pub fn children(&self) -> &[Validator] {
        &self.children
    }
}

impl Validate for Every {
    fn validate(&self, value: &Value, context: &Context) -> Result<Outcome, ValidatorError> {
        run(&self.children, &self.props, value, context).map(Outcome::Record)
    }
}

impl From<Every> for Validator {
    fn from(every: Every) -> Self {
        Validator::new(every)
    }
}

/// Creates a sequential composer.
pub fn every<I>(children: I) -> Validator
where
    I: IntoIterator,
    I::Item: Into<Validator>,
{
    Every::new(children).into()
}

// ============================================================================
// ALGORITHM
// ============================================================================

/// Runs `children` against `value` with `props` declared on the composer.
///
/// The declared props reach the children as context properties.
pub(crate) fn run(
    children: &Arc<[Validator]>,
    props: &PropsSource,
    value: &Value,
    context: &Context,
) -> Result<ValidationResult, ValidatorError> {
    let declared = props.resolve(context);
    let start = ValidationResult {
        is_valid: true,
        value: value.clone(),
        every: Some(Vec::with_capacity(children.len())),
        ..ValidationResult::default()
    };
    let scope = context.merged(&declared);
    let result = run_from(Arc::clone(children), 0, start, value, &scope)?;
    Ok(apply_props(result, declared))
}

/// Continues a run at `start` with the accumulated result `acc`.
fn run_from(
    children: Arc<[Validator]>,
    start: usize,
    mut acc: ValidationResult,
    value: &Value,
    context: &Context,
) -> Result<ValidationResult, ValidatorError> {
    for index in start..children.len() {
        let previous = acc;
        let next = validate(&children[index], value, context)?;
        tracing::trace!(index, is_valid = next.is_valid, pending = next.is_pending(), "sequence step");

        acc = merge_step(&previous, &next);
        if next.is_pending() {
            acc.deferred = Some(continuation(children, index, previous, next, value, context));
            return Ok(acc);
        }
        if !acc.is_valid {
            break;
        }
    }
    Ok(acc)
}

/// Folds one child result into the accumulator.
///
/// The newest child's fields win; validity and the trace are computed.
fn merge_step(previous: &ValidationResult, next: &ValidationResult) -> ValidationResult {
    let mut every = previous.every.clone().unwrap_or_default();
    every.push(next.clone());
    ValidationResult {
        is_valid: previous.is_valid && next.is_valid,
        value: previous.value.clone(),
        fields: merge_layers([&previous.fields, &next.fields]),
        every: Some(every),
        props: next.props.clone().or_else(|| previous.props.clone()),
        deferred: None,
    }
}

/// Handle for a run that stopped at the pending child `index`.
///
/// Resolving it settles the accumulator and the child, merges them the same
/// way the synchronous path does, and if still valid runs the remaining
/// children, following any further deferral they produce.
fn continuation(
    children: Arc<[Validator]>,
    index: usize,
    previous: ValidationResult,
    next: ValidationResult,
    value: &Value,
    context: &Context,
) -> DeferredHandle {
    let value = value.clone();
    let context = context.clone();
    DeferredHandle::new(move || {
        let children = Arc::clone(&children);
        let previous = previous.clone();
        let next = next.clone();
        let value = value.clone();
        let context = context.clone();
        async move {
            let previous = previous.resolve().await?;
            let next = next.resolve().await?;
            let merged = merge_step(&previous, &next);
            tracing::trace!(index, is_valid = merged.is_valid, "sequence step resolved");

            if !merged.is_valid || index + 1 == children.len() {
                return Ok(merged);
            }
            let continued = run_from(children, index + 1, merged, &value, &context)?;
            continued.resolve().await
        }
    })
}

/// Places the composer's declared props under the result and under its
/// eventual resolution.
pub(crate) fn apply_props(result: ValidationResult, declared: Map<String, Value>) -> ValidationResult {
    let mut result = underlay(result, &declared);
    if let Some(handle) = result.deferred.take() {
        result.deferred = Some(handle.and_then(move |resolved| Ok(underlay(resolved, &declared))));
    }
    bind_pending(result)
}
