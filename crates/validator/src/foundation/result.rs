//! The canonical validation result
//!
//! Every validator return value is normalized into a [`ValidationResult`].
//! Results are built fresh on every call and composed by constructing new
//! records; nothing in the engine mutates a result after handing it out.

use std::fmt;

use futures::future::{self, BoxFuture, FutureExt};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::foundation::{Deferred, DeferredHandle, Outcome, ValidatorError};

/// Result keys computed by the engine; no field layer may override them.
pub const RESERVED_KEYS: [&str; 4] = ["is_valid", "value", "every", "props"];

/// Key that marks a deferred continuation in loosely-typed outcomes.
///
/// A JSON value cannot carry a continuation, so an outcome that contains this
/// key is rejected as malformed.
pub const DEFERRED_MARKER: &str = "validate_async";

// ============================================================================
// VALIDATION RESULT
// ============================================================================

/// Canonical output of a validation call.
///
/// # Examples
///
/// ```rust,ignore
/// use keel_validator::prelude::*;
/// use serde_json::json;
///
/// let result = validate(&every(vec![required(), min_length(5)]), &json!("abc"), &Context::default())?;
/// assert!(!result.is_valid);
/// assert_eq!(result.field("length"), Some(&json!(3)));
/// assert_eq!(result.every.as_ref().map(Vec::len), Some(2));
/// ```
#[derive(Clone, Default)]
pub struct ValidationResult {
    /// Whether the value passed. Always `false` while deferred work is pending.
    pub is_valid: bool,

    /// The value that was validated.
    pub value: Value,

    /// Descriptive fields from the outcome, declared props and context.
    pub fields: Map<String, Value>,

    /// Sequential composition trace, one entry per executed child.
    pub every: Option<Vec<ValidationResult>>,

    /// Structural composition trace, one entry per declared field.
    pub props: Option<IndexMap<String, ValidationResult>>,

    pub(crate) deferred: Option<DeferredHandle>,
}

impl ValidationResult {
    /// Creates a result with the given validity and no fields.
    pub fn new(is_valid: bool) -> Self {
        Self {
            is_valid,
            ..Self::default()
        }
    }

    /// Creates a valid result.
    pub fn valid() -> Self {
        Self::new(true)
    }

    /// Creates an invalid result.
    pub fn invalid() -> Self {
        Self::new(false)
    }

    /// Adds a descriptive field.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Adds every entry of `fields`, overriding existing keys.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_fields(mut self, fields: Map<String, Value>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Sets the structural trace.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_props(mut self, props: IndexMap<String, ValidationResult>) -> Self {
        self.props = Some(props);
        self
    }

    /// Turns this partial record into an outcome whose continuation is
    /// `deferred` (the "two-stage" leaf shape).
    ///
    /// ```rust,ignore
    /// ValidationResult::invalid()
    ///     .with_field("message", "Checking availability...")
    ///     .pending(Deferred::factory(move || check(username.clone())))
    /// ```
    pub fn pending(self, deferred: Deferred) -> Outcome {
        Outcome::Pending(self, deferred)
    }

    /// Looks up a descriptive field.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Returns the deferred-resolution handle, if work is still pending.
    pub fn deferred(&self) -> Option<&DeferredHandle> {
        self.deferred.as_ref()
    }

    /// Returns `true` if a deferred-resolution handle is attached.
    pub fn is_pending(&self) -> bool {
        self.deferred.is_some()
    }

    /// Resolves the attached handle, or yields a copy of this result when
    /// nothing is pending.
    pub fn resolve(&self) -> BoxFuture<'static, Result<ValidationResult, ValidatorError>> {
        match &self.deferred {
            Some(handle) => handle.resolve(),
            None => future::ready(Ok(self.clone())).boxed(),
        }
    }

    /// Returns this result without its handle.
    pub(crate) fn settled(&self) -> Self {
        Self {
            deferred: None,
            ..self.clone()
        }
    }

    /// Converts the result to a JSON object (the handle is omitted).
    pub fn to_json_value(&self) -> Value {
        let mut object = Map::with_capacity(self.fields.len() + 4);
        object.insert("is_valid".into(), Value::Bool(self.is_valid));
        object.insert("value".into(), self.value.clone());
        for (key, value) in &self.fields {
            if !RESERVED_KEYS.contains(&key.as_str()) {
                object.insert(key.clone(), value.clone());
            }
        }
        if let Some(every) = &self.every {
            object.insert(
                "every".into(),
                Value::Array(every.iter().map(Self::to_json_value).collect()),
            );
        }
        if let Some(props) = &self.props {
            object.insert(
                "props".into(),
                Value::Object(
                    props
                        .iter()
                        .map(|(name, result)| (name.clone(), result.to_json_value()))
                        .collect(),
                ),
            );
        }
        Value::Object(object)
    }
}

impl PartialEq for ValidationResult {
    fn eq(&self, other: &Self) -> bool {
        self.is_valid == other.is_valid
            && self.value == other.value
            && self.fields == other.fields
            && self.every == other.every
            && self.props == other.props
            && self.deferred.is_some() == other.deferred.is_some()
    }
}

impl fmt::Debug for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("ValidationResult");
        s.field("is_valid", &self.is_valid)
            .field("value", &self.value)
            .field("fields", &self.fields);
        if let Some(every) = &self.every {
            s.field("every", every);
        }
        if let Some(props) = &self.props {
            s.field("props", props);
        }
        s.field("pending", &self.deferred.is_some()).finish()
    }
}

impl Serialize for ValidationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json_value().serialize(serializer)
    }
}

// ============================================================================
// FIELD LAYERS
// ============================================================================

/// Merges field layers in order; later layers override earlier ones.
///
/// Reserved keys are dropped from every layer.
pub fn merge_layers<'a>(layers: impl IntoIterator<Item = &'a Map<String, Value>>) -> Map<String, Value> {
    let mut merged = Map::new();
    for layer in layers {
        for (key, value) in layer {
            if !RESERVED_KEYS.contains(&key.as_str()) {
                merged.insert(key.clone(), value.clone());
            }
        }
    }
    merged
}

/// Places `defaults` underneath the result's own fields.
pub(crate) fn underlay(mut result: ValidationResult, defaults: &Map<String, Value>) -> ValidationResult {
    if !defaults.is_empty() {
        result.fields = merge_layers([defaults, &result.fields]);
    }
    result
}

/// JavaScript-style truthiness for loosely-typed outcomes.
pub(crate) fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
