//! Presence validator
//!
//! `null`, the empty string and `false` are missing; `false` counts so that
//! a required checkbox must be ticked. `0` is a supplied number and passes.

use serde_json::{Map, Value, json};

use crate::foundation::{Context, Outcome, PropsSource, Validate, Validator, ValidatorError};
use crate::validators::{TextOptions, record};

/// Validates that a value is present.
///
/// The `required` property (default `true`) can switch the check off, for
/// example from the context when a field only becomes mandatory in some
/// states of a form.
#[derive(Debug, Clone, Default)]
pub struct Required {
    props: PropsSource,
    options: TextOptions,
}

impl Required {
    /// A required check with no props.
    pub fn new() -> Self {
        Self::default()
    }

    /// A check configured by `props`.
    pub fn from_props(props: impl Into<PropsSource>) -> Self {
        Self {
            props: props.into(),
            options: TextOptions::default(),
        }
    }

    /// A check whose props are computed from the context.
    pub fn from_fn<F>(resolve: F) -> Self
    where
        F: Fn(&Context) -> Map<String, Value> + Send + Sync + 'static,
    {
        Self::from_props(PropsSource::resolver(resolve))
    }

    /// Sets the text options.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_options(mut self, options: TextOptions) -> Self {
        self.options = options;
        self
    }
}

impl Validate for Required {
    fn validate(&self, value: &Value, context: &Context) -> Result<Outcome, ValidatorError> {
        let props = self.props.resolve(context);
        let required = props.get("required").and_then(Value::as_bool).unwrap_or(true);

        let missing = self.options.is_empty(value) || *value == Value::Bool(false);
        Ok(record(props, !required || !missing, [("required", json!(required))]))
    }
}

impl From<Required> for Validator {
    fn from(required: Required) -> Self {
        Validator::new(required)
    }
}

/// Creates a required check.
pub fn required() -> Validator {
    Required::new().into()
}

/// Creates a presence check that is switched off: it always passes but
/// reports `required: false`.
pub fn optional() -> Validator {
    Required::from_props(json!({"required": false})).into()
}
