//! Equality validator

use serde_json::{Map, Value};

use crate::foundation::{Context, Outcome, PropsSource, Validate, Validator, ValidatorError};
use crate::validators::{TextOptions, record};

/// Validates that a value equals the `compare` property.
///
/// The target is usually read from the context, e.g. a password
/// confirmation field compared against the password:
///
/// ```rust,ignore
/// let confirm = Compare::from_fn(|ctx| props_map(json!({"compare": ctx.get("password").cloned()})));
/// ```
#[derive(Debug, Clone)]
pub struct Compare {
    props: PropsSource,
    options: TextOptions,
}

impl Compare {
    /// Compares against a fixed target.
    pub fn new(target: impl Into<Value>) -> Self {
        let mut props = Map::new();
        props.insert("compare".into(), target.into());
        Self::from_props(props)
    }

    /// A comparison configured by `props`; `compare` is mandatory.
    pub fn from_props(props: impl Into<PropsSource>) -> Self {
        Self {
            props: props.into(),
            options: TextOptions::default(),
        }
    }

    /// A comparison whose props are computed from the context.
    pub fn from_fn<F>(resolve: F) -> Self
    where
        F: Fn(&Context) -> Map<String, Value> + Send + Sync + 'static,
    {
        Self::from_props(PropsSource::resolver(resolve))
    }

    /// Sets the text options; trimming applies to string values only.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_options(mut self, options: TextOptions) -> Self {
        self.options = options;
        self
    }
}

impl Validate for Compare {
    fn validate(&self, value: &Value, context: &Context) -> Result<Outcome, ValidatorError> {
        let props = self.props.resolve(context);
        let target = match props.get("compare") {
            Some(target) if !target.is_null() => target.clone(),
            _ => return Err(ValidatorError::missing_property("compare", "compare")),
        };

        let is_valid = if self.options.is_empty(value) {
            true
        } else {
            match (self.options.text(value), target.as_str()) {
                (Some(text), Some(expected)) => text == expected,
                _ => *value == target,
            }
        };
        Ok(record(props, is_valid, [("compare", target)]))
    }
}

impl From<Compare> for Validator {
    fn from(compare: Compare) -> Self {
        Validator::new(compare)
    }
}

/// Creates an equality check against `target`.
pub fn compare(target: impl Into<Value>) -> Validator {
    Compare::new(target).into()
}
