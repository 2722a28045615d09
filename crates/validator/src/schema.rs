//! Declarative validators
//!
//! A [`Registry`] turns a JSON description into a [`Validator`]:
//!
//! - an array is an ordered sequence of descriptions;
//! - a string names a registered leaf with no props;
//! - an object with a string `"validator"` key names a registered leaf,
//!   and its other keys are the leaf's props;
//! - any other object is a field map of descriptions.
//!
//! ```rust,ignore
//! use keel_validator::schema::Registry;
//!
//! let registry = Registry::with_builtins();
//! let signup = registry.build(&json!({
//!     "username": ["required", {"validator": "length", "min_length": 3, "max_length": 20}],
//!     "age": {"validator": "range", "min": 18, "max": 130},
//! }))?;
//! ```
//!
//! Any other node, and any unknown leaf name, is rejected with
//! [`ValidatorError::InvalidValidatorShape`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::foundation::{Validator, ValidatorError};

type Factory = dyn Fn(Map<String, Value>) -> Result<Validator, ValidatorError> + Send + Sync;

/// Key naming the leaf in an object description.
pub const VALIDATOR_KEY: &str = "validator";

// ============================================================================
// REGISTRY
// ============================================================================

/// Maps leaf names to factories.
#[derive(Clone, Default)]
pub struct Registry {
    factories: HashMap<String, Arc<Factory>>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` under `name`, replacing any previous entry.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(Map<String, Value>) -> Result<Validator, ValidatorError> + Send + Sync + 'static,
    {
        let name = name.into();
        tracing::debug!(name = %name, "registering validator");
        self.factories.insert(name, Arc::new(factory));
        self
    }

    /// Returns `true` if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Returns the registered names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Builds a validator from its JSON description.
    pub fn build(&self, description: &Value) -> Result<Validator, ValidatorError> {
        match description {
            Value::Array(items) => items
                .iter()
                .map(|item| self.build(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Validator::from),
            Value::String(name) => self.leaf(name, Map::new()),
            Value::Object(object) => match object.get(VALIDATOR_KEY) {
                Some(Value::String(name)) => {
                    let mut props = object.clone();
                    props.remove(VALIDATOR_KEY);
                    self.leaf(name, props)
                }
                _ => object
                    .iter()
                    .map(|(name, item)| self.build(item).map(|v| (name.clone(), v)))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Validator::field_map),
            },
            Value::Null => Err(ValidatorError::invalid_shape("null")),
            Value::Bool(_) => Err(ValidatorError::invalid_shape("a boolean")),
            Value::Number(_) => Err(ValidatorError::invalid_shape("a number")),
        }
    }

    fn leaf(&self, name: &str, props: Map<String, Value>) -> Result<Validator, ValidatorError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| ValidatorError::invalid_shape(format!("unknown validator `{name}`")))?;
        factory(props)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("Registry").field("validators", &names).finish()
    }
}

// ============================================================================
// BUILT-IN LEAVES
// ============================================================================

#[cfg(feature = "leaves")]
mod builtins {
    use serde_json::{Map, Value};

    use super::Registry;
    use crate::foundation::{Validator, ValidatorError};
    use crate::validators::{Compare, Length, Max, MaxLength, Min, MinLength, Pattern, Range, Required, TextOptions};

    /// Takes the `trim` flag out of the props.
    fn text_options(props: &mut Map<String, Value>) -> TextOptions {
        TextOptions {
            trim: props.remove("trim").and_then(|v| v.as_bool()).unwrap_or(false),
        }
    }

    impl Registry {
        /// Creates a registry holding every built-in leaf.
        pub fn with_builtins() -> Self {
            let mut registry = Self::new();
            registry
                .register("required", |mut props| {
                    let options = text_options(&mut props);
                    Ok(Required::from_props(props).with_options(options).into())
                })
                .register("compare", |mut props| {
                    let options = text_options(&mut props);
                    Ok(Compare::from_props(props).with_options(options).into())
                })
                .register("min", |props| Ok(Min::from_props(props).into()))
                .register("max", |props| Ok(Max::from_props(props).into()))
                .register("range", |props| Ok(Range::from_props(props).into()))
                .register("min_length", |mut props| {
                    let options = text_options(&mut props);
                    Ok(MinLength::from_props(props).with_options(options).into())
                })
                .register("max_length", |mut props| {
                    let options = text_options(&mut props);
                    Ok(MaxLength::from_props(props).with_options(options).into())
                })
                .register("length", |mut props| {
                    let options = text_options(&mut props);
                    Ok(Length::from_props(props).with_options(options).into())
                })
                .register("pattern", |mut props| {
                    let options = text_options(&mut props);
                    let source = match props.remove("pattern") {
                        Some(Value::String(source)) => source,
                        _ => return Err(ValidatorError::missing_property("pattern", "pattern")),
                    };
                    let pattern: Validator = Pattern::parse(&source)?.with_props(props).with_options(options).into();
                    Ok(pattern)
                });
            registry
        }
    }
}
