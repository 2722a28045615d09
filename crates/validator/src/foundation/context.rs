//! Validation context and declared props
//!
//! A [`Context`] carries auxiliary named properties (locale, thresholds, ...)
//! through a validation call. It is never mutated: `with` and `merged`
//! return new contexts sharing the untouched parts.
//!
//! [`PropsSource`] is how composers and leaves declare their properties:
//! either a static record or a function of the context, resolved once per
//! validation call and never at construction.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::foundation::ValidationConfig;

// ============================================================================
// CONTEXT
// ============================================================================

/// Auxiliary properties and configuration for a validation call.
///
/// # Examples
///
/// ```rust,ignore
/// use keel_validator::foundation::Context;
///
/// let ctx = Context::new().with("locale", "en-GB").with("min_age", 18);
/// assert_eq!(ctx.get("min_age"), Some(&serde_json::json!(18)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    properties: Arc<Map<String, Value>>,
    config: ValidationConfig,
}

impl Context {
    /// Creates an empty context with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context from a property map.
    pub fn from_properties(properties: Map<String, Value>) -> Self {
        Self {
            properties: Arc::new(properties),
            config: ValidationConfig::default(),
        }
    }

    /// Returns a context with one more property.
    #[must_use = "contexts are immutable; use the returned context"]
    pub fn with(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut properties = self.properties.as_ref().clone();
        properties.insert(key.into(), value.into());
        Self {
            properties: Arc::new(properties),
            config: self.config,
        }
    }

    /// Returns a context whose properties are `self` overlaid with `extra`.
    #[must_use = "contexts are immutable; use the returned context"]
    pub fn merged(&self, extra: &Map<String, Value>) -> Self {
        if extra.is_empty() {
            return self.clone();
        }
        let mut properties = self.properties.as_ref().clone();
        properties.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self {
            properties: Arc::new(properties),
            config: self.config,
        }
    }

    /// Returns a context using `config`.
    #[must_use = "contexts are immutable; use the returned context"]
    pub fn with_config(&self, config: ValidationConfig) -> Self {
        Self {
            properties: Arc::clone(&self.properties),
            config,
        }
    }

    /// Looks up a property.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// Returns all properties.
    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Returns `true` if there are no properties.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl From<Map<String, Value>> for Context {
    fn from(properties: Map<String, Value>) -> Self {
        Self::from_properties(properties)
    }
}

// ============================================================================
// PROPS SOURCE
// ============================================================================

type PropsResolver = dyn Fn(&Context) -> Map<String, Value> + Send + Sync;

/// Declared properties of a composer or leaf.
#[derive(Clone, Default)]
pub enum PropsSource {
    /// No declared properties.
    #[default]
    Empty,
    /// A fixed record.
    Static(Arc<Map<String, Value>>),
    /// A record computed from the context on every validation call.
    Resolver(Arc<PropsResolver>),
}

impl PropsSource {
    /// Creates a source from a context function.
    pub fn resolver<F>(resolve: F) -> Self
    where
        F: Fn(&Context) -> Map<String, Value> + Send + Sync + 'static,
    {
        Self::Resolver(Arc::new(resolve))
    }

    /// Produces the record for this call.
    pub fn resolve(&self, context: &Context) -> Map<String, Value> {
        match self {
            Self::Empty => Map::new(),
            Self::Static(props) => props.as_ref().clone(),
            Self::Resolver(resolve) => resolve(context),
        }
    }
}

impl From<Map<String, Value>> for PropsSource {
    fn from(props: Map<String, Value>) -> Self {
        Self::Static(Arc::new(props))
    }
}

/// Non-object values declare no properties.
impl From<Value> for PropsSource {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(props) => props.into(),
            _ => Self::Empty,
        }
    }
}

impl fmt::Debug for PropsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Static(props) => f.debug_tuple("Static").field(props).finish(),
            Self::Resolver(_) => f.write_str("Resolver(<function>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn with_leaves_the_original_untouched() {
        let base = Context::new().with("locale", "en");
        let derived = base.with("locale", "fr").with("strict", true);
        assert_eq!(base.get("locale"), Some(&json!("en")));
        assert_eq!(derived.get("locale"), Some(&json!("fr")));
        assert!(base.get("strict").is_none());
    }

    #[test]
    fn merged_overlays_extra_properties() {
        let base = Context::new().with("a", 1).with("b", 2);
        let Value::Object(extra) = json!({"b": 20, "c": 30}) else {
            unreachable!()
        };
        let merged = base.merged(&extra);
        assert_eq!(Value::Object(merged.properties().clone()), json!({"a": 1, "b": 20, "c": 30}));
    }

    #[test]
    fn resolver_is_not_called_until_resolve() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let source = PropsSource::resolver(move |ctx| {
            counter.fetch_add(1, Ordering::SeqCst);
            let mut props = Map::new();
            props.insert("limit".into(), ctx.get("limit").cloned().unwrap_or(Value::Null));
            props
        });
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let props = source.resolve(&Context::new().with("limit", 3));
        assert_eq!(props.get("limit"), Some(&json!(3)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn non_object_values_declare_nothing() {
        assert!(PropsSource::from(json!(5)).resolve(&Context::new()).is_empty());
    }
}
