//! Engine configuration
//!
//! Carried by the [`Context`](crate::foundation::Context) so that it reaches
//! every composition level without ambient global state.

use serde::{Deserialize, Serialize};

/// Tunables for a validation call.
///
/// # Examples
///
/// ```rust,ignore
/// let config: ValidationConfig = serde_json::from_str(r#"{"concurrent_field_resolution": false}"#)?;
/// let ctx = Context::default().with_config(config);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Merge context properties into every function-validator result at the
    /// lowest precedence. On by default.
    pub merge_context_fields: bool,

    /// Resolve pending structural fields concurrently rather than in
    /// declaration order.
    pub concurrent_field_resolution: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            merge_context_fields: true,
            concurrent_field_resolution: true,
        }
    }
}

impl ValidationConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether context properties are merged into results.
    #[must_use = "builder methods must be chained or built"]
    pub fn merge_context_fields(mut self, enabled: bool) -> Self {
        self.merge_context_fields = enabled;
        self
    }

    /// Sets whether pending structural fields resolve concurrently.
    #[must_use = "builder methods must be chained or built"]
    pub fn concurrent_field_resolution(mut self, enabled: bool) -> Self {
        self.concurrent_field_resolution = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config: ValidationConfig =
            serde_json::from_str(r#"{"concurrent_field_resolution": false}"#).expect("valid config");
        assert!(config.merge_context_fields);
        assert!(!config.concurrent_field_resolution);
    }
}
