//! Built-in leaf validators
//!
//! Leaves are ordinary [`Validate`](crate::foundation::Validate)
//! implementations; the engine treats them like any user-supplied function.
//! Each one reads its properties from a [`PropsSource`] at validation time,
//! so a property can come from the [`Context`]:
//!
//! ```rust,ignore
//! use keel_validator::prelude::*;
//!
//! let age = Min::from_fn(|ctx| props_map(json!({"min": ctx.get("min_age").cloned()})));
//! let result = validate(&age.into(), &json!(16), &Context::new().with("min_age", 18))?;
//! assert!(!result.is_valid);
//! ```
//!
//! Empty values (`null` and the empty string) are valid for every leaf
//! except [`Required`]; whether a value must be present is a separate check.
//!
//! | leaf | properties | result fields |
//! |---|---|---|
//! | [`required`] | `required` (default `true`) | `required` |
//! | [`compare`] | `compare` | `compare` |
//! | [`min`] / [`max`] | `min` / `max` | `min` / `max` |
//! | [`range`] | `min`, `max` | `min`, `max`, `every` |
//! | [`min_length`] / [`max_length`] | `min_length` / `max_length` | limit, `length` |
//! | [`length`] | `min_length`, `max_length` | both limits, `length`, `every` |
//! | [`pattern`] | a compiled regex | `pattern` |

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::foundation::{Outcome, ValidationResult, ValidatorError};

pub mod compare;
pub mod length;
pub mod pattern;
pub mod range;
pub mod required;

pub use compare::{Compare, compare};
pub use length::{Length, MaxLength, MinLength, length, max_length, min_length};
pub use pattern::{Pattern, pattern};
pub use range::{Max, Min, Range, max, min, range};
pub use required::{Required, optional, required};

// ============================================================================
// TEXT OPTIONS
// ============================================================================

/// Explicit string handling for leaves that inspect text.
///
/// There is no global default; each leaf carries its own options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextOptions {
    /// Ignore leading and trailing whitespace.
    pub trim: bool,
}

impl TextOptions {
    /// Options that trim whitespace.
    pub fn trimmed() -> Self {
        Self { trim: true }
    }

    /// Returns the string content of `value` as this leaf should see it.
    pub fn text<'a>(&self, value: &'a Value) -> Option<&'a str> {
        value.as_str().map(|s| if self.trim { s.trim() } else { s })
    }

    /// Returns `true` for `null` and for a string that is empty as seen
    /// through these options.
    pub fn is_empty(&self, value: &Value) -> bool {
        value.is_null() || self.text(value).is_some_and(str::is_empty)
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Converts a JSON object literal into a props map; other values give an
/// empty map.
pub fn props_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Reads a numeric property, failing if it is absent or not a number.
fn number_prop(props: &Map<String, Value>, validator: &'static str, name: &'static str) -> Result<f64, ValidatorError> {
    props
        .get(name)
        .and_then(Value::as_f64)
        .ok_or_else(|| ValidatorError::missing_property(validator, name))
}

/// Reads a non-negative integer property, failing if it is absent or not one.
fn count_prop(props: &Map<String, Value>, validator: &'static str, name: &'static str) -> Result<u64, ValidatorError> {
    props
        .get(name)
        .and_then(Value::as_u64)
        .ok_or_else(|| ValidatorError::missing_property(validator, name))
}

/// Builds a leaf record: declared props first, computed fields on top.
fn record(props: Map<String, Value>, is_valid: bool, computed: impl IntoIterator<Item = (&'static str, Value)>) -> Outcome {
    let mut result = ValidationResult::new(is_valid).with_fields(props);
    for (key, value) in computed {
        result.fields.insert(key.to_owned(), value);
    }
    Outcome::Record(result)
}
