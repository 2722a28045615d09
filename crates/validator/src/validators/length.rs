//! Length validators
//!
//! Strings are measured in characters, arrays in elements. Other non-empty
//! values have no length and are invalid.

use serde_json::{Map, Value, json};

use crate::foundation::{Context, Outcome, PropsSource, Validate, Validator, ValidatorError, validate};
use crate::validators::{TextOptions, count_prop, record};

/// Measures `value` as seen through `options`.
fn measure(value: &Value, options: TextOptions) -> Option<u64> {
    match value {
        Value::Null => Some(0),
        Value::String(_) => options.text(value).map(|s| s.chars().count() as u64),
        Value::Array(items) => Some(items.len() as u64),
        _ => None,
    }
}

/// Shared check for a single length limit.
fn check_limit(
    props: Map<String, Value>,
    value: &Value,
    options: TextOptions,
    name: &'static str,
    within: fn(u64, u64) -> bool,
) -> Result<Outcome, ValidatorError> {
    let limit = count_prop(&props, name, name)?;
    let length = measure(value, options);
    let is_valid = match length {
        _ if options.is_empty(value) => true,
        Some(length) => within(length, limit),
        None => false,
    };

    let mut computed = vec![(name, json!(limit))];
    if let Some(length) = length {
        computed.push(("length", json!(length)));
    }
    Ok(record(props, is_valid, computed))
}

macro_rules! limit_validator {
    ($(#[$meta:meta])* $ty:ident, $key:literal, $ctor:ident, $within:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $ty {
            props: PropsSource,
            options: TextOptions,
        }

        impl $ty {
            #[doc = concat!("A limit of `", $key, "`.")]
            pub fn new(limit: u64) -> Self {
                let mut props = Map::new();
                props.insert($key.into(), json!(limit));
                Self::from_props(props)
            }

            #[doc = concat!("A limit configured by `props`; `", $key, "` is mandatory.")]
            pub fn from_props(props: impl Into<PropsSource>) -> Self {
                Self {
                    props: props.into(),
                    options: TextOptions::default(),
                }
            }

            /// A limit whose props are computed from the context.
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

        impl Validate for $ty {
            fn validate(&self, value: &Value, context: &Context) -> Result<Outcome, ValidatorError> {
                check_limit(self.props.resolve(context), value, self.options, $key, $within)
            }
        }

        impl From<$ty> for Validator {
            fn from(limit: $ty) -> Self {
                Validator::new(limit)
            }
        }

        #[doc = concat!("Creates a `", $key, "` check.")]
        pub fn $ctor(limit: u64) -> Validator {
            $ty::new(limit).into()
        }
    };
}

limit_validator!(
    /// Validates that a string or array has at least `min_length` items.
    MinLength, "min_length", min_length, |length, limit| length >= limit
);
limit_validator!(
    /// Validates that a string or array has at most `max_length` items.
    MaxLength, "max_length", max_length, |length, limit| length <= limit
);

// ============================================================================
// LENGTH
// ============================================================================

/// Validates that a length lies within `min_length..=max_length`.
///
/// Runs [`MinLength`] then [`MaxLength`] in sequence.
#[derive(Debug, Clone)]
pub struct Length {
    props: PropsSource,
    options: TextOptions,
}

impl Length {
    /// An inclusive length range.
    pub fn new(min_length: u64, max_length: u64) -> Self {
        let mut props = Map::new();
        props.insert("min_length".into(), json!(min_length));
        props.insert("max_length".into(), json!(max_length));
        Self::from_props(props)
    }

    /// A range configured by `props`; both limits are mandatory.
    pub fn from_props(props: impl Into<PropsSource>) -> Self {
        Self {
            props: props.into(),
            options: TextOptions::default(),
        }
    }

    /// A range whose props are computed from the context.
    pub fn from_fn<F>(resolve: F) -> Self
    where
        F: Fn(&Context) -> Map<String, Value> + Send + Sync + 'static,
    {
        Self::from_props(PropsSource::resolver(resolve))
    }

    /// Sets the text options for both limits.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_options(mut self, options: TextOptions) -> Self {
        self.options = options;
        self
    }
}

impl Validate for Length {
    fn validate(&self, value: &Value, context: &Context) -> Result<Outcome, ValidatorError> {
        let props = self.props.resolve(context);
        let lower = count_prop(&props, "length", "min_length")?;
        let upper = count_prop(&props, "length", "max_length")?;

        let limits = Validator::sequence(vec![
            Validator::from(MinLength::new(lower).with_options(self.options)),
            MaxLength::new(upper).with_options(self.options).into(),
        ]);
        let mut result = validate(&limits, value, context)?;

        let mut fields = props;
        fields.extend(std::mem::take(&mut result.fields));
        result.fields = fields;
        Ok(Outcome::Record(result))
    }
}

impl From<Length> for Validator {
    fn from(length: Length) -> Self {
        Validator::new(length)
    }
}

/// Creates an inclusive length range check.
pub fn length(min_length: u64, max_length: u64) -> Validator {
    Length::new(min_length, max_length).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(json!("abcde"), true)]
    #[case(json!("abc"), false)]
    #[case(json!("日本語です!"), true)]
    #[case(json!([1, 2, 3, 4, 5]), true)]
    #[case(json!(""), true)]
    #[case(json!(null), true)]
    #[case(json!(12345), false)]
    fn test_min_length(#[case] value: Value, #[case] expected: bool) {
        let result = validate(&min_length(5), &value, &Context::new()).expect("no error");
        assert_eq!(result.is_valid, expected);
        assert_eq!(result.field("min_length"), Some(&json!(5)));
    }

    #[test]
    fn test_min_length_reports_the_measured_length() {
        let result = validate(&min_length(5), &json!("abc"), &Context::new()).expect("no error");
        assert_eq!(
            result.to_json_value(),
            json!({"is_valid": false, "value": "abc", "min_length": 5, "length": 3})
        );
    }

    #[test]
    fn test_trimmed_length() {
        let validator: Validator = MaxLength::new(3).with_options(TextOptions::trimmed()).into();
        let result = validate(&validator, &json!("  abc  "), &Context::new()).expect("no error");
        assert!(result.is_valid);
        assert_eq!(result.field("length"), Some(&json!(3)));
    }

    #[test]
    fn test_length_range() {
        let result = validate(&length(2, 4), &json!("abcdef"), &Context::new()).expect("no error");
        assert!(!result.is_valid);
        assert_eq!(result.field("min_length"), Some(&json!(2)));
        assert_eq!(result.field("max_length"), Some(&json!(4)));
        assert_eq!(result.field("length"), Some(&json!(6)));
        assert_eq!(result.every.map(|t| t.len()), Some(2));
    }

    #[test]
    fn test_negative_limit_is_fatal() {
        let validator: Validator = MinLength::from_props(json!({"min_length": -1})).into();
        let err = validate(&validator, &json!("x"), &Context::new()).expect_err("fatal");
        assert!(matches!(err, ValidatorError::MissingRequiredProperty { .. }));
    }
}
