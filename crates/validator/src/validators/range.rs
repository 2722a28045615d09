//! Numeric bound validators

use serde_json::{Map, Value, json};

use crate::foundation::{Context, Outcome, PropsSource, Validate, Validator, ValidatorError, validate};
use crate::validators::{number_prop, record};

// ============================================================================
// MIN / MAX
// ============================================================================

/// Validates that a number is at least the `min` property.
///
/// Non-numeric, non-empty values are invalid.
#[derive(Debug, Clone)]
pub struct Min {
    props: PropsSource,
}

/// Validates that a number is at most the `max` property.
///
/// Non-numeric, non-empty values are invalid.
#[derive(Debug, Clone)]
pub struct Max {
    props: PropsSource,
}

/// Shared check for a single numeric bound.
fn check_bound(
    props: Map<String, Value>,
    value: &Value,
    name: &'static str,
    within: fn(f64, f64) -> bool,
) -> Result<Outcome, ValidatorError> {
    let bound = number_prop(&props, name, name)?;
    let is_valid = match value {
        Value::Null => true,
        Value::String(s) if s.is_empty() => true,
        Value::Number(n) => n.as_f64().is_some_and(|n| within(n, bound)),
        _ => false,
    };
    Ok(record(props, is_valid, [(name, json!(bound))]))
}

macro_rules! bound_validator {
    ($ty:ident, $key:literal, $ctor:ident, $within:expr) => {
        impl $ty {
            #[doc = concat!("A bound of `", $key, "`.")]
            pub fn new(bound: f64) -> Self {
                let mut props = Map::new();
                props.insert($key.into(), json!(bound));
                Self::from_props(props)
            }

            #[doc = concat!("A bound configured by `props`; `", $key, "` is mandatory.")]
            pub fn from_props(props: impl Into<PropsSource>) -> Self {
                Self { props: props.into() }
            }

            /// A bound whose props are computed from the context.
            pub fn from_fn<F>(resolve: F) -> Self
            where
                F: Fn(&Context) -> Map<String, Value> + Send + Sync + 'static,
            {
                Self::from_props(PropsSource::resolver(resolve))
            }
        }

        impl Validate for $ty {
            fn validate(&self, value: &Value, context: &Context) -> Result<Outcome, ValidatorError> {
                check_bound(self.props.resolve(context), value, $key, $within)
            }
        }

        impl From<$ty> for Validator {
            fn from(bound: $ty) -> Self {
                Validator::new(bound)
            }
        }

        #[doc = concat!("Creates a `", $key, "` bound.")]
        pub fn $ctor(bound: f64) -> Validator {
            $ty::new(bound).into()
        }
    };
}

bound_validator!(Min, "min", min, |n, bound| n >= bound);
bound_validator!(Max, "max", max, |n, bound| n <= bound);

// ============================================================================
// RANGE
// ============================================================================

/// Validates that a number lies within `min..=max`.
///
/// Runs [`Min`] then [`Max`] in sequence, so the result carries the
/// sequential trace alongside both bounds.
#[derive(Debug, Clone)]
pub struct Range {
    props: PropsSource,
}

impl Range {
    /// An inclusive range.
    pub fn new(min: f64, max: f64) -> Self {
        let mut props = Map::new();
        props.insert("min".into(), json!(min));
        props.insert("max".into(), json!(max));
        Self::from_props(props)
    }

    /// A range configured by `props`; `min` and `max` are mandatory.
    pub fn from_props(props: impl Into<PropsSource>) -> Self {
        Self { props: props.into() }
    }

    /// A range whose props are computed from the context.
    pub fn from_fn<F>(resolve: F) -> Self
    where
        F: Fn(&Context) -> Map<String, Value> + Send + Sync + 'static,
    {
        Self::from_props(PropsSource::resolver(resolve))
    }
}

impl Validate for Range {
    fn validate(&self, value: &Value, context: &Context) -> Result<Outcome, ValidatorError> {
        let props = self.props.resolve(context);
        let lower = number_prop(&props, "range", "min")?;
        let upper = number_prop(&props, "range", "max")?;

        let bounds = Validator::sequence(vec![Validator::from(Min::new(lower)), Max::new(upper).into()]);
        let mut result = validate(&bounds, value, context)?;

        let mut fields = props;
        fields.extend(std::mem::take(&mut result.fields));
        result.fields = fields;
        Ok(Outcome::Record(result))
    }
}

impl From<Range> for Validator {
    fn from(range: Range) -> Self {
        Validator::new(range)
    }
}

/// Creates an inclusive numeric range check.
pub fn range(min: f64, max: f64) -> Validator {
    Range::new(min, max).into()
}
