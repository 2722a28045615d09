//! Regular expression validator

use regex::Regex;
use serde_json::{Value, json};

use crate::foundation::{Context, Outcome, PropsSource, Validate, Validator, ValidatorError};
use crate::validators::{TextOptions, record};

/// Validates that a string matches a regular expression.
///
/// Non-string, non-empty values are invalid. The result carries the source
/// of the expression under `pattern`.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
    props: PropsSource,
    options: TextOptions,
}

impl Pattern {
    /// Matches against `regex`.
    pub fn new(regex: Regex) -> Self {
        Self {
            regex,
            props: PropsSource::Empty,
            options: TextOptions::default(),
        }
    }

    /// Compiles `source` and matches against it.
    ///
    /// # Errors
    ///
    /// A custom `pattern` error if `source` is not a valid expression.
    pub fn parse(source: &str) -> Result<Self, ValidatorError> {
        Regex::new(source)
            .map(Self::new)
            .map_err(|err| ValidatorError::custom("pattern", err.to_string()))
    }

    /// Declares extra props reported with every result.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_props(mut self, props: impl Into<PropsSource>) -> Self {
        self.props = props.into();
        self
    }

    /// Sets the text options.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_options(mut self, options: TextOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the compiled expression.
    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

impl Validate for Pattern {
    fn validate(&self, value: &Value, context: &Context) -> Result<Outcome, ValidatorError> {
        let props = self.props.resolve(context);
        let is_valid = self.options.is_empty(value)
            || self.options.text(value).is_some_and(|text| self.regex.is_match(text));
        Ok(record(props, is_valid, [("pattern", json!(self.regex.as_str()))]))
    }
}

impl From<Pattern> for Validator {
    fn from(pattern: Pattern) -> Self {
        Validator::new(pattern)
    }
}

/// Creates a pattern check.
pub fn pattern(regex: Regex) -> Validator {
    Pattern::new(regex).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::validate;
    use rstest::rstest;

    fn digits() -> Validator {
        pattern(Regex::new(r"^\d+$").expect("valid regex"))
    }

    #[rstest]
    #[case(json!("12345"), true)]
    #[case(json!("12a45"), false)]
    #[case(json!(""), true)]
    #[case(json!(null), true)]
    #[case(json!(12345), false)]
    fn test_pattern(#[case] value: Value, #[case] expected: bool) {
        let result = validate(&digits(), &value, &Context::new()).expect("no error");
        assert_eq!(result.is_valid, expected);
        assert_eq!(result.field("pattern"), Some(&json!(r"^\d+$")));
    }

    #[test]
    fn test_invalid_source_is_reported() {
        let err = Pattern::parse("(unclosed").expect_err("invalid regex");
        assert!(matches!(err, ValidatorError::Custom { .. }));
    }
}
