//! Rules and patterns.

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::error::{Result, ValidateError};
use crate::validation::{PredicateValidator, Validator};

/// A named regular expression that must match a whole value.
///
/// The source is wrapped as `^(?:source)$`, the way the HTML `pattern`
/// attribute is interpreted.
#[derive(Debug, Clone)]
pub struct Pattern {
    name: String,
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compiles a pattern.
    pub fn new(name: impl Into<String>, source: &str) -> Result<Self> {
        let name = name.into();
        let regex = Regex::new(&format!("^(?:{source})$")).map_err(|source| {
            ValidateError::InvalidPattern {
                name: name.clone(),
                source,
            }
        })?;
        Ok(Self {
            name,
            source: source.to_string(),
            regex,
        })
    }

    /// Returns the pattern name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the unanchored source.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns whether the whole value matches.
    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

/// A named predicate with a default message, as stored in a
/// [`RuleRegistry`](crate::RuleRegistry) or attached to a single field.
#[derive(Clone)]
pub struct ValidationRule {
    name: String,
    validator: Arc<dyn Validator>,
}

impl fmt::Debug for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationRule")
            .field("name", &self.name)
            .field("message", &self.validator.message())
            .finish_non_exhaustive()
    }
}

impl ValidationRule {
    /// Wraps a validator under a rule name.
    pub fn new(name: impl Into<String>, validator: impl Validator + 'static) -> Self {
        Self {
            name: name.into(),
            validator: Arc::new(validator),
        }
    }

    /// Builds a rule from a boolean predicate and its failure message.
    ///
    /// ```
    /// use oxide_validate::ValidationRule;
    ///
    /// let rule = ValidationRule::from_predicate(
    ///     "even",
    ///     |v| v.parse::<i64>().is_ok_and(|n| n % 2 == 0),
    ///     "Enter an even number.",
    /// );
    /// assert!(rule.check("4").is_ok());
    /// assert_eq!(rule.check("5"), Err("Enter an even number.".to_string()));
    /// ```
    pub fn from_predicate<F>(name: impl Into<String>, predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self::new(name, PredicateValidator::new(predicate, message))
    }

    /// Returns the rule name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the default failure message.
    pub fn message(&self) -> &str {
        self.validator.message()
    }

    /// Runs the rule against a value.
    pub fn check(&self, value: &str) -> std::result::Result<(), String> {
        self.validator.validate(value)
    }
}

/// One declared constraint on a field.
///
/// Variants are listed in evaluation order; see [`Rule::precedence`].
#[derive(Debug, Clone)]
pub enum Rule {
    /// The value must be non-empty (checked, for checkables).
    Required,
    /// A declared `pattern` attribute.
    Pattern(Pattern),
    /// A reference into the rule registry, resolved on every pass.
    Named(String),
    /// A rule attached directly to the field.
    Custom(ValidationRule),
}

impl Rule {
    /// Returns the evaluation rank; lower runs first.
    pub fn precedence(&self) -> u8 {
        match self {
            Self::Required => 0,
            Self::Pattern(_) => 1,
            Self::Named(_) => 2,
            Self::Custom(_) => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::LengthValidator;

    #[test]
    fn test_pattern_matches_whole_value() {
        let p = Pattern::new("date", r"\d{2}/\d{2}/\d{4}").unwrap();
        assert!(p.is_match("01/01/2010"));
        assert!(!p.is_match("x01/01/2010"));
        assert!(!p.is_match("foo"));
        assert_eq!(p.source(), r"\d{2}/\d{2}/\d{4}");
    }

    #[test]
    fn test_pattern_with_own_anchors() {
        let p = Pattern::new("date", r"^\d{2}/\d{2}/\d{4}$").unwrap();
        assert!(p.is_match("01/01/2010"));
        assert!(!p.is_match("foo"));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = Pattern::new("broken", "(").unwrap_err();
        assert!(matches!(err, ValidateError::InvalidPattern { ref name, .. } if name == "broken"));
    }

    #[test]
    fn test_rule_wraps_validator() {
        let rule = ValidationRule::new("short", LengthValidator::new(None, Some(3)));
        assert_eq!(rule.name(), "short");
        assert!(rule.check("abc").is_ok());
        assert!(rule.check("abcd").is_err());
        assert!(format!("{rule:?}").contains("short"));
    }

    #[test]
    fn test_precedence_order() {
        let rules = [
            Rule::Custom(ValidationRule::from_predicate("x", |_| true, "x")),
            Rule::Named("email".to_string()),
            Rule::Pattern(Pattern::new("p", "a").unwrap()),
            Rule::Required,
        ];
        let ranks: Vec<u8> = rules.iter().map(Rule::precedence).collect();
        assert_eq!(ranks, vec![3, 2, 1, 0]);
    }
}
