//! Field validators.
//!
//! Validators are the predicates behind registry rules and field-attached
//! rules. They only ever see non-empty values: emptiness is decided by the
//! `Required` rule before any validator runs.

use crate::rule::Pattern;

/// Default message for a failed `required` check.
pub const REQUIRED_MESSAGE: &str = "This field is required.";

/// Default message for a failed pattern match.
pub const PATTERN_MESSAGE: &str = "Please match the requested format.";

/// Trait for field validators.
pub trait Validator: Send + Sync {
    /// Validates a value and returns an error message if invalid.
    fn validate(&self, value: &str) -> Result<(), String>;

    /// Returns the error message for this validator.
    fn message(&self) -> &str;
}

/// Validator that requires a non-empty value.
#[derive(Debug, Clone)]
pub struct RequiredValidator {
    message: String,
}

impl RequiredValidator {
    /// Creates a new RequiredValidator with default message.
    pub fn new() -> Self {
        Self {
            message: REQUIRED_MESSAGE.to_string(),
        }
    }

    /// Creates a new RequiredValidator with custom message.
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Default for RequiredValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator for RequiredValidator {
    fn validate(&self, value: &str) -> Result<(), String> {
        if value.is_empty() {
            Err(self.message.clone())
        } else {
            Ok(())
        }
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Validator for the `minlength`/`maxlength` constraint pair, counted in
/// characters.
#[derive(Debug, Clone)]
pub struct LengthValidator {
    min: Option<usize>,
    max: Option<usize>,
    message: String,
}

impl LengthValidator {
    pub fn new(min: Option<usize>, max: Option<usize>) -> Self {
        let message = match (min, max) {
            (Some(min), Some(max)) => format!("Use between {min} and {max} characters."),
            (Some(min), None) => format!("Use at least {min} characters."),
            (None, Some(max)) => format!("Use at most {max} characters."),
            (None, None) => "Invalid length.".to_string(),
        };
        Self { min, max, message }
    }
}

impl Validator for LengthValidator {
    fn validate(&self, value: &str) -> Result<(), String> {
        let len = value.chars().count();
        let short = self.min.is_some_and(|min| len < min);
        let long = self.max.is_some_and(|max| len > max);
        if short || long {
            Err(self.message.clone())
        } else {
            Ok(())
        }
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Validator backed by a [`Pattern`].
#[derive(Debug, Clone)]
pub struct RegexValidator {
    pattern: Pattern,
    message: String,
}

impl RegexValidator {
    /// Creates a new RegexValidator.
    pub fn new(pattern: Pattern, message: impl Into<String>) -> Self {
        Self {
            pattern,
            message: message.into(),
        }
    }

    /// Returns the underlying pattern.
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }
}

impl Validator for RegexValidator {
    fn validate(&self, value: &str) -> Result<(), String> {
        if self.pattern.is_match(value) {
            Ok(())
        } else {
            Err(self.message.clone())
        }
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Validator for numeric range.
#[derive(Debug, Clone)]
pub struct RangeValidator {
    min: Option<f64>,
    max: Option<f64>,
    message: String,
}

impl RangeValidator {
    /// Creates a range check; an unparseable value always fails.
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        let message = match (min, max) {
            (Some(min), Some(max)) => format!("Value must be between {min} and {max}."),
            (Some(min), None) => format!("Value must be at least {min}."),
            (None, Some(max)) => format!("Value must be at most {max}."),
            (None, None) => "Invalid value.".to_string(),
        };
        Self { min, max, message }
    }
}

impl Validator for RangeValidator {
    fn validate(&self, value: &str) -> Result<(), String> {
        let num: f64 = value
            .trim()
            .parse()
            .map_err(|_| "Enter a valid number.".to_string())?;
        let below = self.min.is_some_and(|min| num < min);
        let above = self.max.is_some_and(|max| num > max);
        if below || above {
            Err(self.message.clone())
        } else {
            Ok(())
        }
    }

    fn message(&self) -> &str {
        &self.message
    }
}

/// Validator wrapping a host-supplied boolean predicate.
pub struct PredicateValidator<F> {
    predicate: F,
    message: String,
}

impl<F> PredicateValidator<F>
where
    F: Fn(&str) -> bool + Send + Sync,
{
    /// Creates a new PredicateValidator.
    pub fn new(predicate: F, message: impl Into<String>) -> Self {
        Self {
            predicate,
            message: message.into(),
        }
    }
}

impl<F> std::fmt::Debug for PredicateValidator<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredicateValidator")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

impl<F> Validator for PredicateValidator<F>
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn validate(&self, value: &str) -> Result<(), String> {
        if (self.predicate)(value) {
            Ok(())
        } else {
            Err(self.message.clone())
        }
    }

    fn message(&self) -> &str {
        &self.message
    }
}
