//! The rule registry and pattern library.
//!
//! A registry maps rule names to [`ValidationRule`]s and pattern names to
//! [`Pattern`]s. It is shared behind an `Arc` and may be extended at any time;
//! every validation pass works from a [`RuleSet`] snapshot taken when the pass
//! starts, so registrations never change the outcome of a pass in flight.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::Lazy;
use tracing::{debug, warn};

use crate::error::{Result, ValidateError};
use crate::rule::{Pattern, ValidationRule};
use crate::validation::{RegexValidator, RequiredValidator, Validator, PATTERN_MESSAGE};

/// Built-in pattern library: name, source, message.
const LIBRARY: &[(&str, &str, &str)] = &[
    (
        "phone",
        r"(\+[0-9]{1,3}[ .\-]?)?(\([0-9]{3}\)[ .\-]?)?[0-9A-Z .\-]{1,32}((x|ext|extension)[0-9]{1,4})?",
        "Enter a valid phone number.",
    ),
    (
        "email",
        r"[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}",
        "Enter a valid email address.",
    ),
    (
        "url",
        r"(https?|ftp)://[^\s/$.?#][^\s]*",
        "Enter a valid URL.",
    ),
    (
        "number",
        r"-?(\d+|\d{1,3}(,\d{3})+)(\.\d+)?|-?\.\d+",
        "Enter a valid number.",
    ),
    (
        "dateISO",
        r"\d{4}[/\-]\d{1,2}[/\-]\d{1,2}",
        "Enter a valid date (YYYY-MM-DD).",
    ),
    ("alpha", r"[a-zA-Z]+", "Use letters only."),
    ("alphaNumeric", r"\w+", "Use letters and numbers only."),
    ("integer", r"-?\d+", "Enter a whole number."),
];

static GLOBAL: Lazy<Arc<RuleRegistry>> = Lazy::new(|| Arc::new(RuleRegistry::with_builtins()));

#[derive(Debug, Clone)]
struct LibraryEntry {
    pattern: Pattern,
    message: String,
}

/// Shared, mutable table of named rules and patterns.
#[derive(Debug, Default)]
pub struct RuleRegistry {
    rules: RwLock<HashMap<String, ValidationRule>>,
    patterns: RwLock<HashMap<String, LibraryEntry>>,
}

impl RuleRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry seeded with `required` and the pattern library.
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        registry.register_validator("required", RequiredValidator::new());
        for (name, source, message) in LIBRARY {
            if let Err(err) = registry.register_pattern_with_message(name, source, message) {
                warn!(%err, "skipping built-in pattern");
            }
        }
        registry
    }

    /// Returns the process-wide default registry.
    ///
    /// Engines built with [`Validate::new`](crate::Validate::new) share it;
    /// pass an explicit registry to
    /// [`Validate::with_registry`](crate::Validate::with_registry) to avoid
    /// the shared state.
    pub fn global() -> Arc<Self> {
        Arc::clone(&GLOBAL)
    }

    /// Registers a rule from a predicate and its default message.
    ///
    /// Replaces any rule of the same name. Takes effect on the next pass.
    pub fn register_rule<F>(&self, name: &str, predicate: F, default_message: &str)
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        self.insert_rule(ValidationRule::from_predicate(name, predicate, default_message));
    }

    /// Registers a rule backed by a [`Validator`].
    pub fn register_validator(&self, name: &str, validator: impl Validator + 'static) {
        self.insert_rule(ValidationRule::new(name, validator));
    }

    fn insert_rule(&self, rule: ValidationRule) {
        debug!(rule = rule.name(), "registering rule");
        self.rules
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(rule.name().to_string(), rule);
    }

    /// Adds a named pattern to the library.
    pub fn register_pattern(&self, name: &str, source: &str) -> Result<()> {
        self.register_pattern_with_message(name, source, PATTERN_MESSAGE)
    }

    /// Adds a named pattern with its own failure message.
    pub fn register_pattern_with_message(
        &self,
        name: &str,
        source: &str,
        message: &str,
    ) -> Result<()> {
        let pattern = Pattern::new(name, source)?;
        debug!(pattern = name, "registering pattern");
        self.patterns
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                name.to_string(),
                LibraryEntry {
                    pattern,
                    message: message.to_string(),
                },
            );
        Ok(())
    }

    /// Adds several patterns at once.
    ///
    /// Every source is compiled before any is inserted, so a bad entry leaves
    /// the library untouched.
    pub fn add_patterns<'a, I>(&self, patterns: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let compiled = patterns
            .into_iter()
            .map(|(name, source)| Pattern::new(name, source))
            .collect::<Result<Vec<_>>>()?;
        let mut table = self.patterns.write().unwrap_or_else(PoisonError::into_inner);
        for pattern in compiled {
            table.insert(
                pattern.name().to_string(),
                LibraryEntry {
                    pattern,
                    message: PATTERN_MESSAGE.to_string(),
                },
            );
        }
        Ok(())
    }

    /// Returns a library pattern by name.
    pub fn pattern(&self, name: &str) -> Option<Pattern> {
        self.patterns
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .map(|entry| entry.pattern.clone())
    }

    /// Returns whether `name` resolves to a rule or a library pattern.
    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_ok()
    }

    /// Resolves a name to a rule. Rules shadow library patterns of the same
    /// name.
    pub fn resolve(&self, name: &str) -> Result<ValidationRule> {
        self.snapshot().resolve(name)
    }

    /// Returns all resolvable names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.snapshot().names()
    }

    /// Takes a consistent copy of the current tables.
    pub fn snapshot(&self) -> RuleSet {
        let rules = self
            .rules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let patterns = self
            .patterns
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        RuleSet { rules, patterns }
    }
}

/// An immutable view of a registry at one point in time.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: HashMap<String, ValidationRule>,
    patterns: HashMap<String, LibraryEntry>,
}

impl RuleSet {
    /// Resolves a name to a rule.
    pub fn resolve(&self, name: &str) -> Result<ValidationRule> {
        if let Some(rule) = self.rules.get(name) {
            return Ok(rule.clone());
        }
        self.patterns
            .get(name)
            .map(|entry| {
                ValidationRule::new(
                    name,
                    RegexValidator::new(entry.pattern.clone(), entry.message.clone()),
                )
            })
            .ok_or_else(|| ValidateError::RuleNotFound(name.to_string()))
    }

    /// Returns the message registered for `required`, or the default.
    pub fn required_message(&self) -> &str {
        self.rules
            .get("required")
            .map_or(crate::validation::REQUIRED_MESSAGE, ValidationRule::message)
    }

    /// Returns all resolvable names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .rules
            .keys()
            .chain(self.patterns.keys())
            .cloned()
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins() {
        let registry = RuleRegistry::with_builtins();
        for name in ["required", "email", "phone", "url", "number", "dateISO", "alpha", "alphaNumeric", "integer"] {
            assert!(registry.contains(name), "missing built-in {name}");
        }
    }

    #[test]
    fn test_email_pattern() {
        let rule = RuleRegistry::with_builtins().resolve("email").unwrap();
        assert!(rule.check("test@example.com").is_ok());
        assert!(rule.check("user.name@domain.co.uk").is_ok());
        assert_eq!(
            rule.check("invalid email"),
            Err("Enter a valid email address.".to_string())
        );
    }

    #[test]
    fn test_library_patterns() {
        let set = RuleRegistry::with_builtins().snapshot();
        let check = |name: &str, value: &str| set.resolve(name).unwrap().check(value).is_ok();
        assert!(check("url", "https://example.com/path"));
        assert!(!check("url", "example.com"));
        assert!(check("integer", "-42"));
        assert!(!check("integer", "4.2"));
        assert!(check("number", "1,234.5"));
        assert!(check("number", "-.5"));
        assert!(!check("number", "-"));
        assert!(!check("number", "."));
        assert!(check("dateISO", "2024-01-15"));
        assert!(!check("alpha", "abc1"));
        assert!(check("alphaNumeric", "abc_1"));
        assert!(check("phone", "+1 (555) 123-4567"));
    }

    #[test]
    fn test_unknown_rule() {
        let err = RuleRegistry::new().resolve("nope").unwrap_err();
        assert!(matches!(err, ValidateError::RuleNotFound(ref name) if name == "nope"));
    }

    #[test]
    fn test_register_rule_replaces() {
        let registry = RuleRegistry::new();
        registry.register_rule("short", |v| v.len() < 3, "Too long.");
        registry.register_rule("short", |v| v.len() < 2, "Way too long.");
        let rule = registry.resolve("short").unwrap();
        assert_eq!(rule.check("ab"), Err("Way too long.".to_string()));
    }

    #[test]
    fn test_rules_shadow_patterns() {
        let registry = RuleRegistry::with_builtins();
        registry.register_rule("email", |_| true, "never");
        assert!(registry.resolve("email").unwrap().check("nope").is_ok());
    }

    #[test]
    fn test_add_patterns_is_all_or_nothing() {
        let registry = RuleRegistry::new();
        assert!(registry
            .add_patterns([("zip", r"\d{5}"), ("broken", "(")])
            .is_err());
        assert!(registry.pattern("zip").is_none());

        registry.add_patterns([("zip", r"\d{5}")]).unwrap();
        assert!(registry.pattern("zip").unwrap().is_match("12345"));
    }

    #[test]
    fn test_snapshot_is_isolated() {
        let registry = RuleRegistry::new();
        let before = registry.snapshot();
        registry.register_rule("late", |_| false, "late");
        assert!(before.resolve("late").is_err());
        assert!(registry.snapshot().resolve("late").is_ok());
        assert_eq!(registry.names(), vec!["late".to_string()]);
    }

    #[test]
    fn test_required_message() {
        let registry = RuleRegistry::new();
        assert_eq!(registry.snapshot().required_message(), "This field is required.");
        registry.register_validator("required", RequiredValidator::with_message("Fill me in."));
        assert_eq!(registry.snapshot().required_message(), "Fill me in.");
    }

    #[test]
    fn test_global_is_shared() {
        let a = RuleRegistry::global();
        let b = RuleRegistry::global();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(a.contains("email"));
    }
}
