//! Field descriptors and single-field rule evaluation.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::str::FromStr;

use oxide_dom::{Element, ElementId, InputType};
use serde::Serialize;
use tracing::{trace, warn};

use crate::config::Config;
use crate::registry::RuleSet;
use crate::rule::{Pattern, Rule, ValidationRule};
use crate::validation::{LengthValidator, RangeValidator, PATTERN_MESSAGE};

/// Which constraints a failed verdict violated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Validity {
    /// A required value is missing.
    pub value_missing: bool,
    /// The `pattern` attribute did not match.
    pub pattern_mismatch: bool,
    /// A registry rule rejected the value.
    pub rule_mismatch: bool,
    /// A field-attached rule rejected the value.
    pub custom_error: bool,
    /// A rule panicked while evaluating.
    pub fault: bool,
}

impl Validity {
    /// Returns whether no constraint is violated.
    pub fn valid(&self) -> bool {
        !(self.value_missing
            || self.pattern_mismatch
            || self.rule_mismatch
            || self.custom_error
            || self.fault)
    }
}

/// The outcome of one evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    /// Whether the field passed.
    pub valid: bool,
    /// The failure message, if any.
    pub message: Option<String>,
    /// Violated constraints.
    pub validity: Validity,
}

impl Verdict {
    /// A passing verdict.
    pub fn pass() -> Self {
        Self {
            valid: true,
            message: None,
            validity: Validity::default(),
        }
    }

    /// A failing verdict.
    pub fn fail(message: impl Into<String>, validity: Validity) -> Self {
        Self {
            valid: false,
            message: Some(message.into()),
            validity,
        }
    }
}

/// How the `Required` rule is satisfied for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Requirement {
    /// The field's own value decides.
    Own,
    /// The field belongs to a group; the group decides.
    Group { required: bool, satisfied: bool },
}

/// One validatable control as seen by a bound instance.
///
/// Declared rules are snapshotted from markup when the instance binds (or
/// refreshes). Skip state is re-read from the live element before every
/// evaluation.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    id: ElementId,
    rules: Vec<Rule>,
    attached: Vec<ValidationRule>,
    group: Option<String>,
    skip: bool,
    title: Option<String>,
    cached: Option<Verdict>,
}

impl FieldDescriptor {
    /// Builds a descriptor from an element's attributes.
    pub fn scan(el: &Element, config: &Config) -> Self {
        let mut field = Self {
            id: el.id(),
            rules: Vec::new(),
            attached: Vec::new(),
            group: None,
            skip: is_skipped(el, config),
            title: el.attr("title").map(str::to_string),
            cached: None,
        };

        if el.has_attr("required") {
            field.push(Rule::Required);
        }

        if let Some(source) = el.attr("pattern") {
            match Pattern::new("pattern", source) {
                Ok(pattern) => field.push(Rule::Pattern(pattern)),
                Err(err) => warn!(field = %el.id(), %err, "ignoring pattern attribute"),
            }
        }

        match el.input_type() {
            Some(InputType::Email) => field.push_named("email"),
            Some(InputType::Url) => field.push_named("url"),
            _ => {}
        }
        for class in el.classes() {
            if let Some(name) = class.strip_prefix(config.class_prefix.as_str()) {
                if !name.is_empty() {
                    field.push_named(name);
                }
            }
        }
        if let Some(names) = el.attr("data-rules") {
            for name in names.split_whitespace() {
                field.push_named(name);
            }
        }

        field.scan_constraints(el);

        if el.is_radio() {
            field.group = el.name().map(str::to_string);
        }
        field
    }

    fn scan_constraints(&mut self, el: &Element) {
        let (min, max) = (constraint(el, "minlength"), constraint(el, "maxlength"));
        if min.is_some() || max.is_some() {
            self.push(Rule::Custom(ValidationRule::new(
                "length",
                LengthValidator::new(min, max),
            )));
        }
        let (min, max) = (constraint(el, "min"), constraint(el, "max"));
        if min.is_some() || max.is_some() {
            self.push(Rule::Custom(ValidationRule::new(
                "range",
                RangeValidator::new(min, max),
            )));
        }
    }

    fn push_named(&mut self, name: &str) {
        if name == "required" {
            if !self.is_required() {
                self.push(Rule::Required);
            }
            return;
        }
        let duplicate = self
            .rules
            .iter()
            .any(|rule| matches!(rule, Rule::Named(existing) if existing == name));
        if !duplicate {
            self.push(Rule::Named(name.to_string()));
        }
    }

    /// Inserts a rule after every rule of equal or lower precedence.
    fn push(&mut self, rule: Rule) {
        let at = self
            .rules
            .iter()
            .position(|existing| existing.precedence() > rule.precedence())
            .unwrap_or(self.rules.len());
        self.rules.insert(at, rule);
    }

    /// Attaches a host rule, evaluated after every declared rule.
    pub fn attach(&mut self, rule: ValidationRule) {
        self.attached.push(rule);
    }

    /// Returns the element id.
    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Returns all rules in evaluation order.
    pub fn rules(&self) -> Vec<Rule> {
        self.rules
            .iter()
            .cloned()
            .chain(self.attached.iter().cloned().map(Rule::Custom))
            .collect()
    }

    /// Returns whether the field declares `required`.
    pub fn is_required(&self) -> bool {
        self.rules.iter().any(|rule| matches!(rule, Rule::Required))
    }

    /// Returns the group key, for radio-style fields.
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Returns whether the field is excluded from validation.
    pub fn is_skipped(&self) -> bool {
        self.skip
    }

    /// Returns the cached verdict; `None` until first evaluated.
    pub fn cached(&self) -> Option<&Verdict> {
        self.cached.as_ref()
    }

    /// Returns the cached validity. Never-evaluated fields report invalid.
    pub fn peek(&self) -> bool {
        if self.skip {
            return true;
        }
        self.cached.as_ref().is_some_and(|verdict| verdict.valid)
    }

    pub(crate) fn refresh_skip(&mut self, el: &Element, config: &Config) {
        self.skip = is_skipped(el, config);
    }

    pub(crate) fn commit(&mut self, verdict: Verdict) {
        trace!(field = %self.id, valid = verdict.valid, "verdict");
        self.cached = Some(verdict);
    }

    /// Carries state that outlives a rescan.
    pub(crate) fn inherit(&mut self, previous: Self) {
        self.attached = previous.attached;
        self.cached = previous.cached;
    }

    /// Runs the rules against `value`, fail-fast.
    ///
    /// Empty values only face the `Required` rule; every other rule
    /// constrains non-empty values.
    pub(crate) fn check(&self, value: &str, requirement: Requirement, rules: &RuleSet) -> Verdict {
        if self.skip {
            return Verdict::pass();
        }

        let empty = value.is_empty();
        let missing = match requirement {
            Requirement::Own => self.is_required() && empty,
            Requirement::Group {
                required,
                satisfied,
            } => required && !satisfied,
        };
        if missing {
            let validity = Validity {
                value_missing: true,
                ..Validity::default()
            };
            return self.fail(rules.required_message(), validity);
        }
        if empty {
            return Verdict::pass();
        }

        for rule in self.rules() {
            let outcome = match &rule {
                Rule::Required => continue,
                Rule::Pattern(pattern) => {
                    if pattern.is_match(value) {
                        continue;
                    }
                    let validity = Validity {
                        pattern_mismatch: true,
                        ..Validity::default()
                    };
                    return self.fail(PATTERN_MESSAGE, validity);
                }
                Rule::Named(name) => match rules.resolve(name) {
                    Ok(resolved) => guarded(&resolved, value).map(|failure| (failure, false)),
                    Err(err) => {
                        warn!(field = %self.id, %err, "rule contributes nothing");
                        continue;
                    }
                },
                Rule::Custom(custom) => guarded(custom, value).map(|failure| (failure, true)),
            };
            if let Some((failure, custom)) = outcome {
                let validity = match failure {
                    Failure::Rejected(_) => Validity {
                        rule_mismatch: !custom,
                        custom_error: custom,
                        ..Validity::default()
                    },
                    Failure::Fault(_) => Validity {
                        fault: true,
                        ..Validity::default()
                    },
                };
                return match failure {
                    Failure::Rejected(message) => self.fail(&message, validity),
                    Failure::Fault(diagnostic) => Verdict::fail(diagnostic, validity),
                };
            }
        }
        Verdict::pass()
    }

    /// A failing verdict; the field's `title` overrides rule messages.
    fn fail(&self, message: &str, validity: Validity) -> Verdict {
        Verdict::fail(self.title.as_deref().unwrap_or(message), validity)
    }
}

enum Failure {
    Rejected(String),
    Fault(String),
}

/// Runs one rule, turning a panic into a diagnostic.
fn guarded(rule: &ValidationRule, value: &str) -> Option<Failure> {
    match catch_unwind(AssertUnwindSafe(|| rule.check(value))) {
        Ok(Ok(())) => None,
        Ok(Err(message)) => Some(Failure::Rejected(message)),
        Err(_) => {
            warn!(rule = rule.name(), "rule panicked during evaluation");
            Some(Failure::Fault(format!(
                "Validation rule `{}` failed unexpectedly.",
                rule.name()
            )))
        }
    }
}

/// Parses a numeric constraint attribute; unparseable values are ignored.
fn constraint<T: FromStr>(el: &Element, name: &str) -> Option<T> {
    let raw = el.attr(name)?;
    raw.trim()
        .parse()
        .map_err(|_| warn!(field = %el.id(), attr = name, raw, "ignoring constraint"))
        .ok()
}

/// Returns whether the element is currently excluded from validation.
pub(crate) fn is_skipped(el: &Element, config: &Config) -> bool {
    el.is_disabled() || el.has_class(&config.novalidate_class)
}
