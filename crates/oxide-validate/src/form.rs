//! Bound instances: field ownership, validation passes and submission.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use oxide_dom::{Dom, ElementId, SelectorList};
use tracing::debug;

use crate::config::Config;
use crate::events::{Dispatcher, Event, FieldResult, FormResult};
use crate::field::{is_skipped, FieldDescriptor, Requirement, Verdict};
use crate::group::{partition, reduce, Unit};
use crate::registry::RuleSet;
use crate::render::{Mark, Renderer};
use crate::rule::ValidationRule;

/// Lifecycle of a bound instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    /// No full pass has run yet.
    Unvalidated,
    /// A full pass is in progress.
    Validating,
    /// The last full pass finished with the given validity.
    Settled(bool),
}

/// The outcome of a submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitEvent {
    form: ElementId,
    default_prevented: bool,
    focused: Option<ElementId>,
    validated: bool,
}

impl SubmitEvent {
    /// Returns the submitted element.
    pub fn form(&self) -> ElementId {
        self.form
    }

    /// Returns whether native submission was blocked.
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Returns the field that received focus, if focus moved.
    pub fn focused(&self) -> Option<ElementId> {
        self.focused
    }

    /// Returns whether the submission ran a validation pass.
    pub fn validated(&self) -> bool {
        self.validated
    }
}

/// One bound element and the fields it manages.
///
/// Fields are kept in document order. A field belongs to at most one
/// instance; the engine enforces this when candidates are collected.
pub struct FormInstance {
    root: ElementId,
    config: Config,
    extra: SelectorList,
    renderer: Arc<dyn Renderer>,
    fields: Vec<FieldDescriptor>,
    state: FormState,
}

impl fmt::Debug for FormInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormInstance")
            .field("root", &self.root)
            .field("config", &self.config)
            .field("fields", &self.fields)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl FormInstance {
    /// Creates an instance with no fields. `extra` is the parsed
    /// `allValidSelectors` of `config`.
    pub(crate) fn new(root: ElementId, config: Config, extra: SelectorList) -> Self {
        let renderer = config.resolved_renderer();
        Self {
            root,
            config,
            extra,
            renderer,
            fields: Vec::new(),
            state: FormState::Unvalidated,
        }
    }

    /// Returns the bound element.
    pub fn root(&self) -> ElementId {
        self.root
    }

    /// Returns the instance configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the lifecycle state.
    pub fn state(&self) -> FormState {
        self.state
    }

    /// Returns the managed fields in document order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Returns the descriptor of a managed field.
    pub fn field(&self, id: ElementId) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.id() == id)
    }

    fn index_of(&self, id: ElementId) -> Option<usize> {
        self.fields.iter().position(|field| field.id() == id)
    }

    /// Collects candidate fields in document order.
    ///
    /// A bound control is its own sole candidate. Otherwise every non-button
    /// control below the root qualifies, plus anything the extra selectors
    /// match.
    pub(crate) fn candidates(&self, dom: &dyn Dom) -> Vec<ElementId> {
        let Some(root) = dom.element(self.root) else {
            return Vec::new();
        };
        if root.is_form_control() {
            return if root.is_button() {
                Vec::new()
            } else {
                vec![self.root]
            };
        }
        dom.descendants(self.root)
            .into_iter()
            .filter(|id| {
                dom.element(*id).is_some_and(|el| {
                    (el.is_form_control() && !el.is_button()) || self.extra.matches(el)
                })
            })
            .collect()
    }

    /// Rebuilds descriptors for `ids`, keeping cached verdicts and attached
    /// rules of fields that persist. Returns the ids no longer managed.
    pub(crate) fn refresh(&mut self, dom: &dyn Dom, ids: Vec<ElementId>) -> Vec<ElementId> {
        let mut previous: HashMap<ElementId, FieldDescriptor> = self
            .fields
            .drain(..)
            .map(|field| (field.id(), field))
            .collect();
        let config = &self.config;
        self.fields = ids
            .into_iter()
            .filter_map(|id| dom.element(id))
            .map(|el| {
                let mut field = FieldDescriptor::scan(el, config);
                if let Some(old) = previous.remove(&el.id()) {
                    field.inherit(old);
                }
                field
            })
            .collect();
        previous.into_keys().collect()
    }

    /// Re-reads skip state and drops fields whose element left the document.
    /// Returns the dropped ids.
    pub(crate) fn sync(&mut self, dom: &dyn Dom) -> Vec<ElementId> {
        let mut removed = Vec::new();
        let config = &self.config;
        self.fields.retain_mut(|field| match dom.element(field.id()) {
            Some(el) => {
                field.refresh_skip(el, config);
                true
            }
            None => {
                removed.push(field.id());
                false
            }
        });
        removed
    }

    /// Attaches a host rule to a managed field.
    pub(crate) fn attach(&mut self, id: ElementId, rule: ValidationRule) -> bool {
        match self.fields.iter_mut().find(|field| field.id() == id) {
            Some(field) => {
                field.attach(rule);
                true
            }
            None => false,
        }
    }

    /// Returns a field's cached validity without evaluating anything.
    pub(crate) fn peek(&self, dom: &dyn Dom, id: ElementId) -> bool {
        if dom.element(id).is_some_and(|el| is_skipped(el, &self.config)) {
            return true;
        }
        self.field(id)
            .and_then(FieldDescriptor::cached)
            .is_some_and(|verdict| verdict.valid)
    }

    /// Returns the cached form validity. Never-validated forms are invalid.
    pub(crate) fn peek_all(&self) -> bool {
        self.state == FormState::Settled(true)
    }

    /// Evaluates one field, or its whole group, and returns its verdict.
    ///
    /// Skipped fields pass without evaluation and emit nothing.
    pub(crate) fn validate_field(
        &mut self,
        dom: &mut dyn Dom,
        id: ElementId,
        rules: &RuleSet,
        events: &mut Dispatcher,
    ) -> Option<Verdict> {
        self.sync(dom);
        let index = self.index_of(id)?;
        if self.fields[index].is_skipped() {
            self.renderer.unmark(dom, id, &self.config);
            return Some(Verdict::pass());
        }

        let unit = partition(&self.fields).unit_of(index).cloned()?;
        self.evaluate_unit(dom, &unit, rules, events);
        self.fields[index].cached().cloned()
    }

    /// Runs a full pass over every non-skipped field and group.
    pub(crate) fn all_valid(
        &mut self,
        dom: &mut dyn Dom,
        rules: &RuleSet,
        events: &mut Dispatcher,
    ) -> bool {
        self.sync(dom);
        events.emit(&Event::FormValidate {
            form: self.root,
            config: self.config.clone(),
        });
        self.state = FormState::Validating;

        for field in self.fields.iter().filter(|field| field.is_skipped()) {
            self.renderer.unmark(dom, field.id(), &self.config);
        }

        let mut results = Vec::with_capacity(self.fields.len());
        for unit in partition(&self.fields).units() {
            results.extend(self.evaluate_unit(dom, unit, rules, events));
        }

        let valid = results.iter().all(|result| result.valid);
        self.state = FormState::Settled(valid);
        debug!(form = %self.root, valid, fields = results.len(), "validation pass complete");
        events.emit(&Event::FormValidated(FormResult {
            form: self.root,
            valid,
            fields: results,
        }));
        valid
    }

    fn evaluate_unit(
        &mut self,
        dom: &mut dyn Dom,
        unit: &Unit,
        rules: &RuleSet,
        events: &mut Dispatcher,
    ) -> Vec<FieldResult> {
        let (members, verdict) = match unit {
            Unit::Single(index) => {
                let field = &self.fields[*index];
                let value = dom.control_value(field.id()).unwrap_or_default();
                (vec![*index], field.check(&value, Requirement::Own, rules))
            }
            Unit::Group { key, members } => {
                let values: Vec<String> = members
                    .iter()
                    .map(|index| dom.control_value(self.fields[*index].id()).unwrap_or_default())
                    .collect();
                let requirement = Requirement::Group {
                    required: members.iter().any(|index| self.fields[*index].is_required()),
                    satisfied: values.iter().any(|value| !value.is_empty()),
                };
                let verdict = reduce(
                    members
                        .iter()
                        .zip(&values)
                        .map(|(index, value)| self.fields[*index].check(value, requirement, rules)),
                );
                debug!(form = %self.root, group = %key, valid = verdict.valid, "group evaluated");
                (members.clone(), verdict)
            }
        };
        members
            .into_iter()
            .map(|index| self.settle(dom, index, verdict.clone(), events))
            .collect()
    }

    /// Caches a verdict on a field, renders it and announces it.
    fn settle(
        &mut self,
        dom: &mut dyn Dom,
        index: usize,
        verdict: Verdict,
        events: &mut Dispatcher,
    ) -> FieldResult {
        let field = &mut self.fields[index];
        field.commit(verdict.clone());
        let id = field.id();

        let mark = Mark {
            field: id,
            form: self.root,
            message: verdict.message.as_deref(),
            config: &self.config,
        };
        if verdict.valid {
            self.renderer.mark_valid(dom, &mark);
        } else {
            self.renderer.mark_invalid(dom, &mark);
        }

        let result = FieldResult {
            form: self.root,
            field: id,
            valid: verdict.valid,
            message: verdict.message,
            validity: verdict.validity,
        };
        events.emit(&Event::FieldValidated(result.clone()));
        result
    }

    /// Applies the submission policy.
    ///
    /// With `validate_on_submit` off, the cached result of the last full
    /// pass decides; a form never validated blocks.
    pub(crate) fn submit(
        &mut self,
        dom: &mut dyn Dom,
        rules: &RuleSet,
        events: &mut Dispatcher,
    ) -> SubmitEvent {
        let validated = self.config.validate_on_submit;
        let valid = if validated {
            self.all_valid(dom, rules, events)
        } else {
            self.sync(dom);
            self.peek_all()
        };

        let mut focused = None;
        if !valid && self.config.focus_first_invalid_element_on_submit {
            focused = self
                .fields
                .iter()
                .filter(|field| !field.is_skipped())
                .filter(|field| field.cached().is_some_and(|verdict| !verdict.valid))
                .map(FieldDescriptor::id)
                .find(|id| dom.focus(*id));
        }

        let default_prevented = !valid || !self.config.submit;
        debug!(
            form = %self.root,
            valid,
            validated,
            prevented = default_prevented,
            "submit intercepted"
        );
        SubmitEvent {
            form: self.root,
            default_prevented,
            focused,
            validated,
        }
    }
}
