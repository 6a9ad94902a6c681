//! The host-facing engine.

use std::collections::HashMap;
use std::sync::Arc;

use oxide_dom::{Dom, ElementId};
use tracing::debug;

use crate::config::{Config, Trigger};
use crate::error::{Result, ValidateError};
use crate::events::{Dispatcher, Event, EventKind, Scope, SubscriptionId};
use crate::field::Verdict;
use crate::form::{FormInstance, FormState, SubmitEvent};
use crate::registry::RuleRegistry;
use crate::rule::ValidationRule;

/// Handle to a bound instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormHandle(ElementId);

impl FormHandle {
    /// Returns the bound element.
    pub fn id(self) -> ElementId {
        self.0
    }
}

impl From<FormHandle> for ElementId {
    fn from(handle: FormHandle) -> Self {
        handle.0
    }
}

/// Options for validity queries.
///
/// The default revalidates; [`Options::peek`] reads cached state only and
/// never has an observable effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Re-run rules instead of reading the cached verdict.
    pub revalidate: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self { revalidate: true }
    }
}

impl Options {
    /// Revalidating query.
    pub fn revalidate() -> Self {
        Self::default()
    }

    /// Cached-state query.
    pub fn peek() -> Self {
        Self { revalidate: false }
    }
}

/// Binds forms and fields, runs validation and intercepts submission.
///
/// Every operation borrows the document for its own duration only; the
/// engine keeps ids, never references into the tree.
///
/// ```
/// use oxide_dom::{Document, ElementBuilder};
/// use oxide_validate::{Config, Options, Validate};
///
/// let mut doc = Document::new();
/// let form = doc.create(ElementBuilder::form());
/// let name = doc.append(form, ElementBuilder::input().required()).unwrap();
///
/// let mut engine = Validate::new();
/// engine.bind(&doc, form, Config::default()).unwrap();
///
/// assert!(!engine.is_valid(&mut doc, name, Options::default()).unwrap());
/// doc.set_value(name, "Bob").unwrap();
/// assert!(!engine.submit(&mut doc, form).unwrap().is_default_prevented());
/// ```
pub struct Validate {
    registry: Arc<RuleRegistry>,
    instances: HashMap<ElementId, FormInstance>,
    owners: HashMap<ElementId, ElementId>,
    events: Dispatcher,
}

impl std::fmt::Debug for Validate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validate")
            .field("instances", &self.instances.len())
            .field("fields", &self.owners.len())
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

impl Default for Validate {
    fn default() -> Self {
        Self::new()
    }
}

impl Validate {
    /// Creates an engine backed by the process-wide registry.
    pub fn new() -> Self {
        Self::with_registry(RuleRegistry::global())
    }

    /// Creates an engine backed by `registry`.
    pub fn with_registry(registry: Arc<RuleRegistry>) -> Self {
        Self {
            registry,
            instances: HashMap::new(),
            owners: HashMap::new(),
            events: Dispatcher::new(),
        }
    }

    /// Returns the registry rules resolve against.
    pub fn registry(&self) -> &Arc<RuleRegistry> {
        &self.registry
    }

    /// Binds a form, container or lone control.
    ///
    /// Binding an element that already has an instance returns that
    /// instance unchanged, whatever `config` says. Fields already managed by
    /// another instance are left to it.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` if the element is not in the document and
    /// `InvalidConfiguration` if `config` is rejected; no instance is created
    /// in either case.
    pub fn bind(&mut self, dom: &dyn Dom, element: ElementId, config: Config) -> Result<FormHandle> {
        if !dom.contains(element) {
            return Err(ValidateError::MissingField(element));
        }
        if self.instances.contains_key(&element) {
            debug!(form = %element, "already bound, keeping existing instance");
            return Ok(FormHandle(element));
        }

        let extra = config.validate()?;
        let mut instance = FormInstance::new(element, config, extra);
        let owners = &self.owners;
        let ids = instance
            .candidates(dom)
            .into_iter()
            .filter(|id| !owners.contains_key(id))
            .collect();
        instance.refresh(dom, ids);
        for field in instance.fields() {
            self.owners.insert(field.id(), element);
        }

        debug!(form = %element, fields = instance.fields().len(), "bound");
        self.instances.insert(element, instance);
        self.events.emit(&Event::InstanceCreated { form: element });
        Ok(FormHandle(element))
    }

    /// Tears down an instance. Its fields become unbound.
    pub fn unbind(&mut self, form: impl Into<ElementId>) -> Result<()> {
        let form = form.into();
        self.instances
            .remove(&form)
            .ok_or(ValidateError::NotBound(form))?;
        self.owners.retain(|_, owner| *owner != form);
        debug!(%form, "unbound");
        Ok(())
    }

    /// Returns whether the element has an instance.
    pub fn is_bound(&self, element: impl Into<ElementId>) -> bool {
        self.instances.contains_key(&element.into())
    }

    /// Returns the instance bound to `form`.
    pub fn instance(&self, form: impl Into<ElementId>) -> Option<&FormInstance> {
        self.instances.get(&form.into())
    }

    /// Returns the instance that manages `field`.
    pub fn owner(&self, field: ElementId) -> Option<FormHandle> {
        self.owners.get(&field).copied().map(FormHandle)
    }

    /// Returns a form instance's lifecycle state.
    pub fn state(&self, form: impl Into<ElementId>) -> Result<FormState> {
        let form = form.into();
        self.instances
            .get(&form)
            .map(FormInstance::state)
            .ok_or(ValidateError::NotBound(form))
    }

    fn owner_of(&self, dom: &dyn Dom, field: ElementId) -> Result<ElementId> {
        if !dom.contains(field) {
            return Err(ValidateError::MissingField(field));
        }
        self.owners
            .get(&field)
            .copied()
            .ok_or(ValidateError::NotBound(field))
    }

    /// Returns a field's validity.
    ///
    /// Revalidating evaluates the field (its whole group for grouped fields)
    /// and emits one `FieldValidated` per evaluated field. Peeking returns
    /// the cached verdict; a field never evaluated peeks as invalid, a
    /// skipped field as valid.
    pub fn is_valid(&mut self, dom: &mut dyn Dom, field: ElementId, options: Options) -> Result<bool> {
        let form = self.owner_of(dom, field)?;
        let instance = self
            .instances
            .get_mut(&form)
            .ok_or(ValidateError::NotBound(field))?;
        if !options.revalidate {
            return Ok(instance.peek(dom, field));
        }
        release(&mut self.owners, instance.sync(dom));
        let rules = self.registry.snapshot();
        instance
            .validate_field(dom, field, &rules, &mut self.events)
            .map(|verdict| verdict.valid)
            .ok_or(ValidateError::NotBound(field))
    }

    /// Returns a field's cached verdict, with its message and validity flags.
    pub fn verdict(&self, field: ElementId) -> Result<Option<Verdict>> {
        let form = self
            .owners
            .get(&field)
            .ok_or(ValidateError::NotBound(field))?;
        Ok(self
            .instances
            .get(form)
            .and_then(|instance| instance.field(field))
            .and_then(|descriptor| descriptor.cached())
            .cloned())
    }

    /// Returns a form's validity, running a full pass unless peeking.
    pub fn all_valid(
        &mut self,
        dom: &mut dyn Dom,
        form: impl Into<ElementId>,
        options: Options,
    ) -> Result<bool> {
        let form = form.into();
        if !dom.contains(form) {
            return Err(ValidateError::MissingField(form));
        }
        let rules = self.registry.snapshot();
        let events = &mut self.events;
        let instance = self
            .instances
            .get_mut(&form)
            .ok_or(ValidateError::NotBound(form))?;
        if !options.revalidate {
            return Ok(instance.peek_all());
        }
        release(&mut self.owners, instance.sync(dom));
        Ok(instance.all_valid(dom, &rules, events))
    }

    /// Runs the submission policy for a form, as its submit handler would.
    ///
    /// The returned event reports whether native submission was prevented.
    pub fn submit(&mut self, dom: &mut dyn Dom, form: impl Into<ElementId>) -> Result<SubmitEvent> {
        let form = form.into();
        if !dom.contains(form) {
            return Err(ValidateError::MissingField(form));
        }
        let rules = self.registry.snapshot();
        let events = &mut self.events;
        let instance = self
            .instances
            .get_mut(&form)
            .ok_or(ValidateError::NotBound(form))?;
        release(&mut self.owners, instance.sync(dom));
        Ok(instance.submit(dom, &rules, events))
    }

    /// Reacts to a field interaction.
    ///
    /// Triggers enabled in the owning instance's configuration revalidate the
    /// field; others return its cached validity.
    pub fn handle(&mut self, dom: &mut dyn Dom, field: ElementId, trigger: Trigger) -> Result<bool> {
        let form = self.owner_of(dom, field)?;
        let enabled = self
            .instances
            .get(&form)
            .ok_or(ValidateError::NotBound(field))?
            .config()
            .triggers_on(trigger);
        let options = if enabled {
            Options::revalidate()
        } else {
            Options::peek()
        };
        self.is_valid(dom, field, options)
    }

    /// Re-scans a form: new controls become fields, removed ones are dropped,
    /// persisting fields keep their cached verdicts and attached rules.
    pub fn refresh(&mut self, dom: &dyn Dom, form: impl Into<ElementId>) -> Result<()> {
        let form = form.into();
        if !dom.contains(form) {
            return Err(ValidateError::MissingField(form));
        }
        let owners = &mut self.owners;
        let instance = self
            .instances
            .get_mut(&form)
            .ok_or(ValidateError::NotBound(form))?;

        let ids = instance
            .candidates(dom)
            .into_iter()
            .filter(|id| owners.get(id).map_or(true, |owner| *owner == form))
            .collect();
        release(owners, instance.refresh(dom, ids));
        for field in instance.fields() {
            owners.insert(field.id(), form);
        }
        debug!(%form, fields = instance.fields().len(), "refreshed");
        Ok(())
    }

    /// Attaches a rule to a managed field, evaluated after its declared
    /// rules.
    pub fn add_rule(&mut self, field: ElementId, rule: ValidationRule) -> Result<()> {
        let form = self
            .owners
            .get(&field)
            .copied()
            .ok_or(ValidateError::NotBound(field))?;
        let attached = self
            .instances
            .get_mut(&form)
            .is_some_and(|instance| instance.attach(field, rule));
        if attached {
            Ok(())
        } else {
            Err(ValidateError::NotBound(field))
        }
    }

    /// Subscribes to every event within `scope`.
    pub fn subscribe(&mut self, scope: Scope, handler: impl FnMut(&Event) + 'static) -> SubscriptionId {
        self.events.subscribe(scope, handler)
    }

    /// Subscribes to one kind of event within `scope`.
    pub fn on(
        &mut self,
        kind: EventKind,
        scope: Scope,
        handler: impl FnMut(&Event) + 'static,
    ) -> SubscriptionId {
        self.events.on(kind, scope, handler)
    }

    /// Cancels a subscription. Returns whether it existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }
}

/// Forgets the owners of fields an instance dropped.
fn release(owners: &mut HashMap<ElementId, ElementId>, removed: Vec<ElementId>) {
    for id in removed {
        owners.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxide_dom::{Document, ElementBuilder};

    fn engine() -> Validate {
        Validate::with_registry(Arc::new(RuleRegistry::with_builtins()))
    }

    #[test]
    fn test_bind_is_idempotent() {
        let mut doc = Document::new();
        let form = doc.create(ElementBuilder::form());
        doc.append(form, ElementBuilder::input()).unwrap();
        let mut validate = engine();

        let first = validate.bind(&doc, form, Config::default()).unwrap();
        let second = validate
            .bind(&doc, form, Config::new().submit(false))
            .unwrap();
        assert_eq!(first, second);
        assert!(validate.instance(form).unwrap().config().submit);
    }

    #[test]
    fn test_field_owned_once() {
        let mut doc = Document::new();
        let form = doc.create(ElementBuilder::form());
        let field = doc.append(form, ElementBuilder::input()).unwrap();
        let mut validate = engine();

        validate.bind(&doc, field, Config::default()).unwrap();
        validate.bind(&doc, form, Config::default()).unwrap();
        assert_eq!(validate.owner(field), Some(FormHandle(field)));
        assert!(validate.instance(form).unwrap().fields().is_empty());
    }

    #[test]
    fn test_unbind_releases_fields() {
        let mut doc = Document::new();
        let form = doc.create(ElementBuilder::form());
        let field = doc.append(form, ElementBuilder::input()).unwrap();
        let mut validate = engine();
        let handle = validate.bind(&doc, form, Config::default()).unwrap();

        validate.unbind(handle).unwrap();
        assert!(!validate.is_bound(form));
        assert!(matches!(
            validate.is_valid(&mut doc, field, Options::default()),
            Err(ValidateError::NotBound(id)) if id == field
        ));
        assert!(matches!(validate.unbind(form), Err(ValidateError::NotBound(_))));
    }

    #[test]
    fn test_removed_field_loses_owner_after_pass() {
        let mut doc = Document::new();
        let form = doc.create(ElementBuilder::form());
        let kept = doc.append(form, ElementBuilder::input()).unwrap();
        let gone = doc.append(form, ElementBuilder::input()).unwrap();
        let mut validate = engine();
        validate.bind(&doc, form, Config::default()).unwrap();

        doc.remove(gone).unwrap();
        validate.all_valid(&mut doc, form, Options::default()).unwrap();
        validate.refresh(&doc, form).unwrap();
        assert_eq!(validate.owner(gone), None);
        assert_eq!(validate.owner(kept), Some(FormHandle(form)));
    }

    #[test]
    fn test_add_rule_requires_managed_field() {
        let mut doc = Document::new();
        let stray = doc.create(ElementBuilder::input());
        let mut validate = engine();
        let rule = ValidationRule::from_predicate("even", |v| v.len() % 2 == 0, "Even, please.");
        assert!(matches!(
            validate.add_rule(stray, rule.clone()),
            Err(ValidateError::NotBound(_))
        ));

        validate.bind(&doc, stray, Config::default()).unwrap();
        validate.add_rule(stray, rule).unwrap();
        doc.set_value(stray, "abc").unwrap();
        assert!(!validate.is_valid(&mut doc, stray, Options::default()).unwrap());
        assert_eq!(
            validate.verdict(stray).unwrap().unwrap().message.as_deref(),
            Some("Even, please.")
        );
    }
}
