//! Validation events and their dispatch.
//!
//! Events are emitted synchronously, in the order validation produces them.
//! For a full pass the sequence is always `FormValidate`, then one
//! `FieldValidated` per evaluated field in evaluation order, then
//! `FormValidated`. Handlers receive fresh copies of engine state and cannot
//! reach back into it.

use std::fmt;

use oxide_dom::ElementId;
use serde::Serialize;

use crate::config::Config;
use crate::field::Validity;

/// Outcome of one field evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldResult {
    /// The instance the field belongs to.
    pub form: ElementId,
    /// The evaluated field.
    pub field: ElementId,
    /// Whether the field passed.
    pub valid: bool,
    /// The failure message, if any.
    pub message: Option<String>,
    /// Violated constraints.
    pub validity: Validity,
}

/// Outcome of one full-form pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormResult {
    /// The bound element.
    pub form: ElementId,
    /// Aggregate validity.
    pub valid: bool,
    /// Per-field results, in evaluation order.
    pub fields: Vec<FieldResult>,
}

/// A notification emitted by the engine.
#[derive(Debug, Clone)]
pub enum Event {
    /// An element was bound for the first time.
    InstanceCreated { form: ElementId },
    /// A field was evaluated (never emitted for peeks or skipped fields).
    FieldValidated(FieldResult),
    /// A full-form pass is starting; carries a copy of the configuration.
    FormValidate { form: ElementId, config: Config },
    /// A full-form pass finished.
    FormValidated(FormResult),
}

/// The kind of an [`Event`], for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    InstanceCreated,
    FieldValidated,
    FormValidate,
    FormValidated,
}

impl Event {
    /// Returns the event kind.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::InstanceCreated { .. } => EventKind::InstanceCreated,
            Self::FieldValidated(_) => EventKind::FieldValidated,
            Self::FormValidate { .. } => EventKind::FormValidate,
            Self::FormValidated(_) => EventKind::FormValidated,
        }
    }

    /// Returns the bound element the event belongs to.
    pub fn form(&self) -> ElementId {
        match self {
            Self::InstanceCreated { form } | Self::FormValidate { form, .. } => *form,
            Self::FieldValidated(result) => result.form,
            Self::FormValidated(result) => result.form,
        }
    }

    /// Returns the element the event is about.
    pub fn target(&self) -> ElementId {
        match self {
            Self::FieldValidated(result) => result.field,
            other => other.form(),
        }
    }
}

/// Which events a subscription receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Every event.
    All,
    /// Events targeting the element, plus field events bubbling up to it as
    /// their form.
    Element(ElementId),
}

impl Scope {
    fn admits(self, event: &Event) -> bool {
        match self {
            Self::All => true,
            Self::Element(id) => event.target() == id || event.form() == id,
        }
    }
}

/// Handle returned by a subscription, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn FnMut(&Event)>;

struct Subscription {
    id: SubscriptionId,
    scope: Scope,
    kind: Option<EventKind>,
    handler: Handler,
}

/// Holds subscriptions and delivers events to them in subscription order.
#[derive(Default)]
pub struct Dispatcher {
    next_id: u64,
    subscriptions: Vec<Subscription>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("subscriptions", &self.subscriptions.len())
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Creates a dispatcher with no subscriptions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to every event kind within `scope`.
    pub fn subscribe(&mut self, scope: Scope, handler: impl FnMut(&Event) + 'static) -> SubscriptionId {
        self.insert(scope, None, Box::new(handler))
    }

    /// Subscribes to one event kind within `scope`.
    pub fn on(
        &mut self,
        kind: EventKind,
        scope: Scope,
        handler: impl FnMut(&Event) + 'static,
    ) -> SubscriptionId {
        self.insert(scope, Some(kind), Box::new(handler))
    }

    fn insert(&mut self, scope: Scope, kind: Option<EventKind>, handler: Handler) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscriptions.push(Subscription {
            id,
            scope,
            kind,
            handler,
        });
        id
    }

    /// Removes a subscription. Returns whether it existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|sub| sub.id != id);
        self.subscriptions.len() != before
    }

    /// Returns the number of live subscriptions.
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Returns whether there are no subscriptions.
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Delivers an event to every matching subscription.
    pub fn emit(&mut self, event: &Event) {
        for sub in &mut self.subscriptions {
            if sub.kind.is_some_and(|kind| kind != event.kind()) {
                continue;
            }
            if sub.scope.admits(event) {
                (sub.handler)(event);
            }
        }
    }
}
