#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use oxide_dom::{Document, ElementBuilder, ElementId};
use oxide_validate::{Event, EventKind, RuleRegistry, Scope, Validate};

/// An engine with its own registry, isolated from other tests.
pub fn engine() -> Validate {
    Validate::with_registry(Arc::new(RuleRegistry::with_builtins()))
}

/// Records every event delivered within `scope`.
pub fn record(validate: &mut Validate, scope: Scope) -> Rc<RefCell<Vec<Event>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    validate.subscribe(scope, move |event| log.borrow_mut().push(event.clone()));
    seen
}

pub fn kinds(events: &Rc<RefCell<Vec<Event>>>) -> Vec<EventKind> {
    events.borrow().iter().map(Event::kind).collect()
}

pub fn count(events: &Rc<RefCell<Vec<Event>>>, kind: EventKind) -> usize {
    events.borrow().iter().filter(|event| event.kind() == kind).count()
}

/// A sign-up form: first name (required), last name (required), email
/// (library rule), date (pattern attribute) and an optional comment.
pub struct Signup {
    pub doc: Document,
    pub form: ElementId,
    pub first_name: ElementId,
    pub last_name: ElementId,
    pub email: ElementId,
    pub birthday: ElementId,
    pub comment: ElementId,
}

impl Signup {
    pub fn new() -> Self {
        let mut doc = Document::new();
        let form = doc.create(ElementBuilder::form().id("signup"));
        let first_name = doc
            .append(form, ElementBuilder::input().id("FirstName").required())
            .unwrap();
        let last_name = doc
            .append(form, ElementBuilder::input().id("LastName").required())
            .unwrap();
        let email = doc
            .append(form, ElementBuilder::input().id("Email").class("h5-email"))
            .unwrap();
        let birthday = doc
            .append(
                form,
                ElementBuilder::input()
                    .id("Birthday")
                    .pattern(r"\d{2}/\d{2}/\d{4}"),
            )
            .unwrap();
        let comment = doc
            .append(form, ElementBuilder::textarea().id("Comment"))
            .unwrap();
        Self {
            doc,
            form,
            first_name,
            last_name,
            email,
            birthday,
            comment,
        }
    }

    /// Fills every constrained field with a valid value.
    pub fn fill(&mut self) {
        self.doc.set_value(self.first_name, "Ada").unwrap();
        self.doc.set_value(self.last_name, "Lovelace").unwrap();
        self.doc.set_value(self.email, "ada@example.com").unwrap();
        self.doc.set_value(self.birthday, "10/12/1815").unwrap();
    }
}

/// A form holding three required radios named `color`.
pub fn colors() -> (Document, ElementId, [ElementId; 3]) {
    let mut doc = Document::new();
    let form = doc.create(ElementBuilder::form());
    let red = doc
        .append(form, ElementBuilder::radio("color", "red").required())
        .unwrap();
    let green = doc
        .append(form, ElementBuilder::radio("color", "green").required())
        .unwrap();
    let blue = doc
        .append(form, ElementBuilder::radio("color", "blue").required())
        .unwrap();
    (doc, form, [red, green, blue])
}
