//! Tests for binding, events, refresh and rendering.

mod common;
use common::*;

use oxide_dom::{Document, Dom, ElementBuilder};
use oxide_validate::{
    Config, Event, EventKind, FormState, NoopRenderer, Options, Scope, Trigger, ValidateError,
};

#[test]
fn test_bind_emits_instance_created_once() {
    let signup = Signup::new();
    let mut validate = engine();
    let events = record(&mut validate, Scope::Element(signup.form));

    let first = validate
        .bind(&signup.doc, signup.form, Config::default())
        .unwrap();
    let again = validate
        .bind(&signup.doc, signup.form, Config::new().submit(false))
        .unwrap();

    assert_eq!(first, again);
    assert_eq!(kinds(&events), vec![EventKind::InstanceCreated]);
    assert_eq!(
        validate.state(signup.form).unwrap(),
        FormState::Unvalidated
    );
}

#[test]
fn test_invalid_configuration_creates_no_instance() {
    let signup = Signup::new();
    let mut validate = engine();
    let events = record(&mut validate, Scope::All);

    let err = validate
        .bind(
            &signup.doc,
            signup.form,
            Config::new().all_valid_selectors("form > input"),
        )
        .unwrap_err();
    assert!(matches!(err, ValidateError::InvalidConfiguration(_)));
    assert!(!validate.is_bound(signup.form));
    assert!(events.borrow().is_empty());

    let err = Config::from_json(r#"{ "validateOnSubmit": "sometimes" }"#).unwrap_err();
    assert!(matches!(err, ValidateError::InvalidConfiguration(_)));
}

#[test]
fn test_pass_events_are_ordered_and_carry_a_config_copy() {
    let mut signup = Signup::new();
    let mut validate = engine();
    validate
        .bind(&signup.doc, signup.form, Config::new().submit(false))
        .unwrap();
    let events = record(&mut validate, Scope::Element(signup.form));

    validate.submit(&mut signup.doc, signup.form).unwrap();
    assert_eq!(
        kinds(&events),
        vec![
            EventKind::FormValidate,
            EventKind::FieldValidated,
            EventKind::FieldValidated,
            EventKind::FieldValidated,
            EventKind::FieldValidated,
            EventKind::FieldValidated,
            EventKind::FormValidated,
        ]
    );

    let mut copy = match &events.borrow()[0] {
        Event::FormValidate { config, .. } => config.clone(),
        other => panic!("expected FormValidate, got {other:?}"),
    };
    assert!(!copy.submit);
    copy.submit = true;
    assert_ne!(
        copy.submit,
        validate.instance(signup.form).unwrap().config().submit
    );

    let targets: Vec<_> = events.borrow()[1..6].iter().map(Event::target).collect();
    assert_eq!(
        targets,
        vec![
            signup.first_name,
            signup.last_name,
            signup.email,
            signup.birthday,
            signup.comment
        ]
    );
    match events.borrow().last() {
        Some(Event::FormValidated(result)) => {
            assert!(!result.valid);
            assert_eq!(result.fields.len(), 5);
            assert!(!result.fields[0].valid);
            assert!(result.fields[4].valid);
        }
        other => panic!("expected FormValidated, got {other:?}"),
    }
    assert_eq!(
        validate.state(signup.form).unwrap(),
        FormState::Settled(false)
    );
}

#[test]
fn test_field_scope_sees_only_its_field() {
    let mut signup = Signup::new();
    let mut validate = engine();
    validate
        .bind(&signup.doc, signup.form, Config::default())
        .unwrap();
    let events = record(&mut validate, Scope::Element(signup.email));

    validate
        .all_valid(&mut signup.doc, signup.form, Options::default())
        .unwrap();
    assert_eq!(kinds(&events), vec![EventKind::FieldValidated]);
}

#[test]
fn test_unsubscribed_handler_stops_receiving() {
    let mut signup = Signup::new();
    let mut validate = engine();
    validate
        .bind(&signup.doc, signup.form, Config::default())
        .unwrap();
    let seen = std::rc::Rc::new(std::cell::RefCell::new(0));
    let counter = std::rc::Rc::clone(&seen);
    let id = validate.on(EventKind::FormValidated, Scope::All, move |_| {
        *counter.borrow_mut() += 1;
    });

    validate
        .all_valid(&mut signup.doc, signup.form, Options::default())
        .unwrap();
    assert!(validate.unsubscribe(id));
    validate
        .all_valid(&mut signup.doc, signup.form, Options::default())
        .unwrap();
    assert_eq!(*seen.borrow(), 1);
}

#[test]
fn test_removed_field_is_missing() {
    let mut signup = Signup::new();
    let mut validate = engine();
    validate
        .bind(&signup.doc, signup.form, Config::default())
        .unwrap();
    signup.doc.remove(signup.first_name).unwrap();

    assert!(matches!(
        validate.is_valid(&mut signup.doc, signup.first_name, Options::default()),
        Err(ValidateError::MissingField(id)) if id == signup.first_name
    ));
    let events = record(&mut validate, Scope::All);
    validate
        .all_valid(&mut signup.doc, signup.form, Options::default())
        .unwrap();
    assert_eq!(count(&events, EventKind::FieldValidated), 4);
    assert_eq!(validate.owner(signup.first_name), None);
    assert_eq!(
        validate.owner(signup.last_name).map(|handle| handle.id()),
        Some(signup.form)
    );

    let mut other = Document::new();
    let gone = other.create(ElementBuilder::form());
    other.remove(gone).unwrap();
    assert!(matches!(
        validate.bind(&other, gone, Config::default()),
        Err(ValidateError::MissingField(_))
    ));
}

#[test]
fn test_unbound_operations_fail() {
    let mut signup = Signup::new();
    let mut validate = engine();
    assert!(matches!(
        validate.is_valid(&mut signup.doc, signup.email, Options::default()),
        Err(ValidateError::NotBound(_))
    ));
    assert!(matches!(
        validate.submit(&mut signup.doc, signup.form),
        Err(ValidateError::NotBound(_))
    ));

    validate
        .bind(&signup.doc, signup.form, Config::default())
        .unwrap();
    validate.unbind(signup.form).unwrap();
    assert!(matches!(
        validate.all_valid(&mut signup.doc, signup.form, Options::default()),
        Err(ValidateError::NotBound(_))
    ));
    assert!(matches!(
        validate.state(signup.form),
        Err(ValidateError::NotBound(_))
    ));
}

#[test]
fn test_refresh_picks_up_dynamic_fields() {
    let mut signup = Signup::new();
    let mut validate = engine();
    validate
        .bind(&signup.doc, signup.form, Config::default())
        .unwrap();
    signup.fill();
    assert!(validate
        .all_valid(&mut signup.doc, signup.form, Options::default())
        .unwrap());

    let phone = signup
        .doc
        .append(
            signup.form,
            ElementBuilder::input().required().class("h5-phone"),
        )
        .unwrap();
    assert!(matches!(
        validate.is_valid(&mut signup.doc, phone, Options::default()),
        Err(ValidateError::NotBound(_))
    ));
    assert!(validate
        .all_valid(&mut signup.doc, signup.form, Options::default())
        .unwrap());

    validate.refresh(&signup.doc, signup.form).unwrap();
    assert!(validate.is_valid(&mut signup.doc, signup.email, Options::peek()).unwrap());
    assert!(!validate
        .all_valid(&mut signup.doc, signup.form, Options::default())
        .unwrap());

    signup.doc.set_value(phone, "555-0100").unwrap();
    assert!(validate
        .all_valid(&mut signup.doc, signup.form, Options::default())
        .unwrap());
}

#[test]
fn test_triggers_follow_configuration() {
    let mut signup = Signup::new();
    let mut validate = engine();
    validate
        .bind(&signup.doc, signup.form, Config::default())
        .unwrap();
    let events = record(&mut validate, Scope::All);
    signup.doc.set_value(signup.first_name, "Ada").unwrap();

    assert!(!validate
        .handle(&mut signup.doc, signup.first_name, Trigger::KeyUp)
        .unwrap());
    assert!(events.borrow().is_empty());

    assert!(validate
        .handle(&mut signup.doc, signup.first_name, Trigger::FocusOut)
        .unwrap());
    assert_eq!(count(&events, EventKind::FieldValidated), 1);

    let field = signup.doc.create(ElementBuilder::input().required());
    validate
        .bind(&signup.doc, field, Config::new().triggers(&[Trigger::KeyUp]))
        .unwrap();
    assert!(!validate
        .handle(&mut signup.doc, field, Trigger::KeyUp)
        .unwrap());
    assert_eq!(count(&events, EventKind::FieldValidated), 2);
    assert!(!validate
        .handle(&mut signup.doc, field, Trigger::Change)
        .unwrap());
    assert_eq!(count(&events, EventKind::FieldValidated), 2);
}

#[test]
fn test_class_renderer_shows_and_hides_messages() {
    let mut doc = Document::new();
    let form = doc.create(ElementBuilder::form());
    let name = doc
        .append(
            form,
            ElementBuilder::input()
                .id("FirstName")
                .required()
                .attr("data-h5-errorid", "invalid-FirstName"),
        )
        .unwrap();
    let message = doc
        .append(
            form,
            ElementBuilder::new("div")
                .id("invalid-FirstName")
                .attr("hidden", "hidden"),
        )
        .unwrap();
    let mut validate = engine();
    validate.bind(&doc, form, Config::default()).unwrap();

    validate.is_valid(&mut doc, name, Options::default()).unwrap();
    assert!(doc.element(name).unwrap().has_class("ui-state-error"));
    let shown = doc.element(message).unwrap();
    assert!(!shown.has_attr("hidden"));
    assert_eq!(shown.text(), "This field is required.");

    doc.set_value(name, "Ada").unwrap();
    validate.is_valid(&mut doc, name, Options::default()).unwrap();
    let el = doc.element(name).unwrap();
    assert!(el.has_class("ui-state-valid"));
    assert!(!el.has_class("ui-state-error"));
    assert!(doc.element(message).unwrap().has_attr("hidden"));

    doc.set_disabled(name, true).unwrap();
    validate.all_valid(&mut doc, form, Options::default()).unwrap();
    assert!(doc.element(name).unwrap().classes().is_empty());
}

#[test]
fn test_custom_classes_and_renderer() {
    let mut signup = Signup::new();
    let mut validate = engine();
    let mut config = Config::new();
    config.error_class = "is-invalid".to_string();
    validate.bind(&signup.doc, signup.form, config).unwrap();
    validate
        .all_valid(&mut signup.doc, signup.form, Options::default())
        .unwrap();
    assert!(signup
        .doc
        .element(signup.first_name)
        .unwrap()
        .has_class("is-invalid"));

    let field = signup.doc.create(ElementBuilder::input().required());
    validate
        .bind(&signup.doc, field, Config::new().renderer(NoopRenderer))
        .unwrap();
    assert!(!validate
        .is_valid(&mut signup.doc, field, Options::default())
        .unwrap());
    assert!(signup.doc.element(field).unwrap().classes().is_empty());
}

#[test]
fn test_all_valid_selectors_pull_in_custom_elements() {
    let mut doc = Document::new();
    let form = doc.create(ElementBuilder::form());
    let editor = doc
        .append(
            form,
            ElementBuilder::new("div").class("rich-text").required(),
        )
        .unwrap();
    let size = doc.append(form, ElementBuilder::select().required()).unwrap();
    doc.append(size, ElementBuilder::option("", "Pick a size")).unwrap();
    doc.append(size, ElementBuilder::option("m", "Medium")).unwrap();

    let mut plain = engine();
    plain.bind(&doc, form, Config::default()).unwrap();
    assert_eq!(plain.instance(form).unwrap().fields().len(), 1);

    let mut validate = engine();
    validate
        .bind(&doc, form, Config::new().all_valid_selectors(".rich-text"))
        .unwrap();
    assert_eq!(validate.owner(editor).map(|handle| handle.id()), Some(form));
    assert!(!validate.all_valid(&mut doc, form, Options::default()).unwrap());

    doc.set_value(editor, "<p>Hello</p>").unwrap();
    assert!(!validate.all_valid(&mut doc, form, Options::default()).unwrap());
    doc.select_option(size, 1).unwrap();
    assert!(validate.all_valid(&mut doc, form, Options::default()).unwrap());
}
