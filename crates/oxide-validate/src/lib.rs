//! # oxide-validate
//!
//! Declarative form validation with submit interception.
//!
//! This crate provides:
//! - A shared rule registry with a built-in pattern library
//! - Per-field evaluation driven by markup (`required`, `pattern`, rule classes)
//! - Grouped evaluation for radio buttons
//! - Form instances with cached validity and a submission policy
//! - Validation events for host code to observe
//!
//! ## Quick Start
//!
//! ```rust
//! use oxide_dom::{Document, Dom, ElementBuilder};
//! use oxide_validate::{Config, Options, Validate};
//!
//! let mut doc = Document::new();
//! let form = doc.create(ElementBuilder::form());
//! let name = doc.append(form, ElementBuilder::input().required()).unwrap();
//! let email = doc
//!     .append(form, ElementBuilder::input().class("h5-email"))
//!     .unwrap();
//!
//! let mut validate = Validate::new();
//! validate.bind(&doc, form, Config::default()).unwrap();
//!
//! // Blocked, and focus moves to the first problem field.
//! let submitted = validate.submit(&mut doc, form).unwrap();
//! assert!(submitted.is_default_prevented());
//! assert_eq!(doc.focused(), Some(name));
//!
//! doc.set_value(name, "Bob").unwrap();
//! doc.set_value(email, "not an email").unwrap();
//! assert!(!validate.all_valid(&mut doc, form, Options::default()).unwrap());
//!
//! doc.set_value(email, "bob@example.com").unwrap();
//! assert!(!validate.submit(&mut doc, form).unwrap().is_default_prevented());
//! ```
//!
//! ## Custom Rules
//!
//! ```rust
//! use std::sync::Arc;
//! use oxide_dom::{Document, ElementBuilder};
//! use oxide_validate::{Config, Options, RuleRegistry, Validate};
//!
//! let registry = Arc::new(RuleRegistry::with_builtins());
//! registry.register_rule("even", |value| value.len() % 2 == 0, "Use an even length.");
//!
//! let mut doc = Document::new();
//! let form = doc.create(ElementBuilder::form());
//! let code = doc
//!     .append(form, ElementBuilder::input().attr("data-rules", "even"))
//!     .unwrap();
//!
//! let mut validate = Validate::with_registry(registry);
//! validate.bind(&doc, form, Config::default()).unwrap();
//! doc.set_value(code, "abc").unwrap();
//! assert!(!validate.is_valid(&mut doc, code, Options::default()).unwrap());
//! assert_eq!(
//!     validate.verdict(code).unwrap().unwrap().message.as_deref(),
//!     Some("Use an even length.")
//! );
//! ```
//!
//! ## Events
//!
//! ```rust
//! use oxide_dom::{Document, ElementBuilder};
//! use oxide_validate::{Config, EventKind, Options, Scope, Validate};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let mut doc = Document::new();
//! let form = doc.create(ElementBuilder::form());
//! doc.append(form, ElementBuilder::input()).unwrap();
//!
//! let mut validate = Validate::new();
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let log = Rc::clone(&seen);
//! validate.subscribe(Scope::Element(form), move |event| log.borrow_mut().push(event.kind()));
//!
//! validate.bind(&doc, form, Config::default()).unwrap();
//! validate.all_valid(&mut doc, form, Options::default()).unwrap();
//! assert_eq!(
//!     *seen.borrow(),
//!     vec![
//!         EventKind::InstanceCreated,
//!         EventKind::FormValidate,
//!         EventKind::FieldValidated,
//!         EventKind::FormValidated,
//!     ]
//! );
//! ```

mod binder;
mod config;
mod error;
mod events;
mod field;
mod form;
mod group;
mod registry;
mod render;
mod rule;
pub mod validation;

pub use binder::{FormHandle, Options, Validate};
pub use config::{Config, Trigger};
pub use error::{Result, ValidateError};
pub use events::{Dispatcher, Event, EventKind, FieldResult, FormResult, Scope, SubscriptionId};
pub use field::{FieldDescriptor, Validity, Verdict};
pub use form::{FormInstance, FormState, SubmitEvent};
pub use group::{partition, reduce, Partition, Unit};
pub use registry::{RuleRegistry, RuleSet};
pub use render::{ClassRenderer, Mark, NoopRenderer, Renderer};
pub use rule::{Pattern, Rule, ValidationRule};
