//! # oxide-dom
//!
//! The DOM binding layer used by `oxide-validate`.
//!
//! This crate provides:
//! - An element model with form-control semantics (inputs, selects, radios)
//! - The object-safe [`Dom`] trait and an arena-backed [`Document`]
//! - Input focus tracking
//! - A CSS selector subset for picking controls out of a form
//!
//! ## Quick Start
//!
//! ```rust
//! use oxide_dom::{Document, Dom, ElementBuilder};
//!
//! let mut doc = Document::new();
//! let form = doc.create(ElementBuilder::form().id("signup"));
//! let name = doc.append(form, ElementBuilder::input().id("name").required()).unwrap();
//! let terms = doc.append(form, ElementBuilder::checkbox("terms")).unwrap();
//!
//! doc.set_value(name, "Bob").unwrap();
//! assert_eq!(doc.control_value(name).as_deref(), Some("Bob"));
//! assert_eq!(doc.control_value(terms).as_deref(), Some(""));
//!
//! assert!(doc.focus(name));
//! assert_eq!(doc.focused(), Some(name));
//! ```

mod document;
mod element;
mod error;
mod selector;

pub use document::{Document, Dom};
pub use element::{Element, ElementBuilder, ElementId, InputType, Tag};
pub use error::{DomError, Result};
pub use selector::{Selector, SelectorList};
