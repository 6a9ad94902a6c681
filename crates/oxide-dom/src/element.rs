//! Element model.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identity of an element inside a [`Document`](crate::Document).
///
/// Identities are never reused, so a removed element's id stays dangling
/// instead of silently pointing at a newer element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(u64);

impl ElementId {
    /// Creates an id from its raw value.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Element tag names the layer gives meaning to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    Form,
    Input,
    Select,
    Option,
    Textarea,
    Button,
    Other(String),
}

impl Tag {
    /// Parses a tag name (case-insensitive).
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "form" => Self::Form,
            "input" => Self::Input,
            "select" => Self::Select,
            "option" => Self::Option,
            "textarea" => Self::Textarea,
            "button" => Self::Button,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the lowercase tag name.
    pub fn name(&self) -> &str {
        match self {
            Self::Form => "form",
            Self::Input => "input",
            Self::Select => "select",
            Self::Option => "option",
            Self::Textarea => "textarea",
            Self::Button => "button",
            Self::Other(name) => name,
        }
    }
}

/// The `type` of an `<input>` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    Text,
    Search,
    Tel,
    Url,
    Email,
    Password,
    Date,
    Number,
    Range,
    Checkbox,
    Radio,
    File,
    Hidden,
    Submit,
    Reset,
    Button,
    Image,
}

impl InputType {
    /// Parses an input type; unknown types fall back to `Text` like browsers do.
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "search" => Self::Search,
            "tel" => Self::Tel,
            "url" => Self::Url,
            "email" => Self::Email,
            "password" => Self::Password,
            "date" => Self::Date,
            "number" => Self::Number,
            "range" => Self::Range,
            "checkbox" => Self::Checkbox,
            "radio" => Self::Radio,
            "file" => Self::File,
            "hidden" => Self::Hidden,
            "submit" => Self::Submit,
            "reset" => Self::Reset,
            "button" => Self::Button,
            "image" => Self::Image,
            _ => Self::Text,
        }
    }

    /// Returns whether the input is a push button of some kind.
    pub fn is_button(self) -> bool {
        matches!(self, Self::Submit | Self::Reset | Self::Button | Self::Image)
    }

    /// Returns whether the input's value depends on its checked state.
    pub fn is_checkable(self) -> bool {
        matches!(self, Self::Checkbox | Self::Radio)
    }
}

/// A single node in the document.
#[derive(Debug, Clone)]
pub struct Element {
    pub(crate) id: ElementId,
    pub(crate) tag: Tag,
    pub(crate) attributes: BTreeMap<String, String>,
    pub(crate) classes: Vec<String>,
    pub(crate) value: String,
    pub(crate) checked: bool,
    pub(crate) selected: bool,
    pub(crate) text: String,
    pub(crate) parent: Option<ElementId>,
    pub(crate) children: Vec<ElementId>,
}

impl Element {
    /// Returns the element's identity.
    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Returns the element's tag.
    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    /// Returns the parent element, if attached.
    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    /// Returns the children in document order.
    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    /// Returns an attribute value.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Returns whether an attribute is present.
    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Sets an attribute.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Removes an attribute, returning its previous value.
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        self.attributes.remove(name)
    }

    /// Returns the `id` attribute.
    pub fn html_id(&self) -> Option<&str> {
        self.attr("id")
    }

    /// Returns the `name` attribute.
    pub fn name(&self) -> Option<&str> {
        self.attr("name")
    }

    /// Returns the class list.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Returns whether the class list contains `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Adds a class if not already present.
    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    /// Removes a class if present.
    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    /// Returns the input type for `<input>` elements.
    pub fn input_type(&self) -> Option<InputType> {
        match self.tag {
            Tag::Input => Some(self.attr("type").map_or(InputType::Text, InputType::parse)),
            _ => None,
        }
    }

    /// Returns whether the element carries the `disabled` attribute.
    pub fn is_disabled(&self) -> bool {
        self.has_attr("disabled")
    }

    /// Returns whether the element is a checkbox or radio button.
    pub fn is_checkable(&self) -> bool {
        self.input_type().is_some_and(InputType::is_checkable)
    }

    /// Returns whether the element is a radio button.
    pub fn is_radio(&self) -> bool {
        self.input_type() == Some(InputType::Radio)
    }

    /// Returns whether the element is any kind of button.
    pub fn is_button(&self) -> bool {
        match self.tag {
            Tag::Button => true,
            Tag::Input => self.input_type().is_some_and(InputType::is_button),
            _ => false,
        }
    }

    /// Returns whether the element is a form control (`input`, `select`,
    /// `textarea` or `button`).
    pub fn is_form_control(&self) -> bool {
        matches!(
            self.tag,
            Tag::Input | Tag::Select | Tag::Textarea | Tag::Button
        )
    }

    /// Returns the checked state.
    pub fn checked(&self) -> bool {
        self.checked
    }

    /// Sets the checked state.
    pub fn set_checked(&mut self, checked: bool) {
        self.checked = checked;
    }

    /// Returns the selected state of an `<option>`.
    pub fn selected(&self) -> bool {
        self.selected
    }

    /// Returns the raw value, ignoring control semantics.
    ///
    /// Use [`Dom::control_value`](crate::Dom::control_value) for the value a
    /// form submission would carry.
    pub fn raw_value(&self) -> &str {
        &self.value
    }

    /// Sets the raw value.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Returns the text content.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Sets the text content.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}

/// Builder for elements before they are inserted into a document.
#[derive(Debug, Clone)]
pub struct ElementBuilder {
    tag: Tag,
    attributes: BTreeMap<String, String>,
    classes: Vec<String>,
    value: String,
    checked: bool,
    selected: bool,
    text: String,
}

impl ElementBuilder {
    /// Creates a builder for the given tag name.
    pub fn new(tag: &str) -> Self {
        Self {
            tag: Tag::parse(tag),
            attributes: BTreeMap::new(),
            classes: Vec::new(),
            value: String::new(),
            checked: false,
            selected: false,
            text: String::new(),
        }
    }

    /// Creates a `<form>` builder.
    pub fn form() -> Self {
        Self::new("form")
    }

    /// Creates an `<input>` builder (type text).
    pub fn input() -> Self {
        Self::new("input")
    }

    /// Creates an `<input type="radio">` builder.
    pub fn radio(name: &str, value: &str) -> Self {
        Self::input()
            .attr("type", "radio")
            .attr("name", name)
            .attr("value", value)
    }

    /// Creates an `<input type="checkbox">` builder.
    pub fn checkbox(name: &str) -> Self {
        Self::input().attr("type", "checkbox").attr("name", name)
    }

    /// Creates a `<select>` builder.
    pub fn select() -> Self {
        Self::new("select")
    }

    /// Creates an `<option>` builder.
    pub fn option(value: &str, text: &str) -> Self {
        let mut builder = Self::new("option").attr("value", value);
        builder.text = text.to_string();
        builder
    }

    /// Creates a `<textarea>` builder.
    pub fn textarea() -> Self {
        Self::new("textarea")
    }

    /// Creates a `<button>` builder.
    pub fn button() -> Self {
        Self::new("button")
    }

    /// Sets an attribute. The `class` attribute is split into the class list.
    #[must_use]
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        if name == "class" {
            for class in value.split_whitespace() {
                self = self.class(class);
            }
        } else {
            self.attributes.insert(name.to_string(), value.to_string());
        }
        self
    }

    /// Sets the `id` attribute.
    #[must_use]
    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    /// Sets the `name` attribute.
    #[must_use]
    pub fn name(self, name: &str) -> Self {
        self.attr("name", name)
    }

    /// Sets the `type` attribute.
    #[must_use]
    pub fn input_type(self, input_type: &str) -> Self {
        self.attr("type", input_type)
    }

    /// Adds the `required` attribute.
    #[must_use]
    pub fn required(self) -> Self {
        self.attr("required", "required")
    }

    /// Adds the `disabled` attribute.
    #[must_use]
    pub fn disabled(self) -> Self {
        self.attr("disabled", "disabled")
    }

    /// Sets the `pattern` attribute.
    #[must_use]
    pub fn pattern(self, pattern: &str) -> Self {
        self.attr("pattern", pattern)
    }

    /// Adds a class.
    #[must_use]
    pub fn class(mut self, class: &str) -> Self {
        if !self.classes.iter().any(|c| c == class) {
            self.classes.push(class.to_string());
        }
        self
    }

    /// Sets the initial value.
    #[must_use]
    pub fn value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    /// Sets the initial checked state.
    #[must_use]
    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    /// Marks an `<option>` as selected.
    #[must_use]
    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// Sets the text content.
    #[must_use]
    pub fn text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub(crate) fn build(self, id: ElementId, parent: Option<ElementId>) -> Element {
        Element {
            id,
            tag: self.tag,
            attributes: self.attributes,
            classes: self.classes,
            value: self.value,
            checked: self.checked,
            selected: self.selected,
            text: self.text,
            parent,
            children: Vec::new(),
        }
    }
}
