//! The `Dom` trait and its in-memory implementation.

use std::collections::HashMap;

use crate::element::{Element, ElementBuilder, ElementId, Tag};
use crate::error::{DomError, Result};
use crate::selector::SelectorList;

/// Read/write access to a document tree.
///
/// Consumers hold a `&mut dyn Dom` for the duration of one operation; the
/// provided methods build form-control semantics on top of the four required
/// accessors.
pub trait Dom {
    /// Returns an element by id.
    fn element(&self, id: ElementId) -> Option<&Element>;

    /// Returns an element by id, mutably.
    fn element_mut(&mut self, id: ElementId) -> Option<&mut Element>;

    /// Returns the element that currently has input focus.
    fn focused(&self) -> Option<ElementId>;

    /// Moves input focus to `id`. Returns `false` if the element cannot take
    /// focus (unknown or disabled), in which case focus is unchanged.
    fn focus(&mut self, id: ElementId) -> bool;

    /// Returns whether the element is still part of the document.
    fn contains(&self, id: ElementId) -> bool {
        self.element(id).is_some()
    }

    /// Returns all descendants of `root` in document order, excluding `root`.
    fn descendants(&self, root: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = match self.element(root) {
            Some(el) => el.children().iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(id) = stack.pop() {
            if let Some(el) = self.element(id) {
                out.push(id);
                stack.extend(el.children().iter().rev().copied());
            }
        }
        out
    }

    /// Returns the nearest `<form>` ancestor of `id`, if any.
    fn closest_form(&self, id: ElementId) -> Option<ElementId> {
        let mut current = self.element(id)?.parent();
        while let Some(parent) = current {
            let el = self.element(parent)?;
            if *el.tag() == Tag::Form {
                return Some(parent);
            }
            current = el.parent();
        }
        None
    }

    /// Finds the element with the given `id` attribute in the tree containing
    /// `near`.
    fn find_by_html_id(&self, near: ElementId, html_id: &str) -> Option<ElementId> {
        let mut root = near;
        while let Some(parent) = self.element(root)?.parent() {
            root = parent;
        }
        std::iter::once(root)
            .chain(self.descendants(root))
            .find(|id| {
                self.element(*id)
                    .and_then(Element::html_id)
                    .is_some_and(|value| value == html_id)
            })
    }

    /// Returns the value a form submission would carry for a control.
    ///
    /// - checkboxes and radios: their `value` attribute (or `"on"`) when
    ///   checked, otherwise empty
    /// - selects: the value of the selected option, or of the first option
    ///   when none is marked selected
    /// - everything else: the raw value
    fn control_value(&self, id: ElementId) -> Option<String> {
        let el = self.element(id)?;
        if el.is_checkable() {
            return Some(if el.checked() {
                el.attr("value").unwrap_or("on").to_string()
            } else {
                String::new()
            });
        }
        if *el.tag() == Tag::Select {
            let options: Vec<&Element> = self
                .descendants(id)
                .into_iter()
                .filter_map(|child| self.element(child))
                .filter(|child| *child.tag() == Tag::Option)
                .collect();
            let chosen = options
                .iter()
                .find(|opt| opt.selected())
                .or_else(|| options.first());
            return Some(chosen.map_or_else(String::new, |opt| {
                opt.attr("value").unwrap_or(opt.text()).to_string()
            }));
        }
        Some(el.raw_value().to_string())
    }

    /// Returns the descendants of `root` matching any selector in `selectors`.
    fn query_all(&self, root: ElementId, selectors: &SelectorList) -> Vec<ElementId> {
        self.descendants(root)
            .into_iter()
            .filter(|id| {
                self.element(*id)
                    .is_some_and(|el| selectors.matches(el))
            })
            .collect()
    }
}

/// An arena-backed document.
///
/// Elements created with [`Document::create`] are detached roots; elements
/// added with [`Document::append`] hang off a parent.
#[derive(Debug, Default)]
pub struct Document {
    elements: HashMap<ElementId, Element>,
    roots: Vec<ElementId>,
    next_id: u64,
    focused: Option<ElementId>,
}

impl Document {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> ElementId {
        self.next_id += 1;
        ElementId::from_raw(self.next_id)
    }

    /// Creates a detached root element.
    pub fn create(&mut self, builder: ElementBuilder) -> ElementId {
        let id = self.allocate();
        self.elements.insert(id, builder.build(id, None));
        self.roots.push(id);
        id
    }

    /// Appends a new element as the last child of `parent`.
    pub fn append(&mut self, parent: ElementId, builder: ElementBuilder) -> Result<ElementId> {
        if !self.elements.contains_key(&parent) {
            return Err(DomError::UnknownElement(parent));
        }
        let id = self.allocate();
        self.elements.insert(id, builder.build(id, Some(parent)));
        if let Some(parent_el) = self.elements.get_mut(&parent) {
            parent_el.children.push(id);
        }
        Ok(id)
    }

    /// Removes an element and its whole subtree.
    pub fn remove(&mut self, id: ElementId) -> Result<()> {
        let parent = self
            .elements
            .get(&id)
            .ok_or(DomError::UnknownElement(id))?
            .parent;
        let mut doomed = self.descendants(id);
        doomed.push(id);
        for gone in &doomed {
            self.elements.remove(gone);
            if self.focused == Some(*gone) {
                self.focused = None;
            }
        }
        match parent {
            Some(parent) => {
                if let Some(parent_el) = self.elements.get_mut(&parent) {
                    parent_el.children.retain(|child| *child != id);
                }
            }
            None => self.roots.retain(|root| *root != id),
        }
        Ok(())
    }

    /// Returns the detached roots in creation order.
    pub fn roots(&self) -> &[ElementId] {
        &self.roots
    }

    /// Finds an element by its `id` attribute.
    pub fn by_html_id(&self, html_id: &str) -> Option<ElementId> {
        self.roots
            .iter()
            .flat_map(|root| std::iter::once(*root).chain(self.descendants(*root)))
            .find(|id| {
                self.elements
                    .get(id)
                    .and_then(Element::html_id)
                    .is_some_and(|value| value == html_id)
            })
    }

    /// Sets the raw value of an element.
    pub fn set_value(&mut self, id: ElementId, value: &str) -> Result<()> {
        self.get_mut(id)?.set_value(value);
        Ok(())
    }

    /// Sets the checked state of an element.
    ///
    /// Checking a radio button unchecks the other radios sharing its name
    /// inside the same form.
    pub fn set_checked(&mut self, id: ElementId, checked: bool) -> Result<()> {
        let (is_radio, name) = {
            let el = self.get_mut(id)?;
            el.set_checked(checked);
            (el.is_radio(), el.name().map(str::to_string))
        };
        if checked && is_radio {
            if let Some(name) = name {
                let scope = self.closest_form(id).unwrap_or(id);
                for sibling in self.descendants(scope) {
                    if sibling == id {
                        continue;
                    }
                    if let Some(el) = self.elements.get_mut(&sibling) {
                        if el.is_radio() && el.name() == Some(name.as_str()) {
                            el.set_checked(false);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Adds or removes the `disabled` attribute.
    pub fn set_disabled(&mut self, id: ElementId, disabled: bool) -> Result<()> {
        let el = self.get_mut(id)?;
        if disabled {
            el.set_attr("disabled", "disabled");
        } else {
            el.remove_attr("disabled");
        }
        Ok(())
    }

    /// Selects the option at `index` within a `<select>`, deselecting the
    /// others.
    pub fn select_option(&mut self, select: ElementId, index: usize) -> Result<()> {
        if !self.elements.contains_key(&select) {
            return Err(DomError::UnknownElement(select));
        }
        let options: Vec<ElementId> = self
            .descendants(select)
            .into_iter()
            .filter(|id| self.elements.get(id).is_some_and(|el| *el.tag() == Tag::Option))
            .collect();
        for (i, option) in options.iter().enumerate() {
            if let Some(el) = self.elements.get_mut(option) {
                el.selected = i == index;
            }
        }
        Ok(())
    }

    /// Clears input focus.
    pub fn blur(&mut self) {
        self.focused = None;
    }

    fn get_mut(&mut self, id: ElementId) -> Result<&mut Element> {
        self.elements
            .get_mut(&id)
            .ok_or(DomError::UnknownElement(id))
    }
}

impl Dom for Document {
    fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    fn element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(&id)
    }

    fn focused(&self) -> Option<ElementId> {
        self.focused
    }

    fn focus(&mut self, id: ElementId) -> bool {
        match self.elements.get(&id) {
            Some(el) if !el.is_disabled() => {
                self.focused = Some(id);
                true
            }
            _ => false,
        }
    }
}
