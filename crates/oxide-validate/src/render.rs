//! Rendering hooks for validation outcomes.

use oxide_dom::{Dom, ElementId};

use crate::config::Config;

/// The outcome of one field evaluation, handed to a [`Renderer`].
#[derive(Debug, Clone, Copy)]
pub struct Mark<'a> {
    /// The evaluated field.
    pub field: ElementId,
    /// The form instance the field belongs to.
    pub form: ElementId,
    /// The failure message, if the field is invalid.
    pub message: Option<&'a str>,
    /// The owning instance's configuration.
    pub config: &'a Config,
}

/// Applies validation outcomes to the document.
pub trait Renderer: Send + Sync {
    /// Called after a field evaluates valid.
    fn mark_valid(&self, dom: &mut dyn Dom, mark: &Mark<'_>);

    /// Called after a field evaluates invalid.
    fn mark_invalid(&self, dom: &mut dyn Dom, mark: &Mark<'_>);

    /// Called when a field is excluded from validation.
    fn unmark(&self, dom: &mut dyn Dom, field: ElementId, config: &Config);
}

/// Default renderer: toggles the configured classes on the field and shows
/// or hides the element its error attribute points at.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassRenderer;

impl ClassRenderer {
    fn error_target(dom: &dyn Dom, field: ElementId, config: &Config) -> Option<ElementId> {
        let html_id = dom.element(field)?.attr(&config.error_attribute)?.to_string();
        dom.find_by_html_id(field, &html_id)
    }

    fn hide_target(dom: &mut dyn Dom, field: ElementId, config: &Config) {
        if let Some(target) = Self::error_target(dom, field, config) {
            if let Some(el) = dom.element_mut(target) {
                el.set_attr("hidden", "hidden");
            }
        }
    }
}

impl Renderer for ClassRenderer {
    fn mark_valid(&self, dom: &mut dyn Dom, mark: &Mark<'_>) {
        let config = mark.config;
        if let Some(el) = dom.element_mut(mark.field) {
            el.remove_class(&config.error_class);
            el.add_class(&config.valid_class);
        }
        Self::hide_target(dom, mark.field, config);
    }

    fn mark_invalid(&self, dom: &mut dyn Dom, mark: &Mark<'_>) {
        let config = mark.config;
        if let Some(el) = dom.element_mut(mark.field) {
            el.remove_class(&config.valid_class);
            el.add_class(&config.error_class);
        }
        if let Some(target) = Self::error_target(dom, mark.field, config) {
            if let Some(el) = dom.element_mut(target) {
                el.remove_attr("hidden");
                if let Some(message) = mark.message {
                    el.set_text(message);
                }
            }
        }
    }

    fn unmark(&self, dom: &mut dyn Dom, field: ElementId, config: &Config) {
        if let Some(el) = dom.element_mut(field) {
            el.remove_class(&config.error_class);
            el.remove_class(&config.valid_class);
        }
        Self::hide_target(dom, field, config);
    }
}

/// Renderer that leaves the document untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRenderer;

impl Renderer for NoopRenderer {
    fn mark_valid(&self, _dom: &mut dyn Dom, _mark: &Mark<'_>) {}

    fn mark_invalid(&self, _dom: &mut dyn Dom, _mark: &Mark<'_>) {}

    fn unmark(&self, _dom: &mut dyn Dom, _field: ElementId, _config: &Config) {}
}
