//! Instance configuration.

use std::fmt;
use std::sync::Arc;

use oxide_dom::SelectorList;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidateError};
use crate::render::{ClassRenderer, Renderer};

/// Field-level interactions that can trigger revalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    /// The field's value was committed.
    Change,
    /// The field lost focus.
    FocusOut,
    /// A key was released inside the field.
    KeyUp,
    /// The field was clicked (checkables).
    Click,
}

/// Options controlling one bound instance.
///
/// Keys deserialize from camelCase JSON; unknown keys are rejected.
///
/// ```
/// use oxide_validate::Config;
///
/// let config = Config::from_json(r#"{ "submit": false, "allValidSelectors": "select" }"#).unwrap();
/// assert!(!config.submit);
/// assert!(config.validate_on_submit);
/// assert_eq!(config.all_valid_selectors, "select");
///
/// assert!(Config::from_json(r#"{ "submit": "yes" }"#).is_err());
/// ```
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct Config {
    /// Allow native submission to proceed when the form is valid.
    pub submit: bool,
    /// Run a full validation pass when the form is submitted.
    pub validate_on_submit: bool,
    /// Focus the first invalid field when a submission is blocked.
    pub focus_first_invalid_element_on_submit: bool,
    /// Extra elements always included in full-form passes.
    pub all_valid_selectors: String,
    /// Class added to invalid fields.
    pub error_class: String,
    /// Class added to valid fields.
    pub valid_class: String,
    /// Class that excludes a field from validation.
    pub novalidate_class: String,
    /// Prefix of classes that reference library rules (`h5-email`).
    pub class_prefix: String,
    /// Attribute naming the element that displays a field's message.
    pub error_attribute: String,
    /// Interactions that revalidate a single field.
    pub triggers: Vec<Trigger>,
    /// Message and error rendering hook.
    #[serde(skip)]
    pub renderer: Option<Arc<dyn Renderer>>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("submit", &self.submit)
            .field("validate_on_submit", &self.validate_on_submit)
            .field(
                "focus_first_invalid_element_on_submit",
                &self.focus_first_invalid_element_on_submit,
            )
            .field("all_valid_selectors", &self.all_valid_selectors)
            .field("error_class", &self.error_class)
            .field("valid_class", &self.valid_class)
            .field("novalidate_class", &self.novalidate_class)
            .field("class_prefix", &self.class_prefix)
            .field("error_attribute", &self.error_attribute)
            .field("triggers", &self.triggers)
            .field("renderer", &self.renderer.as_ref().map(|_| "custom"))
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            submit: true,
            validate_on_submit: true,
            focus_first_invalid_element_on_submit: true,
            all_valid_selectors: String::new(),
            error_class: "ui-state-error".to_string(),
            valid_class: "ui-state-valid".to_string(),
            novalidate_class: "novalidate".to_string(),
            class_prefix: "h5-".to_string(),
            error_attribute: "data-h5-errorid".to_string(),
            triggers: vec![Trigger::Change, Trigger::FocusOut],
            renderer: None,
        }
    }
}

impl Config {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses options from JSON, filling unspecified keys with defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sets whether valid forms submit natively.
    #[must_use]
    pub fn submit(mut self, submit: bool) -> Self {
        self.submit = submit;
        self
    }

    /// Sets whether submission runs a validation pass.
    #[must_use]
    pub fn validate_on_submit(mut self, enabled: bool) -> Self {
        self.validate_on_submit = enabled;
        self
    }

    /// Sets whether a blocked submission focuses the first invalid field.
    #[must_use]
    pub fn focus_first_invalid(mut self, enabled: bool) -> Self {
        self.focus_first_invalid_element_on_submit = enabled;
        self
    }

    /// Sets the extra selectors for full-form passes.
    #[must_use]
    pub fn all_valid_selectors(mut self, selectors: impl Into<String>) -> Self {
        self.all_valid_selectors = selectors.into();
        self
    }

    /// Sets the revalidation triggers.
    #[must_use]
    pub fn triggers(mut self, triggers: &[Trigger]) -> Self {
        self.triggers = triggers.to_vec();
        self
    }

    /// Installs a rendering hook.
    #[must_use]
    pub fn renderer(mut self, renderer: impl Renderer + 'static) -> Self {
        self.renderer = Some(Arc::new(renderer));
        self
    }

    /// Returns whether `trigger` revalidates a field.
    pub fn triggers_on(&self, trigger: Trigger) -> bool {
        self.triggers.contains(&trigger)
    }

    /// Returns the rendering hook, defaulting to [`ClassRenderer`].
    pub fn resolved_renderer(&self) -> Arc<dyn Renderer> {
        self.renderer
            .clone()
            .unwrap_or_else(|| Arc::new(ClassRenderer))
    }

    /// Checks every option and parses the selectors.
    pub fn validate(&self) -> Result<SelectorList> {
        for (key, class) in [
            ("errorClass", &self.error_class),
            ("validClass", &self.valid_class),
            ("novalidateClass", &self.novalidate_class),
            ("classPrefix", &self.class_prefix),
        ] {
            if class.is_empty() || class.chars().any(char::is_whitespace) {
                return Err(ValidateError::InvalidConfiguration(format!(
                    "{key} must be a single non-empty class name, got {class:?}"
                )));
            }
        }
        if self.error_attribute.trim().is_empty() {
            return Err(ValidateError::InvalidConfiguration(
                "errorAttribute must not be empty".to_string(),
            ));
        }
        Ok(SelectorList::parse(&self.all_valid_selectors)?)
    }
}
