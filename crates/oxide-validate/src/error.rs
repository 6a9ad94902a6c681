//! Error types for validation.

use oxide_dom::ElementId;
use thiserror::Error;

/// Validation engine errors.
#[derive(Debug, Error)]
pub enum ValidateError {
    /// A rule name was referenced that no registry entry provides.
    ///
    /// Field evaluation recovers from this locally; it only surfaces from
    /// direct registry lookups.
    #[error("rule not found: {0}")]
    RuleNotFound(String),

    /// A configuration value was rejected at bind time.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The element is no longer part of the document.
    #[error("missing field: {0}")]
    MissingField(ElementId),

    /// The element is not managed by any bound instance.
    #[error("element is not bound: {0}")]
    NotBound(ElementId),

    /// A pattern failed to compile.
    #[error("invalid pattern {name}: {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },
}

impl From<serde_json::Error> for ValidateError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidConfiguration(err.to_string())
    }
}

impl From<oxide_dom::DomError> for ValidateError {
    fn from(err: oxide_dom::DomError) -> Self {
        match err {
            oxide_dom::DomError::UnknownElement(id) => Self::MissingField(id),
            other @ oxide_dom::DomError::Selector { .. } => {
                Self::InvalidConfiguration(other.to_string())
            }
        }
    }
}

/// Result type alias for validation operations.
pub type Result<T> = std::result::Result<T, ValidateError>;
