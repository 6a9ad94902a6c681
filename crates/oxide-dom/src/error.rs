//! Error types for the DOM layer.

use thiserror::Error;

use crate::element::ElementId;

/// DOM-specific errors.
#[derive(Debug, Error)]
pub enum DomError {
    /// A selector string could not be parsed.
    #[error("invalid selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },

    /// The element is not part of the document.
    #[error("unknown element: {0}")]
    UnknownElement(ElementId),
}

/// Result type alias for DOM operations.
pub type Result<T> = std::result::Result<T, DomError>;
