//! Overlay error types

use lamina_core::{CoreError, ElementId};
use thiserror::Error;

/// Overlay-related errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OverlayError {
    /// Placement string did not name a known placement
    #[error("Invalid placement: {0:?} (expected top, bottom, left, right, auto, autohorizontal or autovertical)")]
    BadPlacement(String),

    /// Alignment string did not name a known alignment
    #[error("Invalid alignment: {0:?} (expected center, left or right)")]
    BadAlignment(String),

    /// Show was requested without an anchor, or the anchor left the document
    #[error("Flyout anchor is missing or not attached to the document")]
    NoAnchor,

    /// The element already hosts an overlay control
    #[error("Element {0:?} already hosts an overlay control")]
    DuplicateControl(ElementId),

    /// Element tree failure
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for overlay operations
pub type Result<T> = std::result::Result<T, OverlayError>;
