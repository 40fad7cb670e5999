//! Core error types

use thiserror::Error;

use crate::tree::ElementId;

/// Element tree errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The element does not exist (never created, or removed)
    #[error("Element not found: {0:?}")]
    ElementNotFound(ElementId),

    /// The element already has a parent
    #[error("Element {0:?} is already attached to a parent")]
    AlreadyAttached(ElementId),

    /// Attaching would make an element its own ancestor
    #[error("Appending {child:?} under {parent:?} would create a cycle")]
    WouldCreateCycle {
        /// Proposed parent
        parent: ElementId,
        /// Proposed child
        child: ElementId,
    },
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
