//! Widget error types

use lamina_core::CoreError;
use lamina_overlay::OverlayError;
use thiserror::Error;

/// Menu-related errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MenuError {
    /// Commands can only be replaced while the menu is hidden
    #[error("Cannot change commands while the menu is visible")]
    CannotChangeCommandsWhenVisible,

    /// A command operation was given no commands
    #[error("Invalid argument: commands must not be empty")]
    RequiresCommands,

    /// Underlying flyout failure
    #[error(transparent)]
    Overlay(#[from] OverlayError),

    /// Element tree failure
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for widget operations
pub type Result<T> = std::result::Result<T, MenuError>;
