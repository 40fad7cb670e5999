//! Lamina Platform Shims
//!
//! Small platform-facing pieces the overlay layer depends on:
//!
//! - [`InputModality`] - which device the user touched last
//! - [`ViewportMetrics`] / [`VisibleWindow`] - the part of the window not
//!   covered by a soft keyboard
//! - Raw input event types shared by every Lamina crate
//!
//! # Example
//!
//! ```ignore
//! use lamina_platform::*;
//!
//! let modality = InputModality::new();
//! modality.observe(&InputEvent::Keyboard(KeyboardEvent::pressed(Key::Tab)));
//! assert!(modality.keyboard_seen_last());
//!
//! let window = VisibleWindow::new(800.0, 600.0)?;
//! window.show_keyboard(250.0, 300)?;
//! assert_eq!(window.visible_doc_height(), 350.0);
//! ```

mod error;
mod input;
mod viewport;

// Re-export all public types
pub use error::{PlatformError, Result};
pub use input::{
    InputEvent, InputModality, InputType, Key, KeyState, KeyboardEvent, Modifiers, MouseButton,
    MouseEvent, TouchEvent,
};
pub use viewport::{ViewportMetrics, VisibleWindow};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{PlatformError, Result};
    pub use crate::input::{
        InputEvent, InputModality, InputType, Key, KeyState, KeyboardEvent, Modifiers,
        MouseButton, MouseEvent, TouchEvent,
    };
    pub use crate::viewport::{ViewportMetrics, VisibleWindow};
}
