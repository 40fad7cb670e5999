//! Input events and input-modality tracking
//!
//! Overlays adapt to the way the user last interacted with the app: menus
//! pick wider spacing after touch, and focus is moved with a visible focus
//! rectangle only after keyboard use. [`InputModality`] records that history
//! from the raw [`InputEvent`] stream.

use std::cell::Cell;

/// Input events
#[derive(Clone, Debug)]
pub enum InputEvent {
    /// Mouse event
    Mouse(MouseEvent),
    /// Keyboard event
    Keyboard(KeyboardEvent),
    /// Touch event (mobile/touchscreen)
    Touch(TouchEvent),
    /// Pen/stylus contact
    Pen {
        /// X position in window coordinates
        x: f32,
        /// Y position in window coordinates
        y: f32,
    },
}

// ============================================================================
// Mouse Events
// ============================================================================

/// Mouse events
#[derive(Clone, Debug)]
pub enum MouseEvent {
    /// Mouse moved to position
    Moved {
        /// X position in window coordinates
        x: f32,
        /// Y position in window coordinates
        y: f32,
    },
    /// Mouse button pressed
    ButtonPressed {
        /// Which button was pressed
        button: MouseButton,
        /// X position when pressed
        x: f32,
        /// Y position when pressed
        y: f32,
    },
    /// Mouse button released
    ButtonReleased {
        /// Which button was released
        button: MouseButton,
        /// X position when released
        x: f32,
        /// Y position when released
        y: f32,
    },
}

/// Mouse buttons
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button (scroll wheel click)
    Middle,
}

// ============================================================================
// Keyboard Events
// ============================================================================

/// Keyboard event
#[derive(Clone, Debug, PartialEq)]
pub struct KeyboardEvent {
    /// The key that was pressed or released
    pub key: Key,
    /// Whether the key was pressed or released
    pub state: KeyState,
    /// Modifier keys held during this event
    pub modifiers: Modifiers,
}

impl KeyboardEvent {
    /// A key press with no modifiers
    pub fn pressed(key: Key) -> Self {
        Self {
            key,
            state: KeyState::Pressed,
            modifiers: Modifiers::default(),
        }
    }

    /// Attach modifier state
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Key press/release state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyState {
    /// Key was pressed
    Pressed,
    /// Key was released
    Released,
}

/// Modifier key state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    /// Shift key is held
    pub shift: bool,
    /// Control key is held
    pub ctrl: bool,
    /// Alt key is held (Option on macOS)
    pub alt: bool,
    /// Meta key is held (Command on macOS, Windows key on Windows)
    pub meta: bool,
}

impl Modifiers {
    /// Check if no modifiers are held
    pub fn is_empty(&self) -> bool {
        !self.shift && !self.ctrl && !self.alt && !self.meta
    }

    /// Check if only shift is held
    pub fn shift_only(&self) -> bool {
        self.shift && !self.ctrl && !self.alt && !self.meta
    }
}

/// Key codes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    // Function keys
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,

    // Special keys
    Space,
    Enter,
    Escape,
    Backspace,
    Tab,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,

    // Arrow keys
    Left,
    Right,
    Up,
    Down,

    // Modifier keys (for tracking state)
    Shift,
    Ctrl,
    Alt,
    Meta,

    // Character input (for text input)
    Char(char),

    // Unknown key
    Unknown,
}

// ============================================================================
// Touch Events
// ============================================================================

/// Touch events for touchscreens
#[derive(Clone, Debug)]
pub enum TouchEvent {
    /// A touch started
    Started {
        /// Unique identifier for this touch
        id: u64,
        /// X position in window coordinates
        x: f32,
        /// Y position in window coordinates
        y: f32,
    },
    /// A touch ended
    Ended {
        /// Unique identifier for this touch
        id: u64,
        /// X position when ended
        x: f32,
        /// Y position when ended
        y: f32,
    },
    /// A touch was cancelled (e.g., by system gesture)
    Cancelled {
        /// Unique identifier for this touch
        id: u64,
    },
}

// ============================================================================
// Input Modality
// ============================================================================

/// The kind of device that produced the most recent user interaction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputType {
    Mouse,
    Touch,
    Pen,
    Keyboard,
}

/// Tracks the last input modality seen by the app
///
/// Only "intentional" input counts: pointer presses and key presses. Pointer
/// motion and key releases leave the recorded modality untouched.
#[derive(Debug, Default)]
pub struct InputModality {
    last_input_type: Cell<Option<InputType>>,
    keyboard_seen_last: Cell<bool>,
}

impl InputModality {
    /// Create a tracker that has not observed any input yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an input event
    pub fn observe(&self, event: &InputEvent) {
        let observed = match event {
            InputEvent::Mouse(MouseEvent::ButtonPressed { .. }) => Some(InputType::Mouse),
            InputEvent::Touch(TouchEvent::Started { .. }) => Some(InputType::Touch),
            InputEvent::Pen { .. } => Some(InputType::Pen),
            InputEvent::Keyboard(KeyboardEvent {
                state: KeyState::Pressed,
                ..
            }) => Some(InputType::Keyboard),
            _ => None,
        };

        if let Some(input_type) = observed {
            self.record(input_type);
        }
    }

    /// Record an input modality directly
    pub fn record(&self, input_type: InputType) {
        if self.last_input_type.get() != Some(input_type) {
            tracing::trace!("InputModality - switched to {:?}", input_type);
        }
        self.last_input_type.set(Some(input_type));
        self.keyboard_seen_last.set(input_type == InputType::Keyboard);
    }

    /// The modality of the most recent intentional input, if any
    pub fn last_input_type(&self) -> Option<InputType> {
        self.last_input_type.get()
    }

    /// Whether the most recent intentional input came from the keyboard
    pub fn keyboard_seen_last(&self) -> bool {
        self.keyboard_seen_last.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifiers_default_is_empty() {
        let mods = Modifiers::default();
        assert!(mods.is_empty());
        assert!(!mods.shift_only());

        let shift = Modifiers {
            shift: true,
            ..Default::default()
        };
        assert!(shift.shift_only());
    }

    #[test]
    fn test_modality_starts_unknown() {
        let modality = InputModality::new();
        assert_eq!(modality.last_input_type(), None);
        assert!(!modality.keyboard_seen_last());
    }

    #[test]
    fn test_modality_tracks_presses() {
        let modality = InputModality::new();

        modality.observe(&InputEvent::Keyboard(KeyboardEvent::pressed(Key::Tab)));
        assert_eq!(modality.last_input_type(), Some(InputType::Keyboard));
        assert!(modality.keyboard_seen_last());

        modality.observe(&InputEvent::Touch(TouchEvent::Started {
            id: 1,
            x: 10.0,
            y: 10.0,
        }));
        assert_eq!(modality.last_input_type(), Some(InputType::Touch));
        assert!(!modality.keyboard_seen_last());
    }

    #[test]
    fn test_modality_ignores_motion_and_release() {
        let modality = InputModality::new();
        modality.observe(&InputEvent::Mouse(MouseEvent::ButtonPressed {
            button: MouseButton::Left,
            x: 0.0,
            y: 0.0,
        }));

        modality.observe(&InputEvent::Mouse(MouseEvent::Moved { x: 5.0, y: 5.0 }));
        modality.observe(&InputEvent::Keyboard(KeyboardEvent {
            key: Key::Enter,
            state: KeyState::Released,
            modifiers: Modifiers::default(),
        }));

        assert_eq!(modality.last_input_type(), Some(InputType::Mouse));
    }
}
