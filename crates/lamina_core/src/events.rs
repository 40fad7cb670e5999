//! DOM-style events dispatched by [`Document`](crate::Document)

use std::cell::Cell;

pub use lamina_platform::{Key, KeyState, KeyboardEvent, Modifiers};

use crate::tree::ElementId;

/// Focus moved onto `target`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FocusEvent {
    /// Element that received focus
    pub target: ElementId,
    /// Element that lost focus, if any
    pub related_target: Option<ElementId>,
}

/// A key press routed to the focused element and bubbled to its ancestors
#[derive(Debug)]
pub struct KeyEvent {
    target: ElementId,
    keyboard: KeyboardEvent,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
}

impl KeyEvent {
    pub fn new(target: ElementId, keyboard: KeyboardEvent) -> Self {
        Self {
            target,
            keyboard,
            default_prevented: Cell::new(false),
            propagation_stopped: Cell::new(false),
        }
    }

    pub fn target(&self) -> ElementId {
        self.target
    }

    pub fn key(&self) -> Key {
        self.keyboard.key
    }

    pub fn modifiers(&self) -> Modifiers {
        self.keyboard.modifiers
    }

    pub fn keyboard(&self) -> &KeyboardEvent {
        &self.keyboard
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    /// Stop bubbling to further ancestors
    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }
}
