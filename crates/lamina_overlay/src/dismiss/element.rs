//! Single-surface dismissable adapter

use std::cell::Cell;

use lamina_core::{Document, ElementId};

use super::{DismissInfo, Dismissable, DismissalPolicy};

/// Called when the surface accepts a light dismissal
pub type DismissCallback = Box<dyn Fn(&DismissInfo)>;

/// Custom activation; receives `use_set_active`
pub type ActivateCallback = Box<dyn Fn(bool)>;

/// Adapts one overlay element to the [`Dismissable`] protocol
///
/// Remembers the last element focused inside the surface so activation can
/// put focus back where the user left it.
pub struct LightDismissableElement {
    element: ElementId,
    document: Document,
    policy: DismissalPolicy,
    z_index: Cell<Option<i32>>,
    last_focused: Cell<Option<ElementId>>,
    on_light_dismiss: DismissCallback,
    on_activate: Option<ActivateCallback>,
}

impl LightDismissableElement {
    pub fn new<F>(document: Document, element: ElementId, on_light_dismiss: F) -> Self
    where
        F: Fn(&DismissInfo) + 'static,
    {
        Self {
            element,
            document,
            policy: DismissalPolicy::Light,
            z_index: Cell::new(None),
            last_focused: Cell::new(None),
            on_light_dismiss: Box::new(on_light_dismiss),
            on_activate: None,
        }
    }

    /// Replace the dismissal policy
    pub fn policy(mut self, policy: DismissalPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the default activation behavior
    pub fn with_activation<F>(mut self, activate: F) -> Self
    where
        F: Fn(bool) + 'static,
    {
        self.on_activate = Some(Box::new(activate));
        self
    }

    pub fn element(&self) -> ElementId {
        self.element
    }

    pub fn z_index(&self) -> Option<i32> {
        self.z_index.get()
    }

    pub fn last_focused(&self) -> Option<ElementId> {
        self.last_focused.get()
    }

    /// Refocus the last element focused inside the surface
    pub fn restore_focus(&self) -> bool {
        match self.last_focused.get() {
            Some(target) if self.document.contains(self.element, target) => {
                self.document.focus(target)
            }
            _ => false,
        }
    }

    /// Focus the first focusable descendant, falling back to the element itself
    pub fn focus_first(&self) -> bool {
        let first = self.document.tree().first_focusable_descendant(self.element);
        match first {
            Some(target) => self.document.focus(target),
            None => self.document.focus(self.element),
        }
    }
}

impl Dismissable for LightDismissableElement {
    fn set_z_index(&self, z_index: Option<i32>) {
        self.z_index.set(z_index);
    }

    fn z_index_count(&self) -> i32 {
        1
    }

    fn contains_element(&self, element: ElementId) -> bool {
        self.document.contains(self.element, element)
    }

    fn on_activate(&self, use_set_active: bool) {
        if let Some(activate) = &self.on_activate {
            activate(use_set_active);
        } else if !self.restore_focus() {
            self.focus_first();
        }
    }

    fn on_focus(&self, element: ElementId) {
        self.last_focused.set(Some(element));
    }

    fn on_hide(&self) {
        self.last_focused.set(None);
    }

    fn on_should_light_dismiss(&self, info: &DismissInfo) -> bool {
        self.policy.should_dismiss(info)
    }

    fn on_light_dismiss(&self, info: &DismissInfo) {
        (self.on_light_dismiss)(info);
    }
}

impl std::fmt::Debug for LightDismissableElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LightDismissableElement")
            .field("element", &self.element)
            .field("policy", &self.policy)
            .field("z_index", &self.z_index.get())
            .finish()
    }
}
