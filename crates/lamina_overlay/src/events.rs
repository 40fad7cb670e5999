//! Overlay lifecycle events
//!
//! Surfaces announce `BeforeShow`, `AfterShow`, `BeforeHide` and `AfterHide`.
//! The two "before" events are cancelable: a listener calling
//! [`LifecycleEvent::prevent_default`] keeps the surface in its current state.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use slotmap::{new_key_type, SlotMap};

/// Lifecycle event kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleEventKind {
    BeforeShow,
    AfterShow,
    BeforeHide,
    AfterHide,
}

impl LifecycleEventKind {
    pub fn is_cancelable(self) -> bool {
        matches!(self, LifecycleEventKind::BeforeShow | LifecycleEventKind::BeforeHide)
    }
}

/// Event passed to lifecycle listeners
#[derive(Debug)]
pub struct LifecycleEvent {
    kind: LifecycleEventKind,
    prevented: Cell<bool>,
}

impl LifecycleEvent {
    pub fn new(kind: LifecycleEventKind) -> Self {
        Self {
            kind,
            prevented: Cell::new(false),
        }
    }

    pub fn kind(&self) -> LifecycleEventKind {
        self.kind
    }

    /// Cancel the pending transition; ignored for non-cancelable events
    pub fn prevent_default(&self) {
        if self.kind.is_cancelable() {
            self.prevented.set(true);
        } else {
            tracing::warn!("prevent_default on non-cancelable {:?} ignored", self.kind);
        }
    }

    pub fn is_default_prevented(&self) -> bool {
        self.prevented.get()
    }
}

new_key_type! {
    /// Handle to a lifecycle listener
    pub struct LifecycleListenerId;
}

/// Lifecycle listener callback
pub type LifecycleHandler = Rc<dyn Fn(&LifecycleEvent)>;

/// Per-surface lifecycle listener registry
#[derive(Default)]
pub struct LifecycleListeners {
    listeners: RefCell<SlotMap<LifecycleListenerId, (LifecycleEventKind, LifecycleHandler)>>,
}

impl LifecycleListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<F>(&self, kind: LifecycleEventKind, handler: F) -> LifecycleListenerId
    where
        F: Fn(&LifecycleEvent) + 'static,
    {
        self.listeners.borrow_mut().insert((kind, Rc::new(handler)))
    }

    pub fn remove(&self, id: LifecycleListenerId) -> bool {
        let removed = self.listeners.borrow_mut().remove(id);
        removed.is_some()
    }

    pub fn len(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fire `kind`; returns `false` if a listener canceled it
    pub fn dispatch(&self, kind: LifecycleEventKind) -> bool {
        let handlers: Vec<LifecycleHandler> = self
            .listeners
            .borrow()
            .values()
            .filter(|(k, _)| *k == kind)
            .map(|(_, handler)| handler.clone())
            .collect();

        let event = LifecycleEvent::new(kind);
        for handler in handlers {
            handler(&event);
        }
        !event.is_default_prevented()
    }
}

impl std::fmt::Debug for LifecycleListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleListeners")
            .field("count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_reaches_matching_listeners_only() {
        let listeners = LifecycleListeners::new();
        let hits = Rc::new(Cell::new(0));

        let h = hits.clone();
        listeners.add(LifecycleEventKind::AfterShow, move |_| h.set(h.get() + 1));
        let h = hits.clone();
        listeners.add(LifecycleEventKind::AfterHide, move |_| h.set(h.get() + 100));

        assert!(listeners.dispatch(LifecycleEventKind::AfterShow));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_before_events_can_be_canceled() {
        let listeners = LifecycleListeners::new();
        listeners.add(LifecycleEventKind::BeforeHide, |e| e.prevent_default());
        listeners.add(LifecycleEventKind::AfterShow, |e| e.prevent_default());

        assert!(!listeners.dispatch(LifecycleEventKind::BeforeHide));
        assert!(listeners.dispatch(LifecycleEventKind::AfterShow));
        assert!(listeners.dispatch(LifecycleEventKind::BeforeShow));
    }

    #[test]
    fn test_remove_listener() {
        let listeners = LifecycleListeners::new();
        let id = listeners.add(LifecycleEventKind::BeforeShow, |e| e.prevent_default());
        assert!(listeners.remove(id));
        assert!(!listeners.remove(id));
        assert!(listeners.is_empty());
        assert!(listeners.dispatch(LifecycleEventKind::BeforeShow));
    }
}
