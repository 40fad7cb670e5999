//! Shared document handle
//!
//! [`Document`] wraps an [`ElementTree`] together with the focused element and
//! the registered event listeners. It is a cheap clonable handle, shared by
//! every overlay that lives in the same window.
//!
//! Listeners are invoked with no internal borrow held, so a handler may freely
//! move focus, mutate the tree, or register and remove listeners.
//!
//! # Example
//!
//! ```ignore
//! use lamina_core::{Document, Rect};
//!
//! let doc = Document::new();
//! let root = doc.create_root(Rect::new(0.0, 0.0, 800.0, 600.0));
//! let button = doc.create_child(root)?;
//! doc.set_focusable(button, true)?;
//!
//! doc.add_focus_in_listener(root, |event| {
//!     tracing::info!("focus moved to {:?}", event.target);
//! });
//! doc.focus(button);
//! ```

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::rc::Rc;

use slotmap::{new_key_type, SlotMap};

use crate::error::Result;
use crate::events::{FocusEvent, KeyEvent, KeyboardEvent};
use crate::geometry::Rect;
use crate::tree::{Direction, ElementId, ElementTree};

new_key_type! {
    /// Handle to a registered event listener
    pub struct ListenerId;
}

/// Focus-in handler
pub type FocusHandler = Rc<dyn Fn(&FocusEvent)>;

/// Key-down handler
pub type KeyHandler = Rc<dyn Fn(&KeyEvent)>;

#[derive(Clone)]
enum Listener {
    FocusIn(ElementId, FocusHandler),
    KeyDown(ElementId, KeyHandler),
    /// Observes every focus change in the document
    FocusChange(FocusHandler),
}

struct DocumentInner {
    tree: RefCell<ElementTree>,
    focused: Cell<Option<ElementId>>,
    listeners: RefCell<SlotMap<ListenerId, Listener>>,
}

/// Shared handle to the element tree, focus state and listeners
#[derive(Clone)]
pub struct Document {
    inner: Rc<DocumentInner>,
}

impl Document {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(DocumentInner {
                tree: RefCell::new(ElementTree::new()),
                focused: Cell::new(None),
                listeners: RefCell::new(SlotMap::with_key()),
            }),
        }
    }

    /// Borrow the element tree
    ///
    /// Do not hold the borrow across calls that dispatch events.
    pub fn tree(&self) -> Ref<'_, ElementTree> {
        self.inner.tree.borrow()
    }

    /// Mutably borrow the element tree
    pub fn tree_mut(&self) -> RefMut<'_, ElementTree> {
        self.inner.tree.borrow_mut()
    }

    /// Whether two handles refer to the same document
    pub fn ptr_eq(&self, other: &Document) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // =========================================================================
    // Tree shortcuts
    // =========================================================================

    pub fn create_root(&self, bounds: Rect) -> ElementId {
        self.tree_mut().create_root(bounds)
    }

    pub fn create_element(&self) -> ElementId {
        self.tree_mut().create_element()
    }

    /// Create an element and append it to `parent`
    pub fn create_child(&self, parent: ElementId) -> Result<ElementId> {
        let mut tree = self.tree_mut();
        let child = tree.create_element();
        tree.append_child(parent, child)?;
        Ok(child)
    }

    pub fn append_child(&self, parent: ElementId, child: ElementId) -> Result<()> {
        self.tree_mut().append_child(parent, child)
    }

    /// Detach an element from its parent; clears focus if it was inside
    pub fn detach(&self, id: ElementId) -> Result<()> {
        self.tree_mut().detach(id)?;
        self.drop_stale_focus();
        Ok(())
    }

    /// Remove an element subtree along with all listeners registered on it
    pub fn remove(&self, id: ElementId) {
        let removed = self.tree_mut().remove_subtree(id);
        if removed.is_empty() {
            return;
        }

        if let Some(focused) = self.inner.focused.get() {
            if removed.contains(&focused) {
                self.inner.focused.set(None);
            }
        }

        let stale: Vec<Listener> = {
            let mut listeners = self.inner.listeners.borrow_mut();
            let ids: Vec<ListenerId> = listeners
                .iter()
                .filter(|(_, l)| match l {
                    Listener::FocusIn(el, _) | Listener::KeyDown(el, _) => removed.contains(el),
                    Listener::FocusChange(_) => false,
                })
                .map(|(id, _)| id)
                .collect();
            ids.into_iter().filter_map(|id| listeners.remove(id)).collect()
        };
        tracing::trace!(
            "Document::remove - {} elements, {} listeners",
            removed.len(),
            stale.len()
        );
    }

    pub fn contains(&self, ancestor: ElementId, id: ElementId) -> bool {
        self.tree().contains(ancestor, id)
    }

    pub fn is_attached(&self, id: ElementId) -> bool {
        self.tree().is_attached(id)
    }

    pub fn exists(&self, id: ElementId) -> bool {
        self.tree().exists(id)
    }

    pub fn bounds(&self, id: ElementId) -> Option<Rect> {
        self.tree().bounds(id)
    }

    pub fn set_bounds(&self, id: ElementId, bounds: Rect) -> Result<()> {
        self.tree_mut().set_bounds(id, bounds)
    }

    pub fn set_focusable(&self, id: ElementId, focusable: bool) -> Result<()> {
        self.tree_mut().set_focusable(id, focusable)
    }

    pub fn set_hidden(&self, id: ElementId, hidden: bool) -> Result<()> {
        self.tree_mut().set_hidden(id, hidden)?;
        if hidden {
            self.drop_stale_focus();
        }
        Ok(())
    }

    pub fn direction(&self, id: ElementId) -> Direction {
        self.tree().direction(id)
    }

    pub fn set_direction(&self, id: ElementId, direction: Direction) -> Result<()> {
        self.tree_mut().set_direction(id, direction)
    }

    // =========================================================================
    // Focus
    // =========================================================================

    /// The focused element, if it is still rendered
    pub fn focused(&self) -> Option<ElementId> {
        self.inner
            .focused
            .get()
            .filter(|id| self.tree().is_rendered(*id))
    }

    /// Move focus to `id`
    ///
    /// Returns `false` when the element cannot take focus. Document-wide focus
    /// observers run first, then focus-in listeners on the element and its
    /// ancestors, innermost first.
    pub fn focus(&self, id: ElementId) -> bool {
        if !self.tree().can_focus(id) {
            return false;
        }

        let previous = self.focused();
        if previous == Some(id) {
            return true;
        }
        self.inner.focused.set(Some(id));

        let event = FocusEvent {
            target: id,
            related_target: previous,
        };
        tracing::trace!("Document::focus - {:?} (from {:?})", id, previous);

        let path = self.tree().ancestors(id);
        let handlers: Vec<FocusHandler> = {
            let listeners = self.inner.listeners.borrow();
            let mut handlers: Vec<FocusHandler> = listeners
                .values()
                .filter_map(|l| match l {
                    Listener::FocusChange(handler) => Some(handler.clone()),
                    _ => None,
                })
                .collect();
            for element in &path {
                handlers.extend(listeners.values().filter_map(|l| match l {
                    Listener::FocusIn(el, handler) if el == element => Some(handler.clone()),
                    _ => None,
                }));
            }
            handlers
        };

        for handler in handlers {
            handler(&event);
        }
        true
    }

    /// Clear focus without dispatching events
    pub fn blur(&self) {
        self.inner.focused.set(None);
    }

    fn drop_stale_focus(&self) {
        if self.focused().is_none() {
            self.inner.focused.set(None);
        }
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    /// Listen for focus landing on `element` or any of its descendants
    pub fn add_focus_in_listener<F>(&self, element: ElementId, handler: F) -> ListenerId
    where
        F: Fn(&FocusEvent) + 'static,
    {
        self.inner
            .listeners
            .borrow_mut()
            .insert(Listener::FocusIn(element, Rc::new(handler)))
    }

    /// Listen for key presses targeted at `element` or bubbling through it
    pub fn add_key_down_listener<F>(&self, element: ElementId, handler: F) -> ListenerId
    where
        F: Fn(&KeyEvent) + 'static,
    {
        self.inner
            .listeners
            .borrow_mut()
            .insert(Listener::KeyDown(element, Rc::new(handler)))
    }

    /// Observe every focus change in the document
    pub fn add_focus_observer<F>(&self, handler: F) -> ListenerId
    where
        F: Fn(&FocusEvent) + 'static,
    {
        self.inner
            .listeners
            .borrow_mut()
            .insert(Listener::FocusChange(Rc::new(handler)))
    }

    /// Remove a listener; returns `false` if it was already gone
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let removed = self.inner.listeners.borrow_mut().remove(id);
        removed.is_some()
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    /// Dispatch a key press at `target`, bubbling towards the root
    pub fn dispatch_key_down(&self, target: ElementId, keyboard: KeyboardEvent) -> KeyEvent {
        let event = KeyEvent::new(target, keyboard);
        let path = self.tree().ancestors(target);

        for element in path {
            let handlers: Vec<KeyHandler> = self
                .inner
                .listeners
                .borrow()
                .values()
                .filter_map(|l| match l {
                    Listener::KeyDown(el, handler) if *el == element => Some(handler.clone()),
                    _ => None,
                })
                .collect();

            for handler in handlers {
                handler(&event);
            }
            if event.is_propagation_stopped() {
                break;
            }
        }
        event
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("elements", &self.tree().len())
            .field("focused", &self.inner.focused.get())
            .field("listeners", &self.listener_count())
            .finish()
    }
}
