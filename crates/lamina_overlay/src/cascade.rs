//! Cascade manager
//!
//! Flyouts opened from inside other flyouts form a *cascade*: an ordered
//! stack, root first, where each surface is anchored inside its predecessor.
//! The manager keeps that stack consistent:
//!
//! - Appending a surface anchored inside stack entry *i* first collapses every
//!   entry above *i* (opening a sibling sub-menu closes the previous one).
//!   Appending a surface anchored anywhere else collapses the whole cascade.
//! - Collapsing pops surfaces one at a time, asking each to hide, until the
//!   requested surface is gone. Hiding a surface may try to collapse again;
//!   the reentrancy lock turns those nested calls into no-ops. Requests that
//!   arrive while locked can wait on [`CascadeManager::unlocked`].
//! - All surfaces of a cascade share one [`LightDismissableLayer`], so the
//!   light dismiss service sees the cascade as a single participant.
//!
//! # Example
//!
//! ```ignore
//! let cascade = CascadeManager::new(document, modality, service);
//! cascade.append_flyout(menu.surface());
//! cascade.append_flyout(submenu.surface()); // anchored inside `menu`
//! cascade.collapse_all();
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use lamina_core::{
    Completion, Direction, Document, ElementId, FocusEvent, Key, KeyEvent, ListenerId, Signal,
};
use lamina_platform::{InputModality, InputType};
use smallvec::SmallVec;

use crate::dismiss::{
    DismissInfo, DismissReason, Dismissable, LightDismissService, LightDismissableLayer,
};

/// Counter for generating unique surface ids
static NEXT_SURFACE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of an overlay surface
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(u64);

impl SurfaceId {
    /// Allocate a fresh id
    pub fn next() -> Self {
        Self(NEXT_SURFACE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// An overlay surface that can take part in a cascade
pub trait CascadeSurface {
    fn surface_id(&self) -> SurfaceId;

    /// Root element of the surface
    fn element(&self) -> ElementId;

    /// Element the surface is currently anchored to
    fn current_anchor(&self) -> Option<ElementId>;

    /// The surface's light dismiss participant
    fn dismissable(&self) -> Rc<dyn Dismissable>;

    /// Begin hiding because the cascade collapsed past this surface
    fn hide_from_cascade(&self);
}

struct StackEntry {
    id: SurfaceId,
    element: ElementId,
    surface: Weak<dyn CascadeSurface>,
    /// Kept so a surface dropped while stacked still leaves the layer
    dismissable: Rc<dyn Dismissable>,
    key_listener: ListenerId,
}

/// Ordered stack of cascading overlay surfaces
pub struct CascadeManager {
    this: Weak<CascadeManager>,
    document: Document,
    modality: Rc<InputModality>,
    layer: Rc<LightDismissableLayer>,
    stack: RefCell<SmallVec<[StackEntry; 4]>>,
    locked: Cell<bool>,
    unlocked: RefCell<Option<Completion>>,
    input_type: Cell<Option<InputType>>,
}

impl CascadeManager {
    pub fn new(
        document: Document,
        modality: Rc<InputModality>,
        service: Rc<dyn LightDismissService>,
    ) -> Rc<Self> {
        Rc::new_cyclic(|this: &Weak<CascadeManager>| {
            let cascade = this.clone();
            let layer = LightDismissableLayer::new(
                service,
                modality.clone(),
                document.clone(),
                move |info| {
                    if let Some(cascade) = cascade.upgrade() {
                        cascade.light_dismiss(info);
                    }
                },
            );
            Self {
                this: this.clone(),
                document,
                modality,
                layer,
                stack: RefCell::new(SmallVec::new()),
                locked: Cell::new(false),
                unlocked: RefCell::new(None),
                input_type: Cell::new(None),
            }
        })
    }

    /// The dismissable layer shared by every surface in the cascade
    pub fn layer(&self) -> &Rc<LightDismissableLayer> {
        &self.layer
    }

    // =========================================================================
    // Stack mutation
    // =========================================================================

    /// Push `surface` onto the cascade
    ///
    /// Surfaces anchored inside a cascade member collapse that member's
    /// descendants first; anything else starts a new cascade.
    pub fn append_flyout(&self, surface: Rc<dyn CascadeSurface>) {
        let id = surface.surface_id();
        if self.index_of(id).is_some() {
            tracing::error!(
                "CascadeManager::append_flyout - surface {:?} is already in the cascade",
                id
            );
            return;
        }
        if self.locked.get() {
            tracing::error!(
                "CascadeManager::append_flyout - surface {:?} appended while collapsing",
                id
            );
        }

        let parent = surface
            .current_anchor()
            .and_then(|anchor| self.index_of_element(anchor));
        match parent {
            Some(index) => {
                if let Some(descendant) = self.id_at(index + 1) {
                    self.collapse_to(descendant);
                }
            }
            None => self.collapse_all(),
        }

        let element = surface.element();
        let cascade = self.this.clone();
        let key_listener = self.document.add_key_down_listener(element, move |event| {
            if let Some(cascade) = cascade.upgrade() {
                cascade.handle_key_down_in_cascade(event);
            }
        });

        let dismissable = surface.dismissable();
        self.stack.borrow_mut().push(StackEntry {
            id,
            element,
            surface: Rc::downgrade(&surface),
            dismissable: dismissable.clone(),
            key_listener,
        });
        tracing::debug!(
            "CascadeManager::append_flyout - {:?} at depth {} (parent {:?})",
            id,
            self.len() - 1,
            parent
        );

        self.layer.shown(dismissable);
    }

    /// Remove `surface` and everything above it, hiding each one
    ///
    /// No-op while another collapse is running or if `surface` is not in the
    /// cascade.
    pub fn collapse_flyout(&self, surface: &Rc<dyn CascadeSurface>) {
        self.collapse_to(surface.surface_id());
    }

    /// Pop entries down to and including `target`
    ///
    /// Entries whose surface was dropped are still popped and leave the
    /// layer, so a dead surface never blocks the rest of the stack.
    fn collapse_to(&self, target: SurfaceId) {
        if self.locked.get() || self.index_of(target).is_none() {
            return;
        }

        let _guard = CollapseGuard::lock(self);
        tracing::debug!("CascadeManager::collapse_flyout - collapsing to {:?}", target);

        loop {
            let Some(entry) = self.stack.borrow_mut().pop() else {
                break;
            };
            self.document.remove_listener(entry.key_listener);

            match entry.surface.upgrade() {
                Some(popped) => popped.hide_from_cascade(),
                None => {
                    tracing::warn!(
                        "CascadeManager::collapse_flyout - surface {:?} dropped while in the cascade",
                        entry.id
                    );
                    self.layer.hidden(&entry.dismissable);
                }
            }

            if entry.id == target {
                break;
            }
        }

        if self.is_empty() {
            self.input_type.set(None);
        }
    }

    /// Collapse the whole cascade
    pub fn collapse_all(&self) {
        if let Some(root) = self.id_at(0) {
            self.collapse_to(root);
        }
    }

    fn light_dismiss(&self, info: &DismissInfo) {
        tracing::debug!("CascadeManager - light dismiss ({:?})", info.reason());
        if info.reason() == DismissReason::Escape {
            if let Some(top) = self.len().checked_sub(1).and_then(|i| self.id_at(i)) {
                self.collapse_to(top);
            }
        } else {
            self.collapse_all();
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn len(&self) -> usize {
        self.stack.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.borrow().is_empty()
    }

    pub fn index_of(&self, id: SurfaceId) -> Option<usize> {
        self.stack.borrow().iter().position(|entry| entry.id == id)
    }

    /// Index of the topmost surface whose element contains `element`
    pub fn index_of_element(&self, element: ElementId) -> Option<usize> {
        let elements: SmallVec<[ElementId; 4]> =
            self.stack.borrow().iter().map(|entry| entry.element).collect();
        elements
            .iter()
            .rposition(|surface| self.document.contains(*surface, element))
    }

    pub fn get_at(&self, index: usize) -> Option<Rc<dyn CascadeSurface>> {
        self.stack
            .borrow()
            .get(index)
            .and_then(|entry| entry.surface.upgrade())
    }

    /// Id of stack entry `index`, live or not
    fn id_at(&self, index: usize) -> Option<SurfaceId> {
        self.stack.borrow().get(index).map(|entry| entry.id)
    }

    /// Surface ids, root first
    pub fn surfaces(&self) -> Vec<SurfaceId> {
        self.stack.borrow().iter().map(|entry| entry.id).collect()
    }

    /// Whether a collapse is running
    pub fn is_locked(&self) -> bool {
        self.locked.get()
    }

    /// Completes when the running collapse finishes; `None` when unlocked
    pub fn unlocked(&self) -> Option<Completion> {
        self.unlocked.borrow().clone()
    }

    /// Input type the cascade is sized for
    ///
    /// Sampled from the input modality the first time it is asked for and
    /// kept until the cascade empties, so every surface of one cascade uses
    /// the same spacing.
    pub fn input_type(&self) -> Option<InputType> {
        if self.input_type.get().is_none() {
            self.input_type.set(self.modality.last_input_type());
        }
        self.input_type.get()
    }

    // =========================================================================
    // Surface notifications
    // =========================================================================

    /// `surface` started its exit transition
    pub fn hiding(&self, surface: &dyn CascadeSurface) {
        self.layer.hiding(&surface.dismissable());
    }

    /// `surface` finished hiding
    pub fn hidden(&self, surface: &dyn CascadeSurface) {
        self.layer.hidden(&surface.dismissable());
    }

    /// Focus landing in stack entry *i* collapses the entries above it
    pub fn handle_focus_into_flyout(&self, event: &FocusEvent) {
        if let Some(index) = self.index_of_element(event.target) {
            if let Some(descendant) = self.id_at(index + 1) {
                self.collapse_to(descendant);
            }
        }
    }

    /// Key handling shared by every surface in the cascade
    ///
    /// The "back" arrow (Left, or Right in right-to-left content) closes the
    /// sub-flyout holding focus; Alt and F10 close the whole cascade.
    pub fn handle_key_down_in_cascade(&self, event: &KeyEvent) {
        let back_key = match self.document.direction(event.target()) {
            Direction::Rtl => Key::Right,
            Direction::Ltr => Key::Left,
        };

        match event.key() {
            key if key == back_key => {
                let Some(index) = self.index_of_element(event.target()) else {
                    return;
                };
                if index >= 1 {
                    if let Some(surface) = self.id_at(index) {
                        self.collapse_to(surface);
                    }
                    event.prevent_default();
                }
            }
            Key::Alt | Key::F10 => self.collapse_all(),
            _ => {}
        }
    }
}

impl std::fmt::Debug for CascadeManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CascadeManager")
            .field("surfaces", &self.surfaces())
            .field("locked", &self.locked.get())
            .field("input_type", &self.input_type.get())
            .finish()
    }
}

/// Holds the reentrancy lock; releasing it completes the `unlocked` signal
struct CollapseGuard<'a> {
    cascade: &'a CascadeManager,
    signal: Signal,
}

impl<'a> CollapseGuard<'a> {
    fn lock(cascade: &'a CascadeManager) -> Self {
        let signal = Signal::new();
        cascade.locked.set(true);
        *cascade.unlocked.borrow_mut() = Some(signal.completion());
        Self { cascade, signal }
    }
}

impl Drop for CollapseGuard<'_> {
    fn drop(&mut self) {
        self.cascade.locked.set(false);
        self.cascade.unlocked.borrow_mut().take();
        self.signal.complete();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dismiss::{DismissService, DismissServiceConfig, LightDismissableElement};
    use lamina_core::{KeyboardEvent, Rect, TaskQueue};
    use lamina_platform::{InputEvent, MouseButton, MouseEvent};

    /// Minimal surface: hides immediately when collapsed
    struct TestSurface {
        id: SurfaceId,
        element: ElementId,
        anchor: Option<ElementId>,
        dismissable: Rc<LightDismissableElement>,
        cascade: Weak<CascadeManager>,
        this: Weak<TestSurface>,
        hides: Cell<usize>,
        /// `unlocked()` as seen from inside the hide
        seen_unlocked: RefCell<Option<Completion>>,
        /// Collapse this surface from inside the hide
        reenter: RefCell<Option<Rc<dyn CascadeSurface>>>,
    }

    impl CascadeSurface for TestSurface {
        fn surface_id(&self) -> SurfaceId {
            self.id
        }

        fn element(&self) -> ElementId {
            self.element
        }

        fn current_anchor(&self) -> Option<ElementId> {
            self.anchor
        }

        fn dismissable(&self) -> Rc<dyn Dismissable> {
            self.dismissable.clone()
        }

        fn hide_from_cascade(&self) {
            self.hides.set(self.hides.get() + 1);
            let Some(cascade) = self.cascade.upgrade() else {
                return;
            };
            let Some(this) = self.this.upgrade() else {
                return;
            };
            let this: Rc<dyn CascadeSurface> = this;
            *self.seen_unlocked.borrow_mut() = cascade.unlocked();

            // Nested collapses are no-ops while locked
            cascade.collapse_flyout(&this);
            let reenter = self.reenter.borrow_mut().take();
            if let Some(other) = reenter {
                cascade.collapse_all();
                assert!(cascade.is_locked());
                cascade.collapse_flyout(&other);
            }
            cascade.hiding(&*this);
            cascade.hidden(&*this);
        }
    }

    struct Fixture {
        doc: Document,
        root: ElementId,
        modality: Rc<InputModality>,
        cascade: Rc<CascadeManager>,
    }

    impl Fixture {
        fn new() -> Self {
            let doc = Document::new();
            let root = doc.create_root(Rect::new(0.0, 0.0, 800.0, 600.0));
            doc.set_focusable(root, true).unwrap();
            let modality = Rc::new(InputModality::new());
            let service =
                DismissService::new(doc.clone(), modality.clone(), DismissServiceConfig::default());
            let cascade = CascadeManager::new(doc.clone(), modality.clone(), service);
            Self {
                doc,
                root,
                modality,
                cascade,
            }
        }

        /// A surface whose element holds one focusable button
        fn surface(&self, anchor: Option<ElementId>) -> (Rc<TestSurface>, ElementId) {
            let element = self.doc.create_child(self.root).unwrap();
            let button = self.doc.create_child(element).unwrap();
            self.doc.set_focusable(element, true).unwrap();
            self.doc.set_focusable(button, true).unwrap();
            let dismissable = Rc::new(LightDismissableElement::new(self.doc.clone(), element, |_| {}));
            let surface = Rc::new_cyclic(|this| TestSurface {
                id: SurfaceId::next(),
                element,
                anchor,
                dismissable,
                cascade: Rc::downgrade(&self.cascade),
                this: this.clone(),
                hides: Cell::new(0),
                seen_unlocked: RefCell::new(None),
                reenter: RefCell::new(None),
            });
            (surface, button)
        }
    }

    fn dyn_surface(surface: &Rc<TestSurface>) -> Rc<dyn CascadeSurface> {
        surface.clone()
    }

    #[test]
    fn test_surface_ids_are_unique() {
        assert_ne!(SurfaceId::next(), SurfaceId::next());
    }

    #[test]
    fn test_stack_ordering_follows_anchors() {
        let fx = Fixture::new();
        let (a, a_button) = fx.surface(Some(fx.root));
        let (b, b_button) = fx.surface(Some(a_button));
        let (c, _) = fx.surface(Some(b_button));

        for surface in [&a, &b, &c] {
            fx.cascade.append_flyout(dyn_surface(surface));
        }
        assert_eq!(fx.cascade.surfaces(), vec![a.id, b.id, c.id]);
        assert_eq!(fx.cascade.index_of_element(b_button), Some(1));
        assert_eq!(fx.cascade.index_of_element(fx.root), None);
        assert_eq!(fx.cascade.layer().len(), 3);
    }

    #[test]
    fn test_sibling_append_prunes_previous_branch() {
        let fx = Fixture::new();
        let (a, a_button) = fx.surface(None);
        let (b, _) = fx.surface(Some(a_button));
        let (c, _) = fx.surface(Some(a_button));

        fx.cascade.append_flyout(dyn_surface(&a));
        fx.cascade.append_flyout(dyn_surface(&b));
        fx.cascade.append_flyout(dyn_surface(&c));

        assert_eq!(fx.cascade.surfaces(), vec![a.id, c.id]);
        assert_eq!(b.hides.get(), 1);
        assert_eq!(a.hides.get(), 0);
    }

    #[test]
    fn test_unrelated_append_resets_cascade() {
        let fx = Fixture::new();
        let (a, a_button) = fx.surface(None);
        let (b, _) = fx.surface(Some(a_button));
        let (d, _) = fx.surface(Some(fx.root));

        fx.cascade.append_flyout(dyn_surface(&a));
        fx.cascade.append_flyout(dyn_surface(&b));
        fx.cascade.append_flyout(dyn_surface(&d));

        assert_eq!(fx.cascade.surfaces(), vec![d.id]);
        assert_eq!(a.hides.get(), 1);
        assert_eq!(b.hides.get(), 1);
    }

    #[test]
    fn test_duplicate_append_is_ignored() {
        let fx = Fixture::new();
        let (a, _) = fx.surface(None);
        fx.cascade.append_flyout(dyn_surface(&a));
        fx.cascade.append_flyout(dyn_surface(&a));
        assert_eq!(fx.cascade.len(), 1);
        assert_eq!(a.hides.get(), 0);
    }

    #[test]
    fn test_reentrant_collapse_is_noop_and_lock_releases() {
        let fx = Fixture::new();
        let (a, a_button) = fx.surface(None);
        let (b, _) = fx.surface(Some(a_button));
        fx.cascade.append_flyout(dyn_surface(&a));
        fx.cascade.append_flyout(dyn_surface(&b));
        *b.reenter.borrow_mut() = Some(dyn_surface(&a));

        fx.cascade.collapse_flyout(&dyn_surface(&b));

        // The nested collapse_all inside b's hide did nothing
        assert_eq!(fx.cascade.surfaces(), vec![a.id]);
        assert_eq!(a.hides.get(), 0);
        assert!(!fx.cascade.is_locked());
        assert!(fx.cascade.unlocked().is_none());
    }

    #[test]
    fn test_unlocked_completion_runs_after_collapse() {
        let fx = Fixture::new();
        let queue = TaskQueue::new();
        let (a, _) = fx.surface(None);
        fx.cascade.append_flyout(dyn_surface(&a));
        assert!(fx.cascade.unlocked().is_none());

        fx.cascade.collapse_all();
        let completion = a.seen_unlocked.borrow().clone().unwrap();
        assert!(completion.is_complete());
        assert!(fx.cascade.is_empty());

        // Continuations are deferred to the queue even after completion
        let seen = Rc::new(Cell::new(false));
        let s = seen.clone();
        completion.then(&queue, move || s.set(true));
        assert!(!seen.get());
        queue.run_until_idle();
        assert!(seen.get());
    }

    #[test]
    fn test_escape_collapses_top_other_reasons_collapse_all() {
        let fx = Fixture::new();
        let (a, a_button) = fx.surface(None);
        let (b, _) = fx.surface(Some(a_button));
        fx.cascade.append_flyout(dyn_surface(&a));
        fx.cascade.append_flyout(dyn_surface(&b));

        fx.cascade.light_dismiss(&DismissInfo::new(DismissReason::Escape, true));
        assert_eq!(fx.cascade.surfaces(), vec![a.id]);

        fx.cascade.append_flyout(dyn_surface(&b));
        fx.cascade.light_dismiss(&DismissInfo::new(DismissReason::Tap, true));
        assert!(fx.cascade.is_empty());
        assert!(fx.cascade.layer().is_empty());
    }

    #[test]
    fn test_focus_into_lower_surface_collapses_above() {
        let fx = Fixture::new();
        let (a, a_button) = fx.surface(None);
        let (b, b_button) = fx.surface(Some(a_button));
        let (c, _) = fx.surface(Some(b_button));
        for surface in [&a, &b, &c] {
            fx.cascade.append_flyout(dyn_surface(surface));
        }

        fx.cascade.handle_focus_into_flyout(&FocusEvent {
            target: a_button,
            related_target: None,
        });
        assert_eq!(fx.cascade.surfaces(), vec![a.id]);
    }

    #[test]
    fn test_left_arrow_closes_focused_subflyout() {
        let fx = Fixture::new();
        let (a, a_button) = fx.surface(None);
        let (b, b_button) = fx.surface(Some(a_button));
        fx.cascade.append_flyout(dyn_surface(&a));
        fx.cascade.append_flyout(dyn_surface(&b));

        // Left inside the root surface does nothing
        let event = fx.doc.dispatch_key_down(a_button, KeyboardEvent::pressed(Key::Left));
        assert!(!event.is_default_prevented());
        assert_eq!(fx.cascade.len(), 2);

        let event = fx.doc.dispatch_key_down(b_button, KeyboardEvent::pressed(Key::Left));
        assert!(event.is_default_prevented());
        assert_eq!(fx.cascade.surfaces(), vec![a.id]);
    }

    #[test]
    fn test_right_arrow_is_back_key_in_rtl() {
        let fx = Fixture::new();
        fx.doc.set_direction(fx.root, Direction::Rtl).unwrap();
        let (a, a_button) = fx.surface(None);
        let (b, b_button) = fx.surface(Some(a_button));
        fx.cascade.append_flyout(dyn_surface(&a));
        fx.cascade.append_flyout(dyn_surface(&b));

        fx.doc.dispatch_key_down(b_button, KeyboardEvent::pressed(Key::Left));
        assert_eq!(fx.cascade.len(), 2);
        fx.doc.dispatch_key_down(b_button, KeyboardEvent::pressed(Key::Right));
        assert_eq!(fx.cascade.len(), 1);
    }

    #[test]
    fn test_alt_and_f10_collapse_everything() {
        let fx = Fixture::new();
        let (a, a_button) = fx.surface(None);
        let (b, b_button) = fx.surface(Some(a_button));
        fx.cascade.append_flyout(dyn_surface(&a));
        fx.cascade.append_flyout(dyn_surface(&b));

        fx.doc.dispatch_key_down(b_button, KeyboardEvent::pressed(Key::F10));
        assert!(fx.cascade.is_empty());

        fx.cascade.append_flyout(dyn_surface(&a));
        fx.doc.dispatch_key_down(a_button, KeyboardEvent::pressed(Key::Alt));
        assert!(fx.cascade.is_empty());
        // Key listeners are detached once surfaces leave the cascade
        assert_eq!(fx.doc.listener_count(), 1);
    }

    #[test]
    fn test_input_type_cached_until_cascade_empties() {
        let fx = Fixture::new();
        let (a, _) = fx.surface(None);
        fx.cascade.append_flyout(dyn_surface(&a));

        fx.modality.observe(&InputEvent::Mouse(MouseEvent::ButtonPressed {
            button: MouseButton::Left,
            x: 0.0,
            y: 0.0,
        }));
        assert_eq!(fx.cascade.input_type(), Some(InputType::Mouse));

        fx.modality
            .observe(&InputEvent::Keyboard(KeyboardEvent::pressed(Key::Tab)));
        assert_eq!(fx.cascade.input_type(), Some(InputType::Mouse));

        fx.cascade.collapse_all();
        assert_eq!(fx.cascade.input_type(), Some(InputType::Keyboard));
    }

    #[test]
    fn test_dropped_surfaces_are_pruned_on_append() {
        let fx = Fixture::new();
        let (a, a_button) = fx.surface(None);
        let (b, _) = fx.surface(Some(a_button));
        let (c, _) = fx.surface(Some(a_button));
        fx.cascade.append_flyout(dyn_surface(&a));
        fx.cascade.append_flyout(dyn_surface(&b));

        // Sibling append still removes the dead sub-surface
        let dead = b.id;
        drop(b);
        fx.cascade.append_flyout(dyn_surface(&c));
        assert_eq!(fx.cascade.surfaces(), vec![a.id, c.id]);
        assert!(fx.cascade.index_of(dead).is_none());
        assert_eq!(fx.cascade.layer().len(), 2);

        // A dead root no longer blocks an unrelated append
        drop(a);
        drop(c);
        let (d, _) = fx.surface(Some(fx.root));
        fx.cascade.append_flyout(dyn_surface(&d));
        assert_eq!(fx.cascade.surfaces(), vec![d.id]);
        assert_eq!(fx.cascade.layer().len(), 1);

        fx.cascade.light_dismiss(&DismissInfo::new(DismissReason::Tap, true));
        assert!(fx.cascade.is_empty());
        assert_eq!(d.hides.get(), 1);
        assert!(fx.cascade.layer().is_empty());
    }

    #[test]
    fn test_collapse_of_absent_surface_is_noop() {
        let fx = Fixture::new();
        let (a, _) = fx.surface(None);
        let (b, _) = fx.surface(None);
        fx.cascade.append_flyout(dyn_surface(&a));
        fx.cascade.collapse_flyout(&dyn_surface(&b));
        assert_eq!(fx.cascade.len(), 1);
        assert!(fx.cascade.unlocked().is_none());
    }
}
