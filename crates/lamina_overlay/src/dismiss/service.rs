//! Default light dismiss service
//!
//! Keeps the ordered participant stack, hands out contiguous z-index ranges
//! starting at [`DismissServiceConfig::base_z_index`], activates the topmost
//! participant when it changes, and turns host input (pointer presses outside
//! every participant, Escape, focus moving away, window changes) into
//! dismissals delivered top-down.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use lamina_core::{Document, ElementId, FocusEvent, Key, KeyEvent, ListenerId};
use lamina_platform::InputModality;

use super::{participant_key, DismissInfo, DismissReason, Dismissable, LightDismissService};

/// Dismiss service configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DismissServiceConfig {
    /// z-index given to the bottom participant
    pub base_z_index: i32,
}

impl Default for DismissServiceConfig {
    fn default() -> Self {
        Self { base_z_index: 1000 }
    }
}

impl DismissServiceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_z_index(mut self, z_index: i32) -> Self {
        self.base_z_index = z_index;
        self
    }
}

/// Stack of shown participants keyed by identity, bottom first
pub struct DismissService {
    config: DismissServiceConfig,
    document: Document,
    modality: Rc<InputModality>,
    participants: RefCell<IndexMap<usize, Rc<dyn Dismissable>>>,
    /// Participant last activated as topmost
    active: Cell<Option<usize>>,
    focus_observer: Cell<Option<ListenerId>>,
}

impl DismissService {
    /// Create the service and start observing document focus
    pub fn new(
        document: Document,
        modality: Rc<InputModality>,
        config: DismissServiceConfig,
    ) -> Rc<Self> {
        let service = Rc::new(Self {
            config,
            document: document.clone(),
            modality,
            participants: RefCell::new(IndexMap::new()),
            active: Cell::new(None),
            focus_observer: Cell::new(None),
        });

        let weak: Weak<Self> = Rc::downgrade(&service);
        let observer = document.add_focus_observer(move |event| {
            if let Some(service) = weak.upgrade() {
                service.focus_changed(event);
            }
        });
        service.focus_observer.set(Some(observer));
        service
    }

    pub fn config(&self) -> DismissServiceConfig {
        self.config
    }

    pub fn len(&self) -> usize {
        self.participants.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.borrow().is_empty()
    }

    pub fn topmost(&self) -> Option<Rc<dyn Dismissable>> {
        self.participants.borrow().last().map(|(_, p)| p.clone())
    }

    // =========================================================================
    // Host input
    // =========================================================================

    /// Escape dismisses; returns `true` if the key was consumed
    pub fn key_down(&self, event: &KeyEvent) -> bool {
        if event.key() != Key::Escape || self.is_empty() {
            return false;
        }
        event.prevent_default();
        self.dispatch(DismissReason::Escape, self.snapshot());
        true
    }

    /// A pointer pressed on `target` (`None` for the window background)
    ///
    /// Presses outside every participant dismiss all of them; presses inside
    /// a participant dismiss only the participants above it.
    pub fn pointer_down(&self, target: Option<ElementId>) -> bool {
        let participants = self.snapshot();
        let hit = target.and_then(|t| participants.iter().rposition(|p| p.contains_element(t)));
        let above = match hit {
            Some(index) => participants[index + 1..].to_vec(),
            None => participants,
        };
        if above.is_empty() {
            return false;
        }
        self.dispatch(DismissReason::Tap, above);
        true
    }

    /// Focus moved inside the document
    pub fn focus_changed(&self, event: &FocusEvent) {
        let participants = self.snapshot();
        let hit = participants
            .iter()
            .rposition(|p| p.contains_element(event.target));

        let above = match hit {
            Some(index) => {
                participants[index].on_focus(event.target);
                participants[index + 1..].to_vec()
            }
            None => participants,
        };
        if !above.is_empty() {
            self.dispatch(DismissReason::LostFocus, above);
        }
    }

    pub fn window_resized(&self) -> bool {
        self.dispatch_all(DismissReason::WindowResize)
    }

    pub fn window_blurred(&self) -> bool {
        self.dispatch_all(DismissReason::WindowBlur)
    }

    /// Hardware/system back; returns `true` if a participant was shown
    pub fn back_requested(&self) -> bool {
        self.dispatch_all(DismissReason::HardwareBackButton)
    }

    fn dispatch_all(&self, reason: DismissReason) -> bool {
        let participants = self.snapshot();
        if participants.is_empty() {
            return false;
        }
        self.dispatch(reason, participants);
        true
    }

    /// Offer a dismissal to `participants` from the top down
    fn dispatch(&self, reason: DismissReason, participants: Vec<Rc<dyn Dismissable>>) {
        let topmost = self.topmost().map(|p| participant_key(&p));
        tracing::debug!(
            "DismissService::dispatch - {:?} to {} participant(s)",
            reason,
            participants.len()
        );

        for participant in participants.iter().rev() {
            let info = DismissInfo::new(reason, topmost == Some(participant_key(participant)));
            if participant.on_should_light_dismiss(&info) {
                participant.on_light_dismiss(&info);
            }
            if info.is_propagation_stopped() {
                break;
            }
        }
    }

    // =========================================================================
    // Stack maintenance
    // =========================================================================

    fn snapshot(&self) -> Vec<Rc<dyn Dismissable>> {
        self.participants.borrow().values().cloned().collect()
    }

    fn update_z_indices(&self) {
        let mut z_index = self.config.base_z_index;
        for participant in self.snapshot() {
            participant.set_z_index(Some(z_index));
            z_index += participant.z_index_count().max(1);
        }
    }

    fn activate_topmost_if_changed(&self) {
        let topmost = self.topmost();
        let key = topmost.as_ref().map(participant_key);
        if self.active.replace(key) == key {
            return;
        }
        if let Some(participant) = topmost {
            tracing::trace!("DismissService - activating new topmost participant");
            participant.on_activate(!self.modality.keyboard_seen_last());
        }
    }
}

impl LightDismissService for DismissService {
    fn shown(&self, participant: Rc<dyn Dismissable>) {
        let key = participant_key(&participant);
        {
            let mut participants = self.participants.borrow_mut();
            if participants.contains_key(&key) {
                tracing::warn!("DismissService::shown - participant already shown");
                return;
            }
            participants.insert(key, participant);
        }
        self.update_z_indices();
        self.activate_topmost_if_changed();
    }

    fn updated(&self, participant: &Rc<dyn Dismissable>) {
        if self.is_shown(participant) {
            self.update_z_indices();
        }
    }

    fn hidden(&self, participant: &Rc<dyn Dismissable>) {
        let removed = self
            .participants
            .borrow_mut()
            .shift_remove(&participant_key(participant));
        let Some(removed) = removed else {
            return;
        };
        removed.set_z_index(None);
        self.update_z_indices();
        self.activate_topmost_if_changed();
    }

    fn is_shown(&self, participant: &Rc<dyn Dismissable>) -> bool {
        self.participants
            .borrow()
            .contains_key(&participant_key(participant))
    }

    fn is_topmost(&self, participant: &Rc<dyn Dismissable>) -> bool {
        self.participants
            .borrow()
            .last()
            .is_some_and(|(key, _)| *key == participant_key(participant))
    }
}

impl Drop for DismissService {
    fn drop(&mut self) {
        if let Some(observer) = self.focus_observer.take() {
            self.document.remove_listener(observer);
        }
    }
}

impl std::fmt::Debug for DismissService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DismissService")
            .field("config", &self.config)
            .field("participants", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dismiss::{DismissalPolicy, LightDismissableElement};
    use lamina_core::{KeyboardEvent, Rect};

    struct Fixture {
        doc: Document,
        root: ElementId,
        service: Rc<DismissService>,
        dismissed: Rc<RefCell<Vec<(ElementId, DismissReason)>>>,
    }

    impl Fixture {
        fn new() -> Self {
            let doc = Document::new();
            let root = doc.create_root(Rect::new(0.0, 0.0, 800.0, 600.0));
            doc.set_focusable(root, true).unwrap();
            let service = DismissService::new(
                doc.clone(),
                Rc::new(InputModality::new()),
                DismissServiceConfig::default(),
            );
            Self {
                doc,
                root,
                service,
                dismissed: Rc::new(RefCell::new(Vec::new())),
            }
        }

        fn participant(&self, policy: DismissalPolicy) -> (ElementId, Rc<dyn Dismissable>) {
            let el = self.doc.create_child(self.root).unwrap();
            self.doc.set_focusable(el, true).unwrap();
            let dismissed = self.dismissed.clone();
            let service = Rc::downgrade(&self.service);
            let this: Rc<RefCell<Option<Weak<dyn Dismissable>>>> = Rc::new(RefCell::new(None));
            let me = this.clone();
            let participant: Rc<dyn Dismissable> = Rc::new(
                LightDismissableElement::new(self.doc.clone(), el, move |info| {
                    dismissed.borrow_mut().push((el, info.reason()));
                    let me = me.borrow().as_ref().and_then(Weak::upgrade);
                    if let (Some(service), Some(me)) = (service.upgrade(), me) {
                        service.hidden(&me);
                    }
                })
                .policy(policy),
            );
            *this.borrow_mut() = Some(Rc::downgrade(&participant));
            (el, participant)
        }

        fn dismissed(&self) -> Vec<(ElementId, DismissReason)> {
            self.dismissed.borrow().clone()
        }
    }

    #[test]
    fn test_topmost_follows_stack_order() {
        let fx = Fixture::new();
        let (_, a) = fx.participant(DismissalPolicy::Light);
        let (_, b) = fx.participant(DismissalPolicy::Light);
        fx.service.shown(a.clone());
        fx.service.shown(b.clone());

        assert!(fx.service.is_topmost(&b));
        assert!(!fx.service.is_topmost(&a));

        fx.service.hidden(&a);
        assert!(fx.service.is_topmost(&b));
        assert_eq!(fx.service.len(), 1);
    }

    #[test]
    fn test_shown_activates_new_topmost() {
        let fx = Fixture::new();
        let (a_el, a) = fx.participant(DismissalPolicy::Light);
        let (b_el, b) = fx.participant(DismissalPolicy::Light);

        fx.service.shown(a.clone());
        assert_eq!(fx.doc.focused(), Some(a_el));
        fx.service.shown(b.clone());
        assert_eq!(fx.doc.focused(), Some(b_el));

        fx.service.hidden(&b);
        assert_eq!(fx.doc.focused(), Some(a_el));
    }

    #[test]
    fn test_pointer_outside_dismisses_topmost() {
        let fx = Fixture::new();
        let (_, a) = fx.participant(DismissalPolicy::Light);
        let (b_el, b) = fx.participant(DismissalPolicy::Light);
        fx.service.shown(a);
        fx.service.shown(b);

        assert!(fx.service.pointer_down(None));
        // Lower participants see an inactive tap and stop it
        assert_eq!(fx.dismissed(), vec![(b_el, DismissReason::Tap)]);
        assert_eq!(fx.service.len(), 1);
    }

    #[test]
    fn test_pointer_inside_dismisses_only_participants_above() {
        let fx = Fixture::new();
        let (a_el, a) = fx.participant(DismissalPolicy::Light);
        let (b_el, b) = fx.participant(DismissalPolicy::Light);
        fx.service.shown(a);
        fx.service.shown(b);

        assert!(!fx.service.pointer_down(Some(b_el)));
        assert!(fx.dismissed().is_empty());

        assert!(fx.service.pointer_down(Some(a_el)));
        assert_eq!(fx.dismissed(), vec![(b_el, DismissReason::Tap)]);
    }

    #[test]
    fn test_focus_leaving_dismisses_all_participants() {
        let fx = Fixture::new();
        let (a_el, a) = fx.participant(DismissalPolicy::Light);
        let (b_el, b) = fx.participant(DismissalPolicy::Light);
        fx.service.shown(a);
        fx.service.shown(b);

        fx.doc.focus(fx.root);
        assert_eq!(
            fx.dismissed(),
            vec![(b_el, DismissReason::LostFocus), (a_el, DismissReason::LostFocus)]
        );
        assert!(fx.service.is_empty());
    }

    #[test]
    fn test_escape_reaches_topmost_only() {
        let fx = Fixture::new();
        let (_, a) = fx.participant(DismissalPolicy::Light);
        let (b_el, b) = fx.participant(DismissalPolicy::Light);
        fx.service.shown(a);
        fx.service.shown(b);

        let event = KeyEvent::new(b_el, KeyboardEvent::pressed(Key::Escape));
        assert!(fx.service.key_down(&event));
        assert!(event.is_default_prevented());
        assert_eq!(fx.dismissed(), vec![(b_el, DismissReason::Escape)]);

        let other = KeyEvent::new(b_el, KeyboardEvent::pressed(Key::Enter));
        assert!(!fx.service.key_down(&other));
    }

    #[test]
    fn test_sticky_participant_shields_lower_ones() {
        let fx = Fixture::new();
        let (_, a) = fx.participant(DismissalPolicy::Light);
        let (_, sticky) = fx.participant(DismissalPolicy::Sticky);
        fx.service.shown(a);
        fx.service.shown(sticky);

        assert!(fx.service.window_resized());
        assert!(fx.dismissed().is_empty());
        assert_eq!(fx.service.len(), 2);
    }

    #[test]
    fn test_window_events_without_participants_are_ignored() {
        let fx = Fixture::new();
        assert!(!fx.service.window_blurred());
        assert!(!fx.service.back_requested());
        assert!(!fx.service.pointer_down(None));
    }

    #[test]
    fn test_drop_removes_focus_observer() {
        let fx = Fixture::new();
        assert_eq!(fx.doc.listener_count(), 1);
        drop(fx.service);
        assert_eq!(fx.doc.listener_count(), 0);
    }
}
