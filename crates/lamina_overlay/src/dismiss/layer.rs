//! Dismissable layer
//!
//! A cascade of flyouts must behave like a single participant of the light
//! dismiss service: one z-index range, one focus owner, one dismissal
//! decision. [`LightDismissableLayer`] collects the individual surfaces as
//! clients and presents them to the service as one [`Dismissable`].
//!
//! Clients are ordered bottom to top. A client that has started hiding stays
//! registered (it still occupies its z-index until its exit animation ends)
//! but is no longer focusable.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use lamina_core::{Document, ElementId};
use lamina_platform::InputModality;

use super::{
    same_participant, DismissInfo, Dismissable, DismissalPolicy, LightDismissService,
};

struct LayerClient {
    client: Rc<dyn Dismissable>,
    focusable: bool,
}

/// Multiplexes many dismissable clients into one service participant
pub struct LightDismissableLayer {
    this: Weak<LightDismissableLayer>,
    service: Rc<dyn LightDismissService>,
    modality: Rc<InputModality>,
    document: Document,
    clients: RefCell<Vec<LayerClient>>,
    currently_focused: RefCell<Option<Weak<dyn Dismissable>>>,
    on_light_dismiss: Box<dyn Fn(&DismissInfo)>,
}

impl LightDismissableLayer {
    /// Create a layer; `on_light_dismiss` runs when the service dismisses it
    pub fn new<F>(
        service: Rc<dyn LightDismissService>,
        modality: Rc<InputModality>,
        document: Document,
        on_light_dismiss: F,
    ) -> Rc<Self>
    where
        F: Fn(&DismissInfo) + 'static,
    {
        Rc::new_cyclic(|this| Self {
            this: this.clone(),
            service,
            modality,
            document,
            clients: RefCell::new(Vec::new()),
            currently_focused: RefCell::new(None),
            on_light_dismiss: Box::new(on_light_dismiss),
        })
    }

    // =========================================================================
    // Client lifecycle
    // =========================================================================

    /// A client became visible (or was re-shown)
    pub fn shown(&self, client: Rc<dyn Dismissable>) {
        {
            let mut clients = self.clients.borrow_mut();
            match clients.iter_mut().find(|c| same_participant(&c.client, &client)) {
                Some(entry) => entry.focusable = true,
                None => clients.push(LayerClient {
                    client,
                    focusable: true,
                }),
            }
        }

        let Some(participant) = self.participant() else {
            return;
        };
        if !self.service.is_shown(&participant) {
            tracing::debug!("LightDismissableLayer::shown - registering with service");
            self.service.shown(participant);
        } else {
            self.service.updated(&participant);
            self.activate_top_focusable_client_if_needed();
        }
    }

    /// A client started its exit transition
    pub fn hiding(&self, client: &Rc<dyn Dismissable>) {
        let found = {
            let mut clients = self.clients.borrow_mut();
            match clients.iter_mut().find(|c| same_participant(&c.client, client)) {
                Some(entry) => {
                    entry.focusable = false;
                    true
                }
                None => false,
            }
        };

        if found {
            self.activate_top_focusable_client_if_needed();
        }
    }

    /// A client finished hiding
    pub fn hidden(&self, client: &Rc<dyn Dismissable>) {
        let removed = {
            let mut clients = self.clients.borrow_mut();
            clients
                .iter()
                .position(|c| same_participant(&c.client, client))
                .map(|index| clients.remove(index))
        };
        let Some(removed) = removed else {
            return;
        };

        removed.client.set_z_index(None);
        removed.client.on_hide();

        let Some(participant) = self.participant() else {
            return;
        };
        if self.is_empty() {
            tracing::debug!("LightDismissableLayer::hidden - last client gone");
            self.service.hidden(&participant);
        } else {
            self.service.updated(&participant);
            self.activate_top_focusable_client_if_needed();
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn len(&self) -> usize {
        self.clients.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.borrow().is_empty()
    }

    pub fn contains_client(&self, client: &Rc<dyn Dismissable>) -> bool {
        self.clients
            .borrow()
            .iter()
            .any(|c| same_participant(&c.client, client))
    }

    /// Whether a registered client is focusable; `None` if not registered
    pub fn is_focusable(&self, client: &Rc<dyn Dismissable>) -> Option<bool> {
        self.clients
            .borrow()
            .iter()
            .find(|c| same_participant(&c.client, client))
            .map(|c| c.focusable)
    }

    /// Topmost client containing `element`
    pub fn client_for_element(&self, element: ElementId) -> Option<Rc<dyn Dismissable>> {
        self.snapshot()
            .into_iter()
            .rev()
            .find(|(client, _)| client.contains_element(element))
            .map(|(client, _)| client)
    }

    /// Topmost focusable client containing `element`
    pub fn focusable_client_for_element(&self, element: ElementId) -> Option<Rc<dyn Dismissable>> {
        self.snapshot()
            .into_iter()
            .rev()
            .find(|(client, focusable)| *focusable && client.contains_element(element))
            .map(|(client, _)| client)
    }

    pub fn topmost_focusable_client(&self) -> Option<Rc<dyn Dismissable>> {
        self.clients
            .borrow()
            .iter()
            .rev()
            .find(|c| c.focusable)
            .map(|c| c.client.clone())
    }

    /// The client that last received focus, if it is still registered
    pub fn currently_focused(&self) -> Option<Rc<dyn Dismissable>> {
        let client = self
            .currently_focused
            .borrow()
            .as_ref()
            .and_then(Weak::upgrade)?;
        self.contains_client(&client).then_some(client)
    }

    fn set_currently_focused(&self, client: Option<&Rc<dyn Dismissable>>) {
        *self.currently_focused.borrow_mut() = client.map(Rc::downgrade);
    }

    fn participant(&self) -> Option<Rc<dyn Dismissable>> {
        let layer: Rc<dyn Dismissable> = self.this.upgrade()?;
        Some(layer)
    }

    fn snapshot(&self) -> Vec<(Rc<dyn Dismissable>, bool)> {
        self.clients
            .borrow()
            .iter()
            .map(|c| (c.client.clone(), c.focusable))
            .collect()
    }

    fn activate_top_focusable_client_if_needed(&self) {
        let Some(top) = self.topmost_focusable_client() else {
            return;
        };
        let Some(participant) = self.participant() else {
            return;
        };
        if self.service.is_topmost(&participant) {
            top.on_activate(!self.modality.keyboard_seen_last());
        }
    }
}

impl Dismissable for LightDismissableLayer {
    fn set_z_index(&self, z_index: Option<i32>) {
        for (index, (client, _)) in self.snapshot().into_iter().enumerate() {
            client.set_z_index(z_index.map(|base| base + index as i32));
        }
    }

    fn z_index_count(&self) -> i32 {
        self.len() as i32
    }

    fn contains_element(&self, element: ElementId) -> bool {
        self.client_for_element(element).is_some()
    }

    fn on_activate(&self, use_set_active: bool) {
        let from_focus = self
            .document
            .focused()
            .and_then(|focused| self.focusable_client_for_element(focused));
        let previous = self
            .currently_focused()
            .filter(|c| self.is_focusable(c) == Some(true));

        let Some(client) = from_focus
            .or(previous)
            .or_else(|| self.topmost_focusable_client())
        else {
            return;
        };

        self.set_currently_focused(Some(&client));
        client.on_activate(use_set_active);
    }

    fn on_focus(&self, element: ElementId) {
        let client = self.client_for_element(element);
        self.set_currently_focused(client.as_ref());
        if let Some(client) = client {
            client.on_focus(element);
        }
    }

    fn on_hide(&self) {
        self.set_currently_focused(None);
    }

    fn on_should_light_dismiss(&self, info: &DismissInfo) -> bool {
        DismissalPolicy::Light.should_dismiss(info)
    }

    fn on_light_dismiss(&self, info: &DismissInfo) {
        (self.on_light_dismiss)(info);
    }
}

impl std::fmt::Debug for LightDismissableLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LightDismissableLayer")
            .field("clients", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dismiss::{participant_key, DismissReason, LightDismissableElement};
    use lamina_core::Rect;
    use std::cell::Cell;

    /// Records service calls; topmost-ness is controlled by the test
    #[derive(Default)]
    struct RecordingService {
        calls: RefCell<Vec<&'static str>>,
        shown: RefCell<Vec<usize>>,
        topmost: Cell<bool>,
    }

    impl LightDismissService for RecordingService {
        fn shown(&self, participant: Rc<dyn Dismissable>) {
            self.calls.borrow_mut().push("shown");
            self.shown.borrow_mut().push(participant_key(&participant));
        }

        fn updated(&self, _participant: &Rc<dyn Dismissable>) {
            self.calls.borrow_mut().push("updated");
        }

        fn hidden(&self, participant: &Rc<dyn Dismissable>) {
            self.calls.borrow_mut().push("hidden");
            let key = participant_key(participant);
            self.shown.borrow_mut().retain(|k| *k != key);
        }

        fn is_shown(&self, participant: &Rc<dyn Dismissable>) -> bool {
            self.shown.borrow().contains(&participant_key(participant))
        }

        fn is_topmost(&self, _participant: &Rc<dyn Dismissable>) -> bool {
            self.topmost.get()
        }
    }

    struct Fixture {
        doc: Document,
        service: Rc<RecordingService>,
        layer: Rc<LightDismissableLayer>,
        dismissed: Rc<Cell<Option<DismissReason>>>,
        root: ElementId,
    }

    impl Fixture {
        fn new() -> Self {
            let doc = Document::new();
            let root = doc.create_root(Rect::new(0.0, 0.0, 800.0, 600.0));
            let service = Rc::new(RecordingService::default());
            service.topmost.set(true);
            let dismissed = Rc::new(Cell::new(None));
            let d = dismissed.clone();
            let layer = LightDismissableLayer::new(
                service.clone(),
                Rc::new(InputModality::new()),
                doc.clone(),
                move |info| d.set(Some(info.reason())),
            );
            Self {
                doc,
                service,
                layer,
                dismissed,
                root,
            }
        }

        fn client(&self) -> (ElementId, Rc<LightDismissableElement>) {
            let el = self.doc.create_child(self.root).unwrap();
            self.doc.set_focusable(el, true).unwrap();
            let client = Rc::new(LightDismissableElement::new(self.doc.clone(), el, |_| {}));
            (el, client)
        }
    }

    fn dyn_client(client: &Rc<LightDismissableElement>) -> Rc<dyn Dismissable> {
        client.clone()
    }

    #[test]
    fn test_first_client_registers_layer_with_service() {
        let fx = Fixture::new();
        let (_, a) = fx.client();
        let (_, b) = fx.client();

        fx.layer.shown(dyn_client(&a));
        fx.layer.shown(dyn_client(&b));
        assert_eq!(*fx.service.calls.borrow(), vec!["shown", "updated"]);
        assert_eq!(fx.layer.len(), 2);

        fx.layer.shown(dyn_client(&b));
        assert_eq!(fx.layer.len(), 2);
    }

    #[test]
    fn test_last_hidden_client_unregisters_layer() {
        let fx = Fixture::new();
        let (_, a) = fx.client();
        let (_, b) = fx.client();
        fx.layer.shown(dyn_client(&a));
        fx.layer.shown(dyn_client(&b));
        fx.layer.set_z_index(Some(1000));

        fx.layer.hidden(&dyn_client(&b));
        assert_eq!(b.z_index(), None);
        assert_eq!(fx.service.calls.borrow().last(), Some(&"updated"));

        fx.layer.hidden(&dyn_client(&a));
        assert_eq!(fx.service.calls.borrow().last(), Some(&"hidden"));
        assert!(fx.layer.is_empty());

        // Unknown clients are ignored
        fx.layer.hidden(&dyn_client(&a));
        assert_eq!(
            *fx.service.calls.borrow(),
            vec!["shown", "updated", "updated", "hidden"]
        );
    }

    #[test]
    fn test_z_indices_are_contiguous() {
        let fx = Fixture::new();
        let (_, a) = fx.client();
        let (_, b) = fx.client();
        let (_, c) = fx.client();
        for client in [&a, &b, &c] {
            fx.layer.shown(dyn_client(client));
        }

        fx.layer.set_z_index(Some(1000));
        assert_eq!(fx.layer.z_index_count(), 3);
        assert_eq!(a.z_index(), Some(1000));
        assert_eq!(b.z_index(), Some(1001));
        assert_eq!(c.z_index(), Some(1002));
    }

    #[test]
    fn test_hiding_client_loses_focusability() {
        let fx = Fixture::new();
        let (a_el, a) = fx.client();
        let (b_el, b) = fx.client();
        fx.layer.shown(dyn_client(&a));
        fx.layer.shown(dyn_client(&b));
        assert_eq!(fx.doc.focused(), Some(b_el));

        fx.layer.hiding(&dyn_client(&b));
        assert_eq!(fx.layer.is_focusable(&dyn_client(&b)), Some(false));
        assert!(fx.layer.contains_element(b_el));
        assert!(fx.layer.focusable_client_for_element(b_el).is_none());
        assert_eq!(fx.doc.focused(), Some(a_el));
    }

    #[test]
    fn test_no_activation_unless_layer_is_topmost() {
        let fx = Fixture::new();
        fx.service.topmost.set(false);
        let (_, a) = fx.client();
        let (_, b) = fx.client();
        fx.layer.shown(dyn_client(&a));
        fx.layer.shown(dyn_client(&b));
        assert_eq!(fx.doc.focused(), None);
    }

    #[test]
    fn test_activation_prefers_client_holding_focus() {
        let fx = Fixture::new();
        let (a_el, a) = fx.client();
        let (_, b) = fx.client();
        fx.service.topmost.set(false);
        fx.layer.shown(dyn_client(&a));
        fx.layer.shown(dyn_client(&b));

        fx.doc.focus(a_el);
        fx.layer.on_activate(true);
        assert_eq!(fx.doc.focused(), Some(a_el));
        assert!(fx
            .layer
            .currently_focused()
            .is_some_and(|c| same_participant(&c, &dyn_client(&a))));
    }

    #[test]
    fn test_activation_falls_back_to_previous_then_topmost() {
        let fx = Fixture::new();
        let (a_el, a) = fx.client();
        let (b_el, b) = fx.client();
        fx.service.topmost.set(false);
        fx.layer.shown(dyn_client(&a));
        fx.layer.shown(dyn_client(&b));

        // Previously focused client wins when focus is elsewhere
        fx.layer.on_focus(a_el);
        fx.doc.blur();
        fx.layer.on_activate(true);
        assert_eq!(fx.doc.focused(), Some(a_el));

        // Once it stops being focusable the topmost focusable client wins
        fx.layer.hiding(&dyn_client(&a));
        fx.doc.blur();
        fx.layer.on_activate(true);
        assert_eq!(fx.doc.focused(), Some(b_el));
    }

    #[test]
    fn test_on_hide_clears_focused_client() {
        let fx = Fixture::new();
        let (a_el, a) = fx.client();
        fx.layer.shown(dyn_client(&a));
        fx.layer.on_focus(a_el);
        assert!(fx.layer.currently_focused().is_some());

        fx.layer.on_hide();
        assert!(fx.layer.currently_focused().is_none());
    }

    #[test]
    fn test_light_dismiss_delegates_to_owner() {
        let fx = Fixture::new();
        let info = DismissInfo::new(DismissReason::Escape, true);
        assert!(fx.layer.on_should_light_dismiss(&info));
        fx.layer.on_light_dismiss(&info);
        assert_eq!(fx.dismissed.get(), Some(DismissReason::Escape));
    }
}
