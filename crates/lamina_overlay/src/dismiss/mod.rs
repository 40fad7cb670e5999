//! Light dismissal
//!
//! "Light dismiss" is the convention that transient UI goes away when the user
//! clicks elsewhere, presses Escape, or moves focus out of it. A
//! [`LightDismissService`] keeps a stack of [`Dismissable`] participants,
//! assigns them z-indices, hands focus to the topmost one, and asks them in
//! top-down order whether they want to be dismissed.
//!
//! - [`LightDismissableElement`] adapts a single surface to the protocol.
//! - [`LightDismissableLayer`] multiplexes many surfaces (a cascade of
//!   flyouts) into one participant.
//! - [`DismissService`] is the default service implementation.

mod element;
mod layer;
mod service;

use std::cell::Cell;
use std::rc::Rc;

use lamina_core::ElementId;

pub use element::LightDismissableElement;
pub use layer::LightDismissableLayer;
pub use service::{DismissService, DismissServiceConfig};

/// Why a light dismissal was triggered
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DismissReason {
    /// Pointer pressed outside every participant
    Tap,
    /// Focus moved outside every participant
    LostFocus,
    Escape,
    HardwareBackButton,
    WindowResize,
    WindowBlur,
}

/// Details handed to participants while a dismissal propagates
#[derive(Debug)]
pub struct DismissInfo {
    reason: DismissReason,
    active: bool,
    propagation_stopped: Cell<bool>,
}

impl DismissInfo {
    pub fn new(reason: DismissReason, active: bool) -> Self {
        Self {
            reason,
            active,
            propagation_stopped: Cell::new(false),
        }
    }

    pub fn reason(&self) -> DismissReason {
        self.reason
    }

    /// Whether the participant being asked is the topmost one
    pub fn active(&self) -> bool {
        self.active
    }

    /// Keep the dismissal from reaching participants further down
    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }
}

/// Decides whether a participant accepts a dismissal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum DismissalPolicy {
    /// Dismissed by every reason; taps and Escape only reach the topmost
    #[default]
    Light,
    /// Only Escape and the back button dismiss, and only when topmost
    Modal,
    /// Never dismissed and blocks participants below
    Sticky,
}

impl DismissalPolicy {
    pub fn should_dismiss(self, info: &DismissInfo) -> bool {
        match self {
            DismissalPolicy::Light => match info.reason() {
                DismissReason::Tap | DismissReason::Escape | DismissReason::HardwareBackButton => {
                    if info.active() {
                        true
                    } else {
                        info.stop_propagation();
                        false
                    }
                }
                DismissReason::LostFocus
                | DismissReason::WindowResize
                | DismissReason::WindowBlur => true,
            },
            DismissalPolicy::Modal => {
                info.stop_propagation();
                match info.reason() {
                    DismissReason::Escape | DismissReason::HardwareBackButton => info.active(),
                    _ => false,
                }
            }
            DismissalPolicy::Sticky => {
                info.stop_propagation();
                false
            }
        }
    }
}

/// A participant in light dismissal
pub trait Dismissable {
    /// Assign the base z-index; `None` clears it
    fn set_z_index(&self, z_index: Option<i32>);

    /// Number of consecutive z-indices this participant occupies
    fn z_index_count(&self) -> i32;

    fn contains_element(&self, element: ElementId) -> bool;

    /// Take focus; `use_set_active` asks for focus without a visible focus rect
    fn on_activate(&self, use_set_active: bool);

    /// Focus landed on `element` inside this participant
    fn on_focus(&self, element: ElementId);

    fn on_hide(&self);

    fn on_should_light_dismiss(&self, info: &DismissInfo) -> bool;

    fn on_light_dismiss(&self, info: &DismissInfo);
}

/// Stack of dismissable participants
pub trait LightDismissService {
    fn shown(&self, participant: Rc<dyn Dismissable>);

    /// The participant's z-index footprint or content changed
    fn updated(&self, participant: &Rc<dyn Dismissable>);

    fn hidden(&self, participant: &Rc<dyn Dismissable>);

    fn is_shown(&self, participant: &Rc<dyn Dismissable>) -> bool;

    fn is_topmost(&self, participant: &Rc<dyn Dismissable>) -> bool;
}

/// Identity of a participant, independent of the trait object's vtable
pub(crate) fn participant_key(participant: &Rc<dyn Dismissable>) -> usize {
    Rc::as_ptr(participant) as *const () as usize
}

pub(crate) fn same_participant(a: &Rc<dyn Dismissable>, b: &Rc<dyn Dismissable>) -> bool {
    participant_key(a) == participant_key(b)
}
