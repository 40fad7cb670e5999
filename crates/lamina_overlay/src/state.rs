//! Overlay open/close state machine
//!
//! Every overlay surface moves through four states:
//!
//! ```text
//!            show                 animation complete
//!  Hidden ----------> Showing ---------------------> Shown
//!    ^                                                 |
//!    |     animation complete               hide       |
//!    +------------------------ Hiding <----------------+
//! ```
//!
//! At most one transition animates at a time. A show or hide requested while
//! a transition is running is remembered as the single [`PendingOp`] and
//! re-issued once the running transition settles; a newer request replaces an
//! older one. Disposal forces the machine back to `Hidden` from any state.

use std::hash::Hash;

// =============================================================================
// Overlay Event Types
// =============================================================================

/// Event types for the overlay state machine
pub mod overlay_events {
    /// Start showing (Hidden -> Showing)
    pub const SHOW: u32 = 30001;
    /// Start hiding (Shown -> Hiding)
    pub const HIDE: u32 = 30002;
    /// Transition finished (Showing -> Shown, Hiding -> Hidden)
    pub const ANIMATION_COMPLETE: u32 = 30003;
    /// Forced teardown (any -> Hidden)
    pub const DISPOSE: u32 = 30004;
}

/// Maps events to state transitions
pub trait StateTransitions: Clone + Copy + PartialEq + Eq + Hash + std::fmt::Debug + 'static {
    /// Handle an event and return the new state, or None if no transition
    fn on_event(&self, event: u32) -> Option<Self>;
}

// =============================================================================
// OverlayState
// =============================================================================

/// Lifecycle state of an overlay surface
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum OverlayState {
    /// Not visible
    #[default]
    Hidden,
    /// Enter animation is playing
    Showing,
    /// Fully visible and interactive
    Shown,
    /// Exit animation is playing
    Hiding,
}

impl OverlayState {
    /// Check if the surface should be rendered
    pub fn is_visible(&self) -> bool {
        !matches!(self, OverlayState::Hidden)
    }

    /// Check if the surface is fully shown
    pub fn is_shown(&self) -> bool {
        matches!(self, OverlayState::Shown)
    }

    pub fn is_hidden(&self) -> bool {
        matches!(self, OverlayState::Hidden)
    }

    /// Check if a transition is running
    pub fn is_animating(&self) -> bool {
        matches!(self, OverlayState::Showing | OverlayState::Hiding)
    }
}

impl StateTransitions for OverlayState {
    fn on_event(&self, event: u32) -> Option<Self> {
        use overlay_events::*;
        use OverlayState::*;

        match (self, event) {
            (Hidden, SHOW) => Some(Showing),
            (Showing, ANIMATION_COMPLETE) => Some(Shown),
            (Shown, HIDE) => Some(Hiding),
            (Hiding, ANIMATION_COMPLETE) => Some(Hidden),

            // Teardown skips the exit animation
            (Showing | Shown | Hiding, DISPOSE) => Some(Hidden),

            _ => None,
        }
    }
}

// =============================================================================
// OverlayMachine
// =============================================================================

/// Operation deferred until the running transition settles
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PendingOp {
    Show,
    Hide,
}

/// What a show/hide request resolved to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestOutcome {
    /// The caller should start the transition now
    Start,
    /// A transition is running; the request was stored as the pending op
    Deferred,
    /// The surface is already in (or heading to) the requested state
    Unchanged,
    /// The surface is disabled; show requests are ignored
    Disabled,
}

/// Lifecycle state plus the single pending operation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OverlayMachine {
    state: OverlayState,
    pending: Option<PendingOp>,
    disabled: bool,
}

impl OverlayMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    pub fn pending(&self) -> Option<PendingOp> {
        self.pending
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// Resolve a show request against the current state
    pub fn request_show(&mut self) -> RequestOutcome {
        if self.disabled {
            return RequestOutcome::Disabled;
        }
        self.request(PendingOp::Show)
    }

    /// Resolve a hide request against the current state
    pub fn request_hide(&mut self) -> RequestOutcome {
        self.request(PendingOp::Hide)
    }

    fn request(&mut self, op: PendingOp) -> RequestOutcome {
        if self.state.is_animating() {
            self.defer(op);
            return RequestOutcome::Deferred;
        }

        match (op, self.state) {
            (PendingOp::Show, OverlayState::Hidden) | (PendingOp::Hide, OverlayState::Shown) => {
                RequestOutcome::Start
            }
            _ => RequestOutcome::Unchanged,
        }
    }

    /// Store `op` as the pending operation, replacing any previous one
    pub fn defer(&mut self, op: PendingOp) {
        if let Some(previous) = self.pending.replace(op) {
            if previous != op {
                tracing::trace!("OverlayMachine - pending {:?} replaced by {:?}", previous, op);
            }
        }
    }

    /// Apply the start of a transition; returns `false` if it is not valid now
    pub fn begin(&mut self, op: PendingOp) -> bool {
        let event = match op {
            PendingOp::Show => overlay_events::SHOW,
            PendingOp::Hide => overlay_events::HIDE,
        };
        self.apply(event)
    }

    /// Finish the running transition and hand back the pending operation
    ///
    /// Returns `None` without consuming anything if no transition is running.
    pub fn settle(&mut self) -> Option<PendingOp> {
        if self.apply(overlay_events::ANIMATION_COMPLETE) {
            self.pending.take()
        } else {
            None
        }
    }

    /// Take the pending operation without settling
    pub fn take_pending(&mut self) -> Option<PendingOp> {
        self.pending.take()
    }

    /// Force the machine back to `Hidden` and drop any pending operation
    pub fn dispose(&mut self) {
        self.apply(overlay_events::DISPOSE);
        self.pending = None;
    }

    fn apply(&mut self, event: u32) -> bool {
        match self.state.on_event(event) {
            Some(next) => {
                tracing::trace!("OverlayMachine - {:?} -> {:?}", self.state, next);
                self.state = next;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_state_transitions() {
        use overlay_events::*;

        let state = OverlayState::Hidden;
        assert!(!state.is_visible());

        let state = state.on_event(SHOW).unwrap();
        assert_eq!(state, OverlayState::Showing);
        assert!(state.is_visible());
        assert!(state.is_animating());

        let state = state.on_event(ANIMATION_COMPLETE).unwrap();
        assert_eq!(state, OverlayState::Shown);
        assert!(state.is_shown());
        assert!(!state.is_animating());

        let state = state.on_event(HIDE).unwrap();
        assert_eq!(state, OverlayState::Hiding);

        let state = state.on_event(ANIMATION_COMPLETE).unwrap();
        assert_eq!(state, OverlayState::Hidden);
    }

    #[test]
    fn test_invalid_transitions_are_rejected() {
        use overlay_events::*;

        assert_eq!(OverlayState::Hidden.on_event(HIDE), None);
        assert_eq!(OverlayState::Hidden.on_event(DISPOSE), None);
        assert_eq!(OverlayState::Shown.on_event(SHOW), None);
        assert_eq!(OverlayState::Showing.on_event(HIDE), None);
        assert_eq!(OverlayState::Shown.on_event(ANIMATION_COMPLETE), None);
    }

    #[test]
    fn test_requests_while_animating_are_deferred() {
        let mut machine = OverlayMachine::new();
        assert_eq!(machine.request_show(), RequestOutcome::Start);
        assert!(machine.begin(PendingOp::Show));

        assert_eq!(machine.request_hide(), RequestOutcome::Deferred);
        assert_eq!(machine.request_show(), RequestOutcome::Deferred);
        assert_eq!(machine.pending(), Some(PendingOp::Show));

        assert_eq!(machine.settle(), Some(PendingOp::Show));
        assert_eq!(machine.state(), OverlayState::Shown);
        assert_eq!(machine.pending(), None);
        assert_eq!(machine.request_show(), RequestOutcome::Unchanged);
    }

    #[test]
    fn test_at_most_one_transition_runs() {
        let mut machine = OverlayMachine::new();
        machine.begin(PendingOp::Show);
        assert!(!machine.begin(PendingOp::Hide));
        assert!(!machine.begin(PendingOp::Show));
        assert_eq!(machine.state(), OverlayState::Showing);
    }

    #[test]
    fn test_settle_without_transition_keeps_pending() {
        let mut machine = OverlayMachine::new();
        machine.defer(PendingOp::Show);
        assert_eq!(machine.settle(), None);
        assert_eq!(machine.take_pending(), Some(PendingOp::Show));
    }

    #[test]
    fn test_disabled_ignores_show_but_not_hide() {
        let mut machine = OverlayMachine::new();
        machine.begin(PendingOp::Show);
        machine.settle();

        machine.set_disabled(true);
        assert_eq!(machine.request_hide(), RequestOutcome::Start);
        machine.begin(PendingOp::Hide);
        machine.settle();
        assert_eq!(machine.request_show(), RequestOutcome::Disabled);
    }

    #[test]
    fn test_dispose_forces_hidden_from_any_state() {
        let mut machine = OverlayMachine::new();
        machine.begin(PendingOp::Show);
        machine.defer(PendingOp::Hide);

        machine.dispose();
        assert_eq!(machine.state(), OverlayState::Hidden);
        assert_eq!(machine.pending(), None);
        assert_eq!(machine.settle(), None);
    }
}
