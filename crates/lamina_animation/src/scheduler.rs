//! Animation playback
//!
//! Overlays do not render anything themselves; they ask an [`Animator`] to play
//! a transition on an element and wait on the returned [`Completion`]. The
//! default [`TimedAnimator`] tracks each running transition and completes it
//! after its duration has elapsed on the [`TaskQueue`] clock.

use std::cell::RefCell;
use std::rc::Rc;

use lamina_core::{Completion, ElementId, Signal, TaskQueue};
use slotmap::{new_key_type, SlotMap};

use crate::presets::{PopupTransition, TransitionKind};

new_key_type! {
    /// Handle to a running transition
    pub struct AnimationId;
}

/// Plays popup transitions
pub trait Animator {
    /// Start `transition` on `element`; the completion fires when it ends
    fn play(&self, element: ElementId, transition: &PopupTransition) -> Completion;

    /// Number of transitions still running
    fn active_count(&self) -> usize {
        0
    }
}

/// Completes every transition immediately
#[derive(Clone, Copy, Debug, Default)]
pub struct InstantAnimator;

impl Animator for InstantAnimator {
    fn play(&self, element: ElementId, transition: &PopupTransition) -> Completion {
        tracing::trace!("InstantAnimator::play - {:?} {:?}", element, transition.kind);
        Completion::done()
    }
}

#[derive(Clone, Copy, Debug)]
struct ActiveAnimation {
    element: ElementId,
    kind: TransitionKind,
    started_ms: u64,
    duration_ms: u32,
}

/// Completes transitions after their duration on the task queue clock
#[derive(Clone)]
pub struct TimedAnimator {
    queue: TaskQueue,
    active: Rc<RefCell<SlotMap<AnimationId, ActiveAnimation>>>,
}

impl TimedAnimator {
    pub fn new(queue: TaskQueue) -> Self {
        Self {
            queue,
            active: Rc::new(RefCell::new(SlotMap::with_key())),
        }
    }

    /// Whether any transition is running on `element`
    pub fn is_animating(&self, element: ElementId) -> bool {
        self.active.borrow().values().any(|a| a.element == element)
    }

    /// Progress of the most recent transition on `element`, in `0.0..=1.0`
    pub fn progress(&self, element: ElementId) -> Option<f32> {
        let now = self.queue.now_ms();
        let active = self.active.borrow();
        let animation = active
            .values()
            .filter(|a| a.element == element)
            .max_by_key(|a| a.started_ms)?;
        let elapsed = now.saturating_sub(animation.started_ms) as f32;
        Some((elapsed / animation.duration_ms as f32).min(1.0))
    }
}

impl Animator for TimedAnimator {
    fn play(&self, element: ElementId, transition: &PopupTransition) -> Completion {
        if transition.is_instant() {
            return Completion::done();
        }

        let signal = Signal::new();
        let completion = signal.completion();
        let id = self.active.borrow_mut().insert(ActiveAnimation {
            element,
            kind: transition.kind,
            started_ms: self.queue.now_ms(),
            duration_ms: transition.duration_ms,
        });
        tracing::debug!(
            "TimedAnimator::play - {:?} {:?} on {:?} for {}ms",
            id,
            transition.kind,
            element,
            transition.duration_ms
        );

        let active = self.active.clone();
        self.queue.post_delayed(u64::from(transition.duration_ms), move || {
            let finished = active.borrow_mut().remove(id);
            if let Some(animation) = finished {
                tracing::trace!(
                    "TimedAnimator - {:?} {:?} finished",
                    animation.element,
                    animation.kind
                );
            }
            signal.complete();
        });
        completion
    }

    fn active_count(&self) -> usize {
        self.active.borrow().len()
    }
}

impl std::fmt::Debug for TimedAnimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimedAnimator")
            .field("active", &self.active_count())
            .finish()
    }
}
