//! Lamina Animation
//!
//! Enter/exit transitions for overlay surfaces.
//!
//! # Features
//!
//! - **Transition Presets**: flyout, menu and instant enter/exit pairs
//! - **Edge-Aware Slides**: surfaces slide in from the side facing their anchor
//! - **Animator Trait**: pluggable playback returning a completion handle
//! - **Timed Playback**: deterministic completion driven by the task queue clock

pub mod presets;
pub mod scheduler;

pub use presets::{PopupAnimation, PopupEdge, PopupTransition, TransitionKind};
pub use scheduler::{AnimationId, Animator, InstantAnimator, TimedAnimator};
