//! Lamina Overlay
//!
//! Cascading light-dismiss overlays:
//!
//! - **Cascade Manager**: ordered stack of flyouts opened from one another,
//!   with a reentrancy lock and an `unlocked` completion
//! - **Light Dismiss**: participants, the stacked-client layer and the default
//!   service deciding what a click-away or Escape dismisses
//! - **State Machine**: `Hidden -> Showing -> Shown -> Hiding` with one
//!   pending operation
//! - **Placement**: pure flyout positioning and soft keyboard fit
//! - **Flyout**: the anchored surface tying it all together
//!
//! # Example
//!
//! ```ignore
//! use lamina_overlay::prelude::*;
//!
//! let ctx = OverlayContext::new();
//! let root = ctx.document().create_root(Rect::new(0.0, 0.0, 1024.0, 768.0));
//! let button = ctx.document().create_child(root)?;
//! let panel = ctx.document().create_child(root)?;
//!
//! let flyout = Flyout::new(&ctx, panel)?;
//! flyout.show_at(button, Placement::Auto, Alignment::Center)?;
//! ctx.tasks().advance(250);
//!
//! // Clicking empty space collapses the cascade
//! ctx.pointer_down(Some(root), InputType::Mouse);
//! ```

pub mod cascade;
pub mod context;
pub mod dismiss;
pub mod error;
pub mod events;
pub mod flyout;
pub mod placement;
pub mod state;

pub use cascade::{CascadeManager, CascadeSurface, SurfaceId};
pub use context::{OverlayContext, OverlayContextBuilder};
pub use dismiss::{
    DismissInfo, DismissReason, DismissService, DismissServiceConfig, Dismissable,
    DismissalPolicy, LightDismissService, LightDismissableElement, LightDismissableLayer,
};
pub use error::{OverlayError, Result};
pub use events::{LifecycleEvent, LifecycleEventKind, LifecycleListenerId, LifecycleListeners};
pub use flyout::{ActivationFocus, Flyout, FlyoutConfig, FlyoutHooks};
pub use placement::{
    check_keyboard_fit, compute_placement, Alignment, FlyoutLayout, FlyoutMetrics,
    HorizontalPosition, KeyboardFit, Placement, ScrollAnchor, VerticalPosition, ViewportBounds,
};
pub use state::{OverlayMachine, OverlayState, PendingOp, RequestOutcome, StateTransitions};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cascade::{CascadeManager, SurfaceId};
    pub use crate::context::OverlayContext;
    pub use crate::dismiss::{DismissReason, DismissServiceConfig, DismissalPolicy};
    pub use crate::error::{OverlayError, Result};
    pub use crate::events::LifecycleEventKind;
    pub use crate::flyout::{Flyout, FlyoutConfig, FlyoutHooks};
    pub use crate::placement::{Alignment, Placement};
    pub use crate::state::OverlayState;

    pub use lamina_core::{ElementId, Rect};
    pub use lamina_platform::InputType;
}
