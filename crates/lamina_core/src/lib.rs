//! Lamina Core
//!
//! Foundational pieces shared by the Lamina overlay crates:
//!
//! - **Element Tree**: containment, bounds, focusability and text direction
//! - **Document**: shared handle adding focus state and event listeners
//! - **Task Queue**: cooperative UI-thread scheduling on a virtual clock
//! - **Signals**: one-shot completions with deferred continuations
//!
//! Everything here is single-threaded. Handles are `Rc`-based and cheap to
//! clone; interior state is only borrowed for the duration of a call and never
//! across a callback.
//!
//! # Example
//!
//! ```ignore
//! use lamina_core::{Document, Rect, Signal, TaskQueue};
//!
//! let doc = Document::new();
//! let root = doc.create_root(Rect::new(0.0, 0.0, 800.0, 600.0));
//!
//! let queue = TaskQueue::new();
//! let signal = Signal::new();
//! signal.completion().then(&queue, || tracing::info!("done"));
//! signal.complete();
//! queue.run_until_idle();
//! ```

pub mod document;
pub mod error;
pub mod events;
pub mod geometry;
pub mod runtime;
pub mod signal;
pub mod tree;

pub use document::{Document, FocusHandler, KeyHandler, ListenerId};
pub use error::{CoreError, Result};
pub use events::{FocusEvent, Key, KeyEvent, KeyState, KeyboardEvent, Modifiers};
pub use geometry::{Point, Rect, Size};
pub use runtime::{CancelToken, QueueStats, Task, TaskQueue, TimerHandle, TimerId};
pub use signal::{Completion, Signal};
pub use tree::{Direction, ElementId, ElementTree};
