//! Cooperative task queue
//!
//! UI-thread work in Lamina never runs re-entrantly from inside another
//! operation unless that operation calls it directly. Anything deferred
//! (completion continuations, animation ends, hover timers) is posted to a
//! [`TaskQueue`] and runs when the host drains it.
//!
//! The queue keeps a virtual millisecond clock. Hosts advance it from their
//! frame loop; tests advance it explicitly, which makes every timing-dependent
//! behavior deterministic.
//!
//! # Example
//!
//! ```ignore
//! use lamina_core::TaskQueue;
//!
//! let queue = TaskQueue::new();
//! let timer = queue.post_delayed(400, || tracing::info!("fired"));
//! queue.advance(399);
//! assert!(timer.is_pending());
//! queue.advance(1);
//! assert!(!timer.is_pending());
//! ```

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use slotmap::{new_key_type, SlotMap};

/// A unit of deferred work
pub type Task = Box<dyn FnOnce()>;

new_key_type! {
    /// Handle to a scheduled timer
    pub struct TimerId;
}

struct Timer {
    due_ms: u64,
    seq: u64,
    token: CancelToken,
    task: Task,
}

#[derive(Default)]
struct QueueInner {
    now_ms: u64,
    next_seq: u64,
    ready: VecDeque<Task>,
    timers: SlotMap<TimerId, Timer>,
    stats: QueueStats,
}

/// Statistics about the queue
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    pub tasks_run: u64,
    pub timers_fired: u64,
    pub timers_cancelled: u64,
}

/// Shared handle to the cooperative task queue
#[derive(Clone, Default)]
pub struct TaskQueue {
    inner: Rc<RefCell<QueueInner>>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    pub fn now_ms(&self) -> u64 {
        self.inner.borrow().now_ms
    }

    /// Queue work to run on the next drain
    pub fn post<F>(&self, task: F)
    where
        F: FnOnce() + 'static,
    {
        self.inner.borrow_mut().ready.push_back(Box::new(task));
    }

    /// Queue work to run once the clock has advanced by `delay_ms`
    pub fn post_delayed<F>(&self, delay_ms: u64, task: F) -> TimerHandle
    where
        F: FnOnce() + 'static,
    {
        let token = CancelToken::new();
        let id = {
            let mut inner = self.inner.borrow_mut();
            let seq = inner.next_seq;
            inner.next_seq += 1;
            let due_ms = inner.now_ms + delay_ms;
            inner.timers.insert(Timer {
                due_ms,
                seq,
                token: token.clone(),
                task: Box::new(task),
            })
        };

        TimerHandle {
            id,
            token,
            queue: Rc::downgrade(&self.inner),
        }
    }

    /// Run ready tasks until none remain, without moving the clock
    ///
    /// Returns the number of tasks run.
    pub fn run_until_idle(&self) -> usize {
        let mut count = 0;
        loop {
            let task = self.inner.borrow_mut().ready.pop_front();
            match task {
                Some(task) => {
                    task();
                    count += 1;
                }
                None => break,
            }
        }
        self.inner.borrow_mut().stats.tasks_run += count as u64;
        count
    }

    /// Move the clock forward, firing due timers in order
    ///
    /// Ready tasks are drained before the first timer and after every timer,
    /// so continuations posted by a timer run before the next timer fires.
    pub fn advance(&self, ms: u64) {
        let target = self.now_ms() + ms;
        self.run_until_idle();

        while let Some(timer) = self.take_next_due(target) {
            if !timer.token.is_cancelled() {
                (timer.task)();
                self.inner.borrow_mut().stats.timers_fired += 1;
            }
            self.run_until_idle();
        }

        self.inner.borrow_mut().now_ms = target;
    }

    /// Whether no work is queued at all
    pub fn is_idle(&self) -> bool {
        let inner = self.inner.borrow();
        inner.ready.is_empty() && inner.timers.is_empty()
    }

    pub fn pending_timers(&self) -> usize {
        self.inner.borrow().timers.len()
    }

    pub fn stats(&self) -> QueueStats {
        self.inner.borrow().stats
    }

    fn take_next_due(&self, target: u64) -> Option<Timer> {
        let mut inner = self.inner.borrow_mut();
        let (id, due_ms) = inner
            .timers
            .iter()
            .filter(|(_, t)| t.due_ms <= target)
            .min_by_key(|(_, t)| (t.due_ms, t.seq))
            .map(|(id, t)| (id, t.due_ms))?;

        inner.now_ms = inner.now_ms.max(due_ms);
        inner.timers.remove(id)
    }
}

impl std::fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("TaskQueue")
            .field("now_ms", &inner.now_ms)
            .field("ready", &inner.ready.len())
            .field("timers", &inner.timers.len())
            .finish()
    }
}

// ============================================================================
// Cancellation
// ============================================================================

/// Shared cancellation flag
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Rc<Cell<bool>>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

/// Handle to a delayed task
///
/// Dropping the handle does not cancel the timer.
#[derive(Debug)]
pub struct TimerHandle {
    id: TimerId,
    token: CancelToken,
    queue: Weak<RefCell<QueueInner>>,
}

impl TimerHandle {
    pub fn id(&self) -> TimerId {
        self.id
    }

    /// Cancel the timer; a no-op if it already fired
    pub fn cancel(&self) {
        if self.token.is_cancelled() {
            return;
        }
        self.token.cancel();

        if let Some(queue) = self.queue.upgrade() {
            let removed = {
                let mut inner = queue.borrow_mut();
                let removed = inner.timers.remove(self.id);
                if removed.is_some() {
                    inner.stats.timers_cancelled += 1;
                }
                removed
            };
            drop(removed);
        }
    }

    /// Whether the timer is still waiting to fire
    pub fn is_pending(&self) -> bool {
        !self.token.is_cancelled()
            && self
                .queue
                .upgrade()
                .is_some_and(|q| {
                    let inner = q.borrow();
                    inner.timers.contains_key(self.id)
                })
    }

    pub fn token(&self) -> &CancelToken {
        &self.token
    }
}
