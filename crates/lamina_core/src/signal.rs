//! One-shot completion signals
//!
//! A [`Signal`] is the producer side of a one-shot notification; any number of
//! [`Completion`] handles observe it. Continuations registered with
//! [`Completion::then`] never run synchronously inside [`Signal::complete`]:
//! they are posted to the [`TaskQueue`] they were registered with, so the code
//! that completed the signal always finishes first.
//!
//! `Completion` also implements [`Future`] for hosts that drive overlays from
//! an async executor.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use crate::runtime::{Task, TaskQueue};

#[derive(Default)]
struct SignalState {
    complete: Cell<bool>,
    continuations: RefCell<Vec<(TaskQueue, Task)>>,
    wakers: RefCell<Vec<Waker>>,
}

/// Producer side of a one-shot notification
#[derive(Default)]
pub struct Signal {
    state: Rc<SignalState>,
}

impl Signal {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle observing this signal
    pub fn completion(&self) -> Completion {
        Completion {
            state: self.state.clone(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.state.complete.get()
    }

    /// Complete the signal; later calls are no-ops
    pub fn complete(&self) {
        if self.state.complete.replace(true) {
            return;
        }

        let continuations = std::mem::take(&mut *self.state.continuations.borrow_mut());
        for (queue, task) in continuations {
            queue.post(task);
        }

        let wakers = std::mem::take(&mut *self.state.wakers.borrow_mut());
        for waker in wakers {
            waker.wake();
        }
    }
}

impl std::fmt::Debug for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("complete", &self.is_complete())
            .finish()
    }
}

/// Observer side of a [`Signal`]
#[derive(Clone)]
pub struct Completion {
    state: Rc<SignalState>,
}

impl Completion {
    /// A completion that is already done
    pub fn done() -> Self {
        let signal = Signal::new();
        signal.complete();
        signal.completion()
    }

    pub fn is_complete(&self) -> bool {
        self.state.complete.get()
    }

    /// Run `task` on `queue` once the signal completes
    ///
    /// If the signal is already complete the task is posted immediately.
    pub fn then<F>(&self, queue: &TaskQueue, task: F)
    where
        F: FnOnce() + 'static,
    {
        if self.is_complete() {
            queue.post(task);
        } else {
            self.state
                .continuations
                .borrow_mut()
                .push((queue.clone(), Box::new(task)));
        }
    }

    /// Whether two handles observe the same signal
    pub fn ptr_eq(&self, other: &Completion) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl Future for Completion {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.is_complete() {
            Poll::Ready(())
        } else {
            self.state.wakers.borrow_mut().push(cx.waker().clone());
            Poll::Pending
        }
    }
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion")
            .field("complete", &self.is_complete())
            .finish()
    }
}
