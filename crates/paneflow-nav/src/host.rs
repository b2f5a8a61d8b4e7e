#![forbid(unsafe_code)]

//! Host-environment ports: scroll access and next-frame scheduling.
//!
//! The controller never touches the window directly. It goes through two
//! injected ports so deferred side effects are deterministic under test and
//! silently skipped where no interactive host exists (pre-rendering):
//!
//! - [`ScrollHost`]: read/write the scroll position, plus the
//!   [`is_active`](ScrollHost::is_active) guard. When the guard is false every
//!   scroll side effect is skipped while the state transition still applies.
//! - [`FrameScheduler`]: queue a one-shot callback to run after the next
//!   paint. There is no cancellation primitive; a scheduled restoration that
//!   outlives its checkpoint finds the consume-once flag cleared and becomes
//!   a no-op.
//!
//! [`ManualFrameScheduler`] and [`FakeScrollHost`] are the deterministic
//! doubles used by this crate's own tests and available to downstream
//! harnesses.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

/// One-shot deferred work, queued to run after the next paint.
pub type FrameCallback = Box<dyn FnOnce()>;

/// Access to the host's scroll position.
pub trait ScrollHost {
    /// Whether a real scrollable host exists. False during pre-rendering or
    /// any other non-interactive context; scroll side effects must then be
    /// skipped entirely.
    fn is_active(&self) -> bool;

    /// Current vertical scroll offset.
    fn scroll_y(&self) -> f64;

    /// Jump the host to the given vertical offset (no smooth scrolling).
    fn scroll_to(&self, y: f64);
}

/// Run-after-next-paint scheduling.
pub trait FrameScheduler {
    /// Queue `callback` to run once after the current paint cycle.
    fn schedule(&self, callback: FrameCallback);
}

/// A [`ScrollHost`] that is never active. Every read returns 0, every write
/// is dropped. The right host for pre-rendering contexts.
#[derive(Debug, Default, Clone, Copy)]
pub struct InactiveScrollHost;

impl ScrollHost for InactiveScrollHost {
    fn is_active(&self) -> bool {
        false
    }

    fn scroll_y(&self) -> f64 {
        0.0
    }

    fn scroll_to(&self, _y: f64) {}
}

/// Deterministic in-memory [`ScrollHost`] for tests.
///
/// Tracks a settable position and records every `scroll_to` call.
#[derive(Debug, Default)]
pub struct FakeScrollHost {
    active: Cell<bool>,
    position: Cell<f64>,
    scrolled_to: RefCell<Vec<f64>>,
}

impl FakeScrollHost {
    /// Create an active fake host at offset 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            active: Cell::new(true),
            position: Cell::new(0.0),
            scrolled_to: RefCell::new(Vec::new()),
        }
    }

    /// Create a fake host whose `is_active` guard is false.
    #[must_use]
    pub fn inactive() -> Self {
        let host = Self::new();
        host.active.set(false);
        host
    }

    /// Move the simulated scroll position (as if the user scrolled).
    pub fn set_position(&self, y: f64) {
        self.position.set(y);
    }

    /// Every offset passed to `scroll_to`, in call order.
    #[must_use]
    pub fn scroll_history(&self) -> Vec<f64> {
        self.scrolled_to.borrow().clone()
    }
}

impl ScrollHost for FakeScrollHost {
    fn is_active(&self) -> bool {
        self.active.get()
    }

    fn scroll_y(&self) -> f64 {
        self.position.get()
    }

    fn scroll_to(&self, y: f64) {
        self.position.set(y);
        self.scrolled_to.borrow_mut().push(y);
    }
}

/// Deterministic [`FrameScheduler`] that queues callbacks until the test
/// drains them.
#[derive(Default)]
pub struct ManualFrameScheduler {
    queue: RefCell<VecDeque<FrameCallback>>,
}

impl ManualFrameScheduler {
    /// Create an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of callbacks waiting to run.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Run the oldest queued callback. Returns false if the queue was empty.
    pub fn run_next(&self) -> bool {
        let next = self.queue.borrow_mut().pop_front();
        match next {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }

    /// Drain the queue, running callbacks in order. Callbacks scheduled while
    /// draining run too (they joined the same queue).
    pub fn run_all(&self) {
        while self.run_next() {}
    }
}

impl FrameScheduler for ManualFrameScheduler {
    fn schedule(&self, callback: FrameCallback) {
        self.queue.borrow_mut().push_back(callback);
    }
}

impl std::fmt::Debug for ManualFrameScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualFrameScheduler")
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn inactive_host_drops_writes() {
        let host = InactiveScrollHost;
        assert!(!host.is_active());
        host.scroll_to(100.0);
        assert_eq!(host.scroll_y(), 0.0);
    }

    #[test]
    fn fake_host_records_scrolls() {
        let host = FakeScrollHost::new();
        host.set_position(40.0);
        assert_eq!(host.scroll_y(), 40.0);

        host.scroll_to(0.0);
        host.scroll_to(250.0);
        assert_eq!(host.scroll_history(), vec![0.0, 250.0]);
        assert_eq!(host.scroll_y(), 250.0);
    }

    #[test]
    fn manual_scheduler_runs_in_order() {
        let sched = ManualFrameScheduler::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let o = Rc::clone(&order);
        sched.schedule(Box::new(move || o.borrow_mut().push(1)));
        let o = Rc::clone(&order);
        sched.schedule(Box::new(move || o.borrow_mut().push(2)));

        assert_eq!(sched.pending(), 2);
        sched.run_all();
        assert_eq!(*order.borrow(), vec![1, 2]);
        assert!(!sched.run_next(), "queue drained");
    }

    #[test]
    fn callback_scheduled_during_drain_still_runs() {
        let sched = Rc::new(ManualFrameScheduler::new());
        let fired = Rc::new(Cell::new(false));

        let inner_sched = Rc::clone(&sched);
        let inner_fired = Rc::clone(&fired);
        sched.schedule(Box::new(move || {
            let f = Rc::clone(&inner_fired);
            inner_sched.schedule(Box::new(move || f.set(true)));
        }));

        sched.run_all();
        assert!(fired.get());
    }
}
