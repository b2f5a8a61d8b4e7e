#![forbid(unsafe_code)]

//! Version-tracked observable values with subscriber notification.
//!
//! An [`Observable<T>`] is a shared mutable value whose subscribers receive
//! the full new snapshot after every change. Cloning an `Observable` clones
//! the handle, not the value: all clones view and mutate the same state.
//!
//! Mutations go through [`Observable::set`] (whole-value replace) or
//! [`Observable::update`] (closure over `&mut T`); both are atomic with
//! respect to subscribers — no subscriber ever observes a half-applied
//! transition, because notification happens only after the mutation completes
//! and the borrow is released.
//!
//! # Failure Modes
//!
//! - Subscriber panic: propagates to the caller of `set`/`update`; remaining
//!   subscribers in that cycle are skipped.
//! - Re-entrant mutation from a subscriber: permitted; the inner mutation
//!   completes (and notifies) before the outer notification loop resumes.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

struct Subscriber<T> {
    id: u64,
    callback: Rc<dyn Fn(&T)>,
}

struct Inner<T> {
    value: RefCell<T>,
    version: Cell<u64>,
    next_sub_id: Cell<u64>,
    subscribers: RefCell<Vec<Subscriber<T>>>,
}

/// A shared, version-tracked value with change notification.
///
/// `T` must be `Clone` (snapshots are handed to subscribers by reference to a
/// clone) and `PartialEq` (equal writes are suppressed).
pub struct Observable<T> {
    inner: Rc<Inner<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observable")
            .field("value", &*self.inner.value.borrow())
            .field("version", &self.inner.version.get())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    /// Create a new observable holding `value`.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(Inner {
                value: RefCell::new(value),
                version: Cell::new(0),
                next_sub_id: Cell::new(0),
                subscribers: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Clone out the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Read the current value in place without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Replace the value. No-op (no version bump, no notification) if the new
    /// value equals the current one.
    pub fn set(&self, value: T) {
        let changed = {
            let mut cur = self.inner.value.borrow_mut();
            if *cur == value {
                false
            } else {
                *cur = value;
                true
            }
        };
        if changed {
            self.bump_and_notify();
        }
    }

    /// Mutate the value through a closure, as a single atomic replace.
    ///
    /// Subscribers are notified once, after the closure returns, and only if
    /// the value actually changed.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let changed = {
            let mut cur = self.inner.value.borrow_mut();
            let before = cur.clone();
            f(&mut cur);
            *cur != before
        };
        if changed {
            self.bump_and_notify();
        }
    }

    /// Monotonic change counter. Starts at 0; bumps once per real change.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }

    /// Register a callback invoked with the full new snapshot after every
    /// change. Returns a [`Subscription`] that unsubscribes on drop.
    #[must_use = "dropping the Subscription immediately unsubscribes"]
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let id = self.inner.next_sub_id.get();
        self.inner.next_sub_id.set(id + 1);
        self.inner.subscribers.borrow_mut().push(Subscriber {
            id,
            callback: Rc::new(callback),
        });

        let weak: Weak<Inner<T>> = Rc::downgrade(&self.inner);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.subscribers.borrow_mut().retain(|s| s.id != id);
                }
            })),
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    fn bump_and_notify(&self) {
        self.inner.version.set(self.inner.version.get() + 1);
        let snapshot = self.inner.value.borrow().clone();
        // Clone the callback list so subscriber code runs with no borrow held.
        let callbacks: Vec<Rc<dyn Fn(&T)>> = self
            .inner
            .subscribers
            .borrow()
            .iter()
            .map(|s| Rc::clone(&s.callback))
            .collect();
        for cb in callbacks {
            cb(&snapshot);
        }
    }
}

impl<T: Clone + PartialEq + Default + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// RAII guard for a registered subscriber callback.
///
/// Dropping the guard removes the callback; the callback will not fire in any
/// notification cycle that starts after the drop.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Unsubscribe now. Equivalent to dropping the guard.
    pub fn cancel(self) {}

    /// Leak the subscription: the callback stays registered for the life of
    /// the observable.
    pub fn detach(mut self) {
        self.cancel = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}
