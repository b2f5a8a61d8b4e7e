#![forbid(unsafe_code)]

//! Reactive store primitives for Paneflow.
//!
//! This crate provides the change-tracking primitives the navigation layer
//! publishes its state through:
//!
//! - [`Observable`]: A shared, version-tracked value wrapper with change
//!   notification via subscriber callbacks.
//! - [`Subscription`]: RAII guard that automatically unsubscribes on drop.
//!
//! # Architecture
//!
//! `Observable<T>` uses `Rc<RefCell<..>>` for single-threaded shared
//! ownership. Subscribers are held by id; dropping a [`Subscription`] removes
//! its callback. Notification clones the callback list and the value snapshot
//! before invoking anything, so no internal borrow is held while subscriber
//! code runs and a subscriber may re-enter the observable.
//!
//! # Invariants
//!
//! 1. Version increments exactly once per mutation that changes the value.
//! 2. Subscribers are notified in registration order.
//! 3. Setting a value equal to the current value is a no-op (no version bump,
//!    no notifications).
//! 4. Dropping a [`Subscription`] removes the callback before the next
//!    notification cycle.

pub mod observable;

pub use observable::{Observable, Subscription};
