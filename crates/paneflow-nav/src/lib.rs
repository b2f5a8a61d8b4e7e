#![forbid(unsafe_code)]

//! View-mode navigation and scroll restoration for Paneflow.
//!
//! Three view regions — a home overview, an issue reading panel, and an index
//! overlay — share one screen region on small viewports. This crate owns the
//! mutable navigation state, the state machine that transitions it, and the
//! visibility aggregation that drives chrome auto-hide:
//!
//! - [`state`]: the [`NavState`](state::NavState) and
//!   [`ScrollState`](state::ScrollState) records published through
//!   [`Observable`](paneflow_reactive::Observable) stores.
//! - [`controller`]: [`NavController`](controller::NavController), the only
//!   writer of both stores; atomic transitions, depth-1 save slots, deferred
//!   consume-once scroll restoration.
//! - [`visibility`]: [`VisibilityRegistry`](visibility::VisibilityRegistry),
//!   aggregating per-section visibility signals into hidden / all-hidden
//!   events.
//! - [`hover`]: weighted aggregation of cover-image hover signals.
//! - [`host`]: the [`ScrollHost`](host::ScrollHost) and
//!   [`FrameScheduler`](host::FrameScheduler) ports, with deterministic
//!   doubles for tests.
//! - [`content`]: the record shapes the content layer hands over.
//!
//! Everything is single-threaded and cooperative: store mutations are
//! synchronous, and the only suspension points are callbacks explicitly
//! deferred to the next frame through the scheduler port.

pub mod content;
pub mod controller;
pub mod host;
pub mod hover;
pub mod state;
pub mod visibility;

pub use content::{Article, Cover, ImageScale, Issue, unique_tags};
pub use controller::NavController;
pub use host::{FrameScheduler, ScrollHost};
pub use hover::{HoverImageStore, HoverPayload, HoverSource, HoverState};
pub use state::{ActiveViews, NavState, ScrollState, View};
pub use visibility::{SectionCallbacks, SectionHandle, SectionId, VisibilityRegistry};
