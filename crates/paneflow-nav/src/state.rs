#![forbid(unsafe_code)]

//! Mutable navigation and scroll state records.
//!
//! Two records, each published through an
//! [`Observable`](paneflow_reactive::Observable) so views receive the full
//! snapshot on every change:
//!
//! - [`NavState`]: which view regions are rendered, the issue-panel flag, the
//!   tag filter, and the auxiliary chrome flags.
//! - [`ScrollState`]: remembered scroll offsets paired with one-shot
//!   restoration flags.
//!
//! # Invariants
//!
//! 1. [`ActiveViews::HOME`] and [`ActiveViews::ISSUE`] are never both set
//!    after any [`NavController`](crate::controller::NavController) operation
//!    (the shared pane is exclusive between them).
//! 2. A `*_scroll_y` offset is non-null only while (or after) its paired
//!    restore flag was raised; a consumed checkpoint clears both together.

use bitflags::bitflags;

/// A view region of the shared screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    /// The home overview.
    Home,
    /// The issue reading panel.
    Issue,
    /// The index overlay layered above the shared pane.
    Index,
}

impl View {
    /// The bit this view occupies in [`ActiveViews`].
    #[must_use]
    pub const fn flag(self) -> ActiveViews {
        match self {
            View::Home => ActiveViews::HOME,
            View::Issue => ActiveViews::ISSUE,
            View::Index => ActiveViews::INDEX,
        }
    }
}

bitflags! {
    /// The set of currently rendered view regions.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ActiveViews: u8 {
        /// Home overview is rendered.
        const HOME = 1 << 0;
        /// Issue reading panel is rendered.
        const ISSUE = 1 << 1;
        /// Index overlay is rendered.
        const INDEX = 1 << 2;
    }
}

/// Navigation state: view-mode flags, tag filter, and chrome flags.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NavState {
    /// Display text for the active issue panel.
    pub issue_text: String,
    /// Whether the issue panel is logically open. May be visually suppressed
    /// while the index overlay sits on top; the pre-overlay value is kept in
    /// the controller's save slots.
    pub show_issue: bool,
    /// Whether the navigation chrome is visible.
    pub show_nav: bool,
    /// Active content filter. Independent of view mode.
    pub selected_tag: Option<String>,
    /// Accent color carried alongside whichever issue is active. Cosmetic.
    pub issue_color: String,
    /// Which view regions are currently rendered.
    pub active: ActiveViews,
}

impl NavState {
    /// Whether `view` is currently rendered.
    #[must_use]
    pub fn is_active(&self, view: View) -> bool {
        self.active.contains(view.flag())
    }
}

/// Scroll-restoration checkpoints.
///
/// Each checkpoint is an `(offset, flag)` pair consumed exactly once: when a
/// deferred restoration runs, it scrolls to the offset and clears both fields
/// atomically. A checkpoint whose flag was already cleared is dead and its
/// restoration degrades to a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollState {
    /// Last recorded scroll offset on the home route.
    pub home_scroll_y: Option<f64>,
    /// Pending restore of the home checkpoint. Also raised alone (offset left
    /// untouched) by `navigate_home` as the coarse signal consumed by the page
    /// that owns the home route's own scroll memory.
    pub should_restore: bool,
    /// Scroll offset captured when the index overlay was opened.
    pub index_scroll_y: Option<f64>,
    /// Pending restore of the index checkpoint once the overlay closes.
    pub should_restore_from_index: bool,
}
