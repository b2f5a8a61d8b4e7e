#![forbid(unsafe_code)]

//! The view-mode state machine.
//!
//! [`NavController`] is the only writer of [`NavState`] and [`ScrollState`].
//! Every operation is an atomic read-modify-write: all inputs are read first,
//! then each touched store is replaced in a single `update` call, so no
//! subscriber ever observes a half-applied transition.
//!
//! # Save slots
//!
//! Entering the index overlay or the home view suppresses the issue panel but
//! must bring it back on exit. Each entry point gets one depth-1 save slot
//! (`prev_show_issue` for index, `prev_show_issue_for_home` for home) held as
//! a plain field on the controller instance. Entering the same overlay twice
//! without exiting overwrites the slot; the supported UI cannot nest deeper,
//! so there is deliberately no stack.
//!
//! # Deferred restoration
//!
//! Scroll restoration runs on the next frame via the injected
//! [`FrameScheduler`]. Each scheduled callback re-checks its checkpoint's
//! consume-once flag, so a restoration that was preempted by a later
//! transition silently becomes a no-op. Operations cannot fail: restoring
//! from an empty slot falls back to the current value, and every scroll side
//! effect is skipped when [`ScrollHost::is_active`] is false.

use std::rc::Rc;

use paneflow_reactive::Observable;
use tracing::{debug, trace};

use crate::host::{FrameScheduler, ScrollHost};
use crate::state::{ActiveViews, NavState, ScrollState, View};

/// Orchestrates view-mode transitions and scroll restoration.
pub struct NavController {
    nav: Observable<NavState>,
    scroll: Observable<ScrollState>,
    host: Rc<dyn ScrollHost>,
    scheduler: Rc<dyn FrameScheduler>,
    /// `show_issue` as it was when the index overlay opened. Depth 1:
    /// reopening the index without closing it overwrites the save.
    prev_show_issue: Option<bool>,
    /// `show_issue` as it was when the home view opened. Depth 1, same
    /// overwrite rule.
    prev_show_issue_for_home: Option<bool>,
}

impl NavController {
    /// Create a controller over fresh default stores.
    #[must_use]
    pub fn new(host: Rc<dyn ScrollHost>, scheduler: Rc<dyn FrameScheduler>) -> Self {
        Self::with_stores(
            Observable::new(NavState::default()),
            Observable::new(ScrollState::default()),
            host,
            scheduler,
        )
    }

    /// Create a controller over existing stores (shared with views).
    #[must_use]
    pub fn with_stores(
        nav: Observable<NavState>,
        scroll: Observable<ScrollState>,
        host: Rc<dyn ScrollHost>,
        scheduler: Rc<dyn FrameScheduler>,
    ) -> Self {
        Self {
            nav,
            scroll,
            host,
            scheduler,
            prev_show_issue: None,
            prev_show_issue_for_home: None,
        }
    }

    /// The navigation store. Subscribe here for view-mode snapshots.
    #[must_use]
    pub fn nav(&self) -> &Observable<NavState> {
        &self.nav
    }

    /// The scroll store. Subscribe here for restoration checkpoints.
    #[must_use]
    pub fn scroll(&self) -> &Observable<ScrollState> {
        &self.scroll
    }

    // --- View-mode transitions ---

    /// Flip `view` unconditionally. For simple non-exclusive panels; never
    /// touches scroll state.
    pub fn toggle_view(&mut self, view: View) {
        trace!(?view, "toggle_view");
        self.nav.update(|n| n.active.toggle(view.flag()));
    }

    /// Show `view`, enforcing pane exclusivity for [`View::Home`] and
    /// [`View::Issue`] (the two share one pane on small viewports). Showing
    /// home also closes the index overlay. Any other view is shown
    /// additively.
    pub fn show_view(&mut self, view: View) {
        trace!(?view, "show_view");
        self.nav.update(|n| match view {
            View::Home | View::Issue => {
                n.active.set(ActiveViews::HOME, view == View::Home);
                n.active.set(ActiveViews::ISSUE, view == View::Issue);
                if view == View::Home {
                    n.active.remove(ActiveViews::INDEX);
                }
            }
            other => n.active.insert(other.flag()),
        });
    }

    /// Toggle the home view with save/restore of the issue-panel flag.
    ///
    /// Closing restores `show_issue` from the home save slot (unchanged if
    /// the slot is empty) and schedules restoration of the checkpoint
    /// captured at open time. Opening captures the current offset as the
    /// home checkpoint; if it preempts an open index overlay it first
    /// inherits the index exit path — consume the index save slot, clear the
    /// tag filter, schedule the index checkpoint restore — and only then
    /// activates home with `show_issue` forced off, saving the inherited
    /// value into the home slot so closing home later returns to it.
    pub fn toggle_home(&mut self) {
        let (was_home, was_index, current_show_issue) = self
            .nav
            .with(|n| (n.is_active(View::Home), n.is_active(View::Index), n.show_issue));

        if was_home {
            let restored = self
                .prev_show_issue_for_home
                .take()
                .unwrap_or(current_show_issue);
            debug!(restored, "toggle_home: closing");
            self.nav.update(|n| {
                n.show_issue = restored;
                n.active.remove(ActiveViews::HOME);
            });
            self.schedule_home_restore();
            return;
        }

        self.checkpoint_home_scroll();

        let mut restored = current_show_issue;
        if was_index {
            // Replacing index with home inherits index's pending restoration:
            // the user jumped straight from the overlay to home without
            // closing it first.
            restored = self.prev_show_issue.take().unwrap_or(current_show_issue);
            self.schedule_index_restore();
        }
        self.prev_show_issue_for_home = Some(restored);
        debug!(was_index, saved = restored, "toggle_home: opening");

        self.nav.update(|n| {
            n.show_issue = false;
            if was_index {
                n.selected_tag = None;
            }
            n.active = ActiveViews::HOME;
        });
    }

    /// Show the issue panel with the tag filter cleared. Leaves the index
    /// overlay and both save slots alone.
    pub fn show_issues_unfiltered(&mut self) {
        trace!("show_issues_unfiltered");
        self.nav.update(|n| {
            n.selected_tag = None;
            n.active.remove(ActiveViews::HOME);
            n.active.insert(ActiveViews::ISSUE);
        });
    }

    /// Toggle the index overlay.
    ///
    /// Opening captures the current offset as the index checkpoint, saves
    /// `show_issue` into the index slot, and takes over the whole pane.
    /// Closing consumes the slot (unchanged if empty), clears the tag filter,
    /// deactivates everything, and schedules the consume-once checkpoint
    /// restore for the next frame.
    pub fn toggle_index(&mut self) {
        let (was_index, current_show_issue) =
            self.nav.with(|n| (n.is_active(View::Index), n.show_issue));

        if was_index {
            let restored = self.prev_show_issue.take().unwrap_or(current_show_issue);
            debug!(restored, "toggle_index: closing");
            self.schedule_index_restore();
            self.nav.update(|n| {
                n.show_issue = restored;
                n.selected_tag = None;
                n.active = ActiveViews::empty();
            });
            return;
        }

        if self.host.is_active() {
            let y = self.host.scroll_y();
            self.scroll.update(|s| {
                s.index_scroll_y = Some(y);
                s.should_restore_from_index = true;
            });
        }
        self.prev_show_issue = Some(current_show_issue);
        debug!(saved = current_show_issue, "toggle_index: opening");
        self.nav.update(|n| {
            n.show_issue = false;
            n.active = ActiveViews::INDEX;
        });
    }

    /// Deactivate every view. Consumes the index save slot for `show_issue`
    /// (unchanged if empty) and clears the tag filter. Performs no scroll
    /// restoration.
    pub fn close_all(&mut self) {
        let restored = self.prev_show_issue.take();
        debug!(?restored, "close_all");
        self.nav.update(|n| {
            if let Some(value) = restored {
                n.show_issue = value;
            }
            n.selected_tag = None;
            n.active = ActiveViews::empty();
        });
    }

    /// [`close_all`](Self::close_all), then raise the coarse home-route
    /// restore flag consumed by the page that owns the home route's own
    /// scroll memory (not by this controller).
    pub fn navigate_home(&mut self) {
        self.close_all();
        self.scroll.update(|s| s.should_restore = true);
    }

    // --- Tag filter ---

    /// Set the active content filter. No interaction with view state.
    pub fn set_selected_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        trace!(%tag, "set_selected_tag");
        self.nav.update(|n| n.selected_tag = Some(tag));
    }

    /// Clear the active content filter.
    pub fn clear_selected_tag(&mut self) {
        self.nav.update(|n| n.selected_tag = None);
    }

    // --- Chrome flags ---

    /// Show or hide the navigation chrome. Wire the visibility registry's
    /// aggregate callbacks here.
    pub fn set_nav_visible(&mut self, visible: bool) {
        self.nav.update(|n| n.show_nav = visible);
    }

    /// Set the display text and accent color of the active issue.
    pub fn set_active_issue(&mut self, text: impl Into<String>, color: impl Into<String>) {
        let (text, color) = (text.into(), color.into());
        self.nav.update(|n| {
            n.issue_text = text;
            n.issue_color = color;
        });
    }

    // --- Deferred restoration ---

    /// Capture the current offset as the home checkpoint. Skipped entirely
    /// when the host is inactive.
    fn checkpoint_home_scroll(&self) {
        if !self.host.is_active() {
            return;
        }
        let y = self.host.scroll_y();
        self.scroll.update(|s| {
            s.home_scroll_y = Some(y);
            s.should_restore = true;
        });
    }

    /// Queue a consume-once restore of the index checkpoint for the next
    /// frame. If an intervening transition already consumed the checkpoint,
    /// the callback finds the flag cleared and does nothing.
    fn schedule_index_restore(&self) {
        if !self.host.is_active() {
            return;
        }
        let scroll = self.scroll.clone();
        let host = Rc::clone(&self.host);
        self.scheduler.schedule(Box::new(move || {
            scroll.update(|s| {
                if s.should_restore_from_index {
                    if let Some(y) = s.index_scroll_y {
                        host.scroll_to(y);
                        trace!(offset = y, "restored index checkpoint");
                        s.should_restore_from_index = false;
                        s.index_scroll_y = None;
                    }
                }
            });
        }));
    }

    /// Queue a consume-once restore of the home checkpoint for the next
    /// frame. Same staleness rule as the index restore.
    fn schedule_home_restore(&self) {
        if !self.host.is_active() {
            return;
        }
        let scroll = self.scroll.clone();
        let host = Rc::clone(&self.host);
        self.scheduler.schedule(Box::new(move || {
            scroll.update(|s| {
                if s.should_restore {
                    if let Some(y) = s.home_scroll_y {
                        host.scroll_to(y);
                        trace!(offset = y, "restored home checkpoint");
                        s.should_restore = false;
                        s.home_scroll_y = None;
                    }
                }
            });
        }));
    }
}

impl std::fmt::Debug for NavController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavController")
            .field("nav", &self.nav)
            .field("scroll", &self.scroll)
            .field("prev_show_issue", &self.prev_show_issue)
            .field("prev_show_issue_for_home", &self.prev_show_issue_for_home)
            .finish()
    }
}
