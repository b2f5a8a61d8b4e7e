#![forbid(unsafe_code)]

//! Public facade for Paneflow.
//!
//! Re-exports the navigation core and the reactive store primitives under
//! one roof. Most consumers want [`prelude`].

pub use paneflow_nav as nav;
pub use paneflow_reactive as reactive;

/// The types almost every consumer touches.
pub mod prelude {
    pub use paneflow_nav::{
        ActiveViews, Article, FrameScheduler, HoverImageStore, HoverState, Issue, NavController,
        NavState, ScrollHost, ScrollState, SectionCallbacks, VisibilityRegistry, View,
    };
    pub use paneflow_reactive::{Observable, Subscription};
}
