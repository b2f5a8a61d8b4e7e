#![forbid(unsafe_code)]

//! Aggregated visibility tracking for mounted content sections.
//!
//! Each mounted content section gets a [`SectionHandle`] from the
//! [`VisibilityRegistry`] and feeds it intersection-observer-style signals.
//! The registry aggregates the independent signals into two derived events:
//!
//! - `on_hidden`: this section transitioned visible → hidden.
//! - `on_all_hidden`: after some section hid (or was destroyed), no live
//!   section is visible. Drives navigation chrome auto-hide.
//!
//! # Invariants
//!
//! - No two live handles share an id; ids increase monotonically.
//! - The aggregate is recomputed by scanning the arena, never by a shadow
//!   counter, so it cannot drift from the per-entry flags.
//! - Callbacks run with no registry borrow held; a callback may re-enter the
//!   registry (create or destroy handles, update visibility).
//!
//! # Contract
//!
//! `on_all_hidden` is level-checked, not edge-triggered across handles: it
//! fires once per hide/destroy that leaves the aggregate empty, so it can
//! fire several times in a row. Consumers must treat it as idempotent.
//!
//! # Failure Modes
//!
//! - Signals after `destroy` (stale handle id): silently ignored.
//! - Redundant signals (same value twice): debounced to a no-op.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::trace;

/// Identifier of a live section entry. Never reused within a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SectionId(u64);

impl SectionId {
    /// Raw id value.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// The two aggregate notifications a section wires up at mount time.
#[derive(Clone)]
pub struct SectionCallbacks {
    on_hidden: Rc<dyn Fn()>,
    on_all_hidden: Rc<dyn Fn()>,
}

impl SectionCallbacks {
    /// Build the callback pair.
    pub fn new(on_hidden: impl Fn() + 'static, on_all_hidden: impl Fn() + 'static) -> Self {
        Self {
            on_hidden: Rc::new(on_hidden),
            on_all_hidden: Rc::new(on_all_hidden),
        }
    }
}

impl std::fmt::Debug for SectionCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SectionCallbacks").finish_non_exhaustive()
    }
}

struct SectionEntry {
    id: SectionId,
    visible: bool,
    callbacks: SectionCallbacks,
}

struct RegistryInner {
    sections: Vec<SectionEntry>,
    next_id: u64,
}

/// Arena of mounted-section visibility entries.
///
/// Cloning the registry clones the handle; all clones share one arena.
#[derive(Clone)]
pub struct VisibilityRegistry {
    inner: Rc<RefCell<RegistryInner>>,
}

impl Default for VisibilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl VisibilityRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(RegistryInner {
                sections: Vec::new(),
                next_id: 0,
            })),
        }
    }

    /// Register a newly mounted section. The entry starts hidden.
    ///
    /// The returned handle owns the entry: dropping it (or calling
    /// [`SectionHandle::destroy`]) removes the entry, treating
    /// unmount-while-visible as an implicit hide.
    #[must_use]
    pub fn create_handle(&self, callbacks: SectionCallbacks) -> SectionHandle {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = SectionId(inner.next_id);
            inner.next_id += 1;
            inner.sections.push(SectionEntry {
                id,
                visible: false,
                callbacks,
            });
            id
        };
        trace!(id = id.id(), "section mounted");
        SectionHandle {
            id,
            inner: Rc::clone(&self.inner),
        }
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().sections.len()
    }

    /// Whether no section is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().sections.is_empty()
    }

    /// Number of entries currently visible.
    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.inner
            .borrow()
            .sections
            .iter()
            .filter(|e| e.visible)
            .count()
    }
}

impl std::fmt::Debug for VisibilityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisibilityRegistry")
            .field("sections", &self.len())
            .field("visible", &self.visible_count())
            .finish()
    }
}

/// Owned registration of one mounted content section.
///
/// Removal on drop mirrors RAII subscriptions: a section that unmounts
/// without an explicit [`destroy`](Self::destroy) call still leaves the
/// arena.
pub struct SectionHandle {
    id: SectionId,
    inner: Rc<RefCell<RegistryInner>>,
}

impl SectionHandle {
    /// This entry's id.
    #[must_use]
    pub fn id(&self) -> SectionId {
        self.id
    }

    /// Feed a visibility signal. Redundant signals (equal to the stored
    /// flag) are debounced. A visible → hidden transition fires `on_hidden`,
    /// then `on_all_hidden` when no live entry remains visible.
    pub fn update_visibility(&self, visible: bool) {
        let fire = {
            let mut inner = self.inner.borrow_mut();
            let Some(idx) = inner.sections.iter().position(|e| e.id == self.id) else {
                return;
            };
            if inner.sections[idx].visible == visible {
                return;
            }
            inner.sections[idx].visible = visible;
            if visible {
                None
            } else {
                let callbacks = inner.sections[idx].callbacks.clone();
                let none_visible = inner.sections.iter().all(|e| !e.visible);
                Some((callbacks, none_visible))
            }
        };

        if let Some((callbacks, none_visible)) = fire {
            trace!(id = self.id.id(), "section hidden");
            (callbacks.on_hidden)();
            if none_visible {
                (callbacks.on_all_hidden)();
            }
        }
    }

    /// Remove the entry now. Equivalent to dropping the handle: an entry
    /// visible at removal time is implicitly hidden first, and
    /// `on_all_hidden` fires whenever no remaining entry is visible — even
    /// when this one was already hidden.
    pub fn destroy(self) {}

    fn release(&self) {
        let fire = {
            let mut inner = self.inner.borrow_mut();
            let Some(idx) = inner.sections.iter().position(|e| e.id == self.id) else {
                return;
            };
            let entry = inner.sections.remove(idx);
            let none_visible = inner.sections.iter().all(|e| !e.visible);
            Some((entry.visible, entry.callbacks, none_visible))
        };

        if let Some((was_visible, callbacks, none_visible)) = fire {
            trace!(id = self.id.id(), was_visible, "section unmounted");
            if was_visible {
                (callbacks.on_hidden)();
            }
            if none_visible {
                (callbacks.on_all_hidden)();
            }
        }
    }
}

impl Drop for SectionHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for SectionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SectionHandle").field("id", &self.id).finish()
    }
}
