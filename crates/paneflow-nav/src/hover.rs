#![forbid(unsafe_code)]

//! Weighted aggregation of cover-image hover signals.
//!
//! Articles report hover interest from two sources: the viewport (weight =
//! intersection ratio) and the pointer (weight = +∞, so a real mouse-over
//! always beats mere visibility). The store aggregates all live entries into
//! one active payload — the heaviest entry — plus a bounded
//! most-recently-active stack views use for layered cover transitions.
//!
//! # Invariants
//!
//! - The stack is ordered least-recently-active first, holds at most
//!   [`STACK_LIMIT`] payloads, and never contains two entries for the same
//!   article.
//! - Articles without an id or cover URL never produce entries.
//! - Clearing the last pointer entry clears every entry: once no pointer is
//!   down, viewport-only residue must not keep an image active.

use std::cell::RefCell;
use std::collections::BTreeMap;

use paneflow_reactive::Observable;

use crate::content::{Article, ImageScale};

/// Upper bound on the most-recently-active stack.
pub const STACK_LIMIT: usize = 12;

/// Where a hover signal came from.
///
/// Ordering matters only for deterministic iteration of the entry map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HoverSource {
    /// The article's section intersects the viewport.
    Viewport,
    /// The pointer is over the article. Always outweighs viewport signals.
    Pointer,
}

/// The cover image a view should present for a hovered article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverPayload {
    pub article_id: String,
    pub scale: ImageScale,
    pub src: String,
    pub alt: String,
    pub title: String,
}

/// Published aggregate: the winning payload plus the recency stack.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HoverState {
    pub active: Option<HoverPayload>,
    /// Least-recently-active first, capped at [`STACK_LIMIT`].
    pub stack: Vec<HoverPayload>,
}

struct HoverEntry {
    weight: f64,
    payload: HoverPayload,
}

/// Aggregates hover signals into an [`Observable<HoverState>`].
pub struct HoverImageStore {
    state: Observable<HoverState>,
    entries: RefCell<BTreeMap<(HoverSource, String), HoverEntry>>,
    stack_order: RefCell<Vec<String>>,
    stack_values: RefCell<BTreeMap<String, HoverPayload>>,
}

impl Default for HoverImageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HoverImageStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Observable::new(HoverState::default()),
            entries: RefCell::new(BTreeMap::new()),
            stack_order: RefCell::new(Vec::new()),
            stack_values: RefCell::new(BTreeMap::new()),
        }
    }

    /// The published aggregate. Subscribe here for hover snapshots.
    #[must_use]
    pub fn state(&self) -> &Observable<HoverState> {
        &self.state
    }

    /// Report that `article`'s section intersects the viewport at `ratio`.
    /// Non-finite ratios are coerced to 0.
    pub fn set_from_viewport(&self, article: &Article, ratio: f64) {
        let weight = if ratio.is_finite() { ratio } else { 0.0 };
        self.upsert(article, weight, HoverSource::Viewport);
    }

    /// Report that the pointer entered `article`'s section.
    pub fn set_from_pointer(&self, article: &Article) {
        self.upsert(article, f64::INFINITY, HoverSource::Pointer);
    }

    /// Withdraw hover interest for `article_id`.
    ///
    /// With `source` given, only that entry is removed; withdrawing a pointer
    /// entry also drops the article's viewport entry, and if it was the last
    /// pointer entry the whole aggregation is cleared. Without `source`, both
    /// of the article's entries go, with the same last-pointer rule.
    pub fn clear(&self, article_id: &str, source: Option<HoverSource>) {
        if let Some(source) = source {
            let removed = self
                .entries
                .borrow_mut()
                .remove(&(source, article_id.to_owned()))
                .is_some();
            if !removed {
                return;
            }
            if source == HoverSource::Pointer {
                self.entries
                    .borrow_mut()
                    .remove(&(HoverSource::Viewport, article_id.to_owned()));
                if !self.has_pointer_entries() {
                    self.entries.borrow_mut().clear();
                    self.publish(None);
                    return;
                }
            }
            self.emit(None);
            return;
        }

        let removed_pointer = self
            .entries
            .borrow_mut()
            .remove(&(HoverSource::Pointer, article_id.to_owned()))
            .is_some();
        let removed_viewport = self
            .entries
            .borrow_mut()
            .remove(&(HoverSource::Viewport, article_id.to_owned()))
            .is_some();
        if !(removed_pointer || removed_viewport) {
            return;
        }
        if removed_pointer && !self.has_pointer_entries() {
            self.entries.borrow_mut().clear();
            self.publish(None);
            return;
        }
        self.emit(None);
    }

    /// Drop every entry and the recency stack.
    pub fn reset(&self) {
        self.entries.borrow_mut().clear();
        self.stack_order.borrow_mut().clear();
        self.stack_values.borrow_mut().clear();
        self.state.set(HoverState::default());
    }

    fn upsert(&self, article: &Article, weight: f64, source: HoverSource) {
        let Some(payload) = payload_from(article) else {
            return;
        };
        let article_id = payload.article_id.clone();
        self.stack_values
            .borrow_mut()
            .insert(article_id.clone(), payload.clone());
        self.entries
            .borrow_mut()
            .insert((source, article_id.clone()), HoverEntry { weight, payload });
        self.emit(Some(&article_id));
    }

    /// Recompute the active payload and publish a snapshot. `preferred`
    /// wins over the weight order when it names a live entry.
    fn emit(&self, preferred: Option<&str>) {
        let active = {
            let entries = self.entries.borrow();
            if entries.is_empty() {
                None
            } else {
                let best = entries
                    .values()
                    .fold(None::<&HoverEntry>, |best, entry| match best {
                        Some(b) if entry.weight <= b.weight => best,
                        _ => Some(entry),
                    });
                preferred
                    .and_then(|id| {
                        entries
                            .values()
                            .find(|entry| entry.payload.article_id == id)
                    })
                    .or(best)
                    .map(|entry| entry.payload.clone())
            }
        };

        if let Some(payload) = &active {
            self.promote(payload);
        }
        self.publish(active);
    }

    /// Move `payload`'s article to the most-recent end of the stack,
    /// evicting the oldest entry past the cap.
    fn promote(&self, payload: &HoverPayload) {
        let mut order = self.stack_order.borrow_mut();
        if let Some(pos) = order.iter().position(|id| *id == payload.article_id) {
            order.remove(pos);
        }
        order.push(payload.article_id.clone());
        self.stack_values
            .borrow_mut()
            .insert(payload.article_id.clone(), payload.clone());
        if order.len() > STACK_LIMIT {
            let evicted = order.remove(0);
            self.stack_values.borrow_mut().remove(&evicted);
        }
    }

    fn publish(&self, active: Option<HoverPayload>) {
        let stack = {
            let order = self.stack_order.borrow();
            let values = self.stack_values.borrow();
            order
                .iter()
                .filter_map(|id| values.get(id).cloned())
                .collect()
        };
        self.state.set(HoverState { active, stack });
    }

    fn has_pointer_entries(&self) -> bool {
        self.entries
            .borrow()
            .keys()
            .any(|(source, _)| *source == HoverSource::Pointer)
    }
}

impl std::fmt::Debug for HoverImageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HoverImageStore")
            .field("entries", &self.entries.borrow().len())
            .field("stack", &self.stack_order.borrow().len())
            .finish()
    }
}

/// Build the hover payload for an article, or `None` when the article has no
/// id or no cover URL.
fn payload_from(article: &Article) -> Option<HoverPayload> {
    if article.id.is_empty() {
        return None;
    }
    let cover = article.cover.as_ref()?;
    if cover.url.is_empty() {
        return None;
    }
    let alt = cover
        .alt
        .clone()
        .filter(|alt| !alt.is_empty())
        .or_else(|| Some(article.title.clone()).filter(|t| !t.is_empty()))
        .unwrap_or_else(|| "Article cover".to_owned());
    let title = if article.title.is_empty() {
        "Untitled".to_owned()
    } else {
        article.title.clone()
    };
    Some(HoverPayload {
        article_id: article.id.clone(),
        scale: article.scale.or(cover.scale).unwrap_or_default(),
        src: cover.url.clone(),
        alt,
        title,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Cover;

    fn article(id: &str, title: &str) -> Article {
        Article {
            id: id.into(),
            title: title.into(),
            slug: title.to_lowercase().replace(' ', "-"),
            cover: Some(Cover {
                url: format!("/media/{id}.jpg"),
                alt: None,
                scale: None,
            }),
            ..Article::default()
        }
    }

    #[test]
    fn viewport_weight_picks_heaviest_entry() {
        let store = HoverImageStore::new();
        store.set_from_viewport(&article("a", "Alpha"), 0.3);
        store.set_from_viewport(&article("b", "Beta"), 0.9);
        store.set_from_viewport(&article("c", "Gamma"), 0.5);

        // Re-aggregate without a preferred id.
        store.clear("c", None);
        let state = store.state().get();
        assert_eq!(state.active.expect("active").article_id, "b");
    }

    #[test]
    fn latest_signal_is_preferred_over_weight() {
        let store = HoverImageStore::new();
        store.set_from_viewport(&article("a", "Alpha"), 0.9);
        store.set_from_viewport(&article("b", "Beta"), 0.2);

        let state = store.state().get();
        assert_eq!(
            state.active.expect("active").article_id,
            "b",
            "the article that just signalled wins while its entry is live"
        );
    }

    #[test]
    fn pointer_outweighs_any_viewport_ratio() {
        let store = HoverImageStore::new();
        store.set_from_viewport(&article("a", "Alpha"), 1.0);
        store.set_from_pointer(&article("b", "Beta"));
        store.set_from_viewport(&article("c", "Gamma"), 1.0);

        store.clear("c", Some(HoverSource::Viewport));
        let state = store.state().get();
        assert_eq!(state.active.expect("active").article_id, "b");
    }

    #[test]
    fn non_finite_ratio_is_coerced_to_zero() {
        let store = HoverImageStore::new();
        store.set_from_viewport(&article("a", "Alpha"), f64::NAN);
        store.set_from_viewport(&article("b", "Beta"), 0.1);

        store.clear("b", None);
        let state = store.state().get();
        assert_eq!(
            state.active.expect("active").article_id,
            "a",
            "NaN entry survives with weight zero"
        );
    }

    #[test]
    fn article_without_cover_or_id_is_ignored() {
        let store = HoverImageStore::new();
        let mut no_cover = article("a", "Alpha");
        no_cover.cover = None;
        store.set_from_viewport(&no_cover, 0.9);

        let mut no_id = article("", "Nameless");
        no_id.id = String::new();
        store.set_from_pointer(&no_id);

        assert_eq!(store.state().get(), HoverState::default());
    }

    #[test]
    fn clearing_last_pointer_clears_everything() {
        let store = HoverImageStore::new();
        store.set_from_viewport(&article("a", "Alpha"), 0.8);
        store.set_from_pointer(&article("a", "Alpha"));

        store.clear("a", Some(HoverSource::Pointer));
        let state = store.state().get();
        assert!(state.active.is_none(), "no pointer left, nothing active");
        assert!(
            !state.stack.is_empty(),
            "the recency stack survives for exit transitions"
        );
    }

    #[test]
    fn clearing_viewport_keeps_pointer_active() {
        let store = HoverImageStore::new();
        store.set_from_pointer(&article("a", "Alpha"));
        store.set_from_viewport(&article("a", "Alpha"), 0.4);

        store.clear("a", Some(HoverSource::Viewport));
        let state = store.state().get();
        assert_eq!(state.active.expect("active").article_id, "a");
    }

    #[test]
    fn clear_of_unknown_article_is_a_noop() {
        let store = HoverImageStore::new();
        store.set_from_viewport(&article("a", "Alpha"), 0.5);
        let before = store.state().version();

        store.clear("ghost", None);
        store.clear("ghost", Some(HoverSource::Pointer));
        assert_eq!(store.state().version(), before);
    }

    #[test]
    fn stack_is_bounded_and_deduplicated() {
        let store = HoverImageStore::new();
        for i in 0..(STACK_LIMIT + 5) {
            store.set_from_viewport(&article(&format!("a{i}"), "Title"), 0.5);
        }
        // Re-hover the newest article; the stack must not grow.
        store.set_from_viewport(&article(&format!("a{}", STACK_LIMIT + 4), "Title"), 0.6);

        let state = store.state().get();
        assert_eq!(state.stack.len(), STACK_LIMIT);
        let newest = state.stack.last().expect("non-empty");
        assert_eq!(newest.article_id, format!("a{}", STACK_LIMIT + 4));
    }

    #[test]
    fn payload_falls_back_for_alt_title_and_scale() {
        let mut art = article("a", "");
        art.cover = Some(Cover {
            url: "/media/a.jpg".into(),
            alt: None,
            scale: Some(ImageScale::Small),
        });
        let payload = payload_from(&art).expect("payload");
        assert_eq!(payload.alt, "Article cover");
        assert_eq!(payload.title, "Untitled");
        assert_eq!(payload.scale, ImageScale::Small);

        let with_override = Article {
            scale: Some(ImageScale::Large),
            ..art
        };
        let payload = payload_from(&with_override).expect("payload");
        assert_eq!(payload.scale, ImageScale::Large, "article scale wins");
    }

    #[test]
    fn reset_drops_entries_and_stack() {
        let store = HoverImageStore::new();
        store.set_from_pointer(&article("a", "Alpha"));
        store.set_from_viewport(&article("b", "Beta"), 0.7);

        store.reset();
        assert_eq!(store.state().get(), HoverState::default());
    }
}
