//! Favorite and frequently visited stores.
//!
//! [`FavoriteStores`] presents a derived, filtered, sorted view over the
//! persisted store set and keeps it consistent with storage through
//! reload-reconcile: every mutator rewrites the full persisted set, then
//! rebuilds the view from it. The view is always a pure function of what
//! is on disk, so a concurrent refresh can never clobber a half-applied
//! local patch.
//!
//! # Visibility and order
//!
//! A store is visible iff it is bookmarked or has been visited at least
//! [`MIN_VISITS_TO_SHOW`] times. Bookmarked stores sort first, most
//! recently bookmarked on top; the rest sort by visit count, then by
//! recency of the last visit.

use std::cmp::Ordering;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use rez_storage::{KvBackend, StorageResult};

use crate::clock::Clock;

/// Storage key for the persisted store set.
pub const FAVORITES_KEY: &str = "rez:favorite-stores:v1";

/// Minimum visit count for an unbookmarked store to appear in the view.
pub const MIN_VISITS_TO_SHOW: u32 = 1;

/// Aggregated user rating.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Rating {
    /// Average rating value.
    pub value: f64,
    /// Number of ratings aggregated.
    pub count: u32,
}

/// A store record in the persisted set.
///
/// Records exist for every store the user has interacted with; the
/// visibility filter decides which of them surface in the view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteStore {
    /// Stable store identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Image URL.
    pub image: String,
    /// Aggregated rating.
    #[serde(default)]
    pub rating: Rating,
    /// Street address.
    pub address: String,
    /// Optional short description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Estimated delivery time, e.g. "25-30 min".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_time: Option<String>,
    /// Cashback percentage offered by the store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cashback_percentage: Option<f64>,
    /// URL slug for deep links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Explicit user bookmark.
    #[serde(default)]
    pub is_favorited: bool,
    /// Number of recorded visits.
    #[serde(default)]
    pub visit_count: u32,
    /// Timestamp of the most recent visit (ms since epoch).
    #[serde(default)]
    pub last_visited: u64,
    /// Timestamp of the most recent bookmark toggle-on; cleared on
    /// un-bookmark.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<u64>,
}

/// Display attributes of a store, used to create or refresh a record
/// when a visit is tracked.
#[derive(Debug, Clone, Default)]
pub struct StoreProfile {
    /// Stable store identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Image URL.
    pub image: String,
    /// Aggregated rating.
    pub rating: Rating,
    /// Street address.
    pub address: String,
    /// Optional short description.
    pub description: Option<String>,
    /// Estimated delivery time.
    pub delivery_time: Option<String>,
    /// Cashback percentage.
    pub cashback_percentage: Option<f64>,
    /// URL slug.
    pub slug: Option<String>,
}

/// Controller over the persisted store set.
pub struct FavoriteStores {
    backend: Arc<dyn KvBackend>,
    clock: Arc<dyn Clock>,
    min_visits: u32,
    /// Visible view: filtered and sorted, rebuilt from storage.
    stores: Vec<FavoriteStore>,
    error: Option<String>,
}

impl FavoriteStores {
    /// Creates a controller and loads the visible view from storage.
    ///
    /// A read failure yields an empty view with the error recorded;
    /// construction itself never fails.
    pub fn new(backend: Arc<dyn KvBackend>, clock: Arc<dyn Clock>) -> Self {
        let mut this = Self {
            backend,
            clock,
            min_visits: MIN_VISITS_TO_SHOW,
            stores: Vec::new(),
            error: None,
        };
        this.refresh();
        this
    }

    /// Overrides the visit threshold for visibility.
    #[must_use]
    pub fn with_min_visits(mut self, min_visits: u32) -> Self {
        self.min_visits = min_visits;
        self.refresh();
        self
    }

    /// The visible stores, filtered and in canonical order.
    pub fn stores(&self) -> &[FavoriteStore] {
        &self.stores
    }

    /// The most recent storage error, if the last operation failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Synchronous bookmark lookup against the in-memory view.
    ///
    /// Bookmarked stores are always visible, so the view is authoritative
    /// for this check.
    pub fn is_favorited(&self, store_id: &str) -> bool {
        self.stores
            .iter()
            .any(|s| s.id == store_id && s.is_favorited)
    }

    /// Flips the bookmark flag for `store_id`.
    ///
    /// Returns the new flag value. An unknown id or a storage failure
    /// applies no change and returns `false`; failures are logged and
    /// recorded in [`error`](Self::error), never propagated.
    pub fn toggle_favorite(&mut self, store_id: &str) -> bool {
        let mut all = match self.read_all() {
            Ok(all) => all,
            Err(e) => {
                self.record_error("load favorite stores", &e);
                return false;
            }
        };

        let Some(store) = all.iter_mut().find(|s| s.id == store_id) else {
            tracing::debug!(store_id = %store_id, "toggle on untracked store ignored");
            return false;
        };

        store.is_favorited = !store.is_favorited;
        store.added_at = store.is_favorited.then(|| self.clock.now_ms());
        let now_favorited = store.is_favorited;

        if let Err(e) = self.write_all(&all) {
            self.record_error("persist favorite stores", &e);
            return false;
        }
        self.rebuild_view(all);
        now_favorited
    }

    /// Records a visit to the store described by `profile`.
    ///
    /// Inserts a record with `visit_count = 1` for a first visit, or
    /// increments the counter and refreshes the display attributes for a
    /// known store. Either way `last_visited` is stamped with the current
    /// time.
    pub fn track_visit(&mut self, profile: &StoreProfile) {
        let mut all = match self.read_all() {
            Ok(all) => all,
            Err(e) => {
                self.record_error("load favorite stores", &e);
                return;
            }
        };

        let now = self.clock.now_ms();
        match all.iter_mut().find(|s| s.id == profile.id) {
            Some(store) => {
                store.visit_count += 1;
                store.last_visited = now;
                store.name = profile.name.clone();
                store.image = profile.image.clone();
                store.rating = profile.rating;
                store.address = profile.address.clone();
                store.description = profile.description.clone();
                store.delivery_time = profile.delivery_time.clone();
                store.cashback_percentage = profile.cashback_percentage;
                store.slug = profile.slug.clone();
            }
            None => all.push(FavoriteStore {
                id: profile.id.clone(),
                name: profile.name.clone(),
                image: profile.image.clone(),
                rating: profile.rating,
                address: profile.address.clone(),
                description: profile.description.clone(),
                delivery_time: profile.delivery_time.clone(),
                cashback_percentage: profile.cashback_percentage,
                slug: profile.slug.clone(),
                is_favorited: false,
                visit_count: 1,
                last_visited: now,
                added_at: None,
            }),
        }

        if let Err(e) = self.write_all(&all) {
            self.record_error("persist favorite stores", &e);
            return;
        }
        self.rebuild_view(all);
    }

    /// Reloads the view from storage.
    ///
    /// On failure the previous view is kept and the error recorded.
    pub fn refresh(&mut self) {
        match self.read_all() {
            Ok(all) => self.rebuild_view(all),
            Err(e) => self.record_error("load favorite stores", &e),
        }
    }

    /// Removes the whole persisted set and empties the view.
    pub fn clear_all(&mut self) {
        if let Err(e) = self.backend.remove_item(FAVORITES_KEY) {
            self.record_error("clear favorite stores", &e);
            return;
        }
        self.stores.clear();
        self.error = None;
    }

    // --- Storage layer ---

    fn read_all(&self) -> StorageResult<Vec<FavoriteStore>> {
        let Some(raw) = self.backend.get_item(FAVORITES_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(stores) => Ok(stores),
            Err(e) => {
                // Corrupt payload degrades to an empty set, not an error
                tracing::warn!(error = %e, "corrupt favorite-store payload, starting empty");
                Ok(Vec::new())
            }
        }
    }

    fn write_all(&self, all: &[FavoriteStore]) -> StorageResult<()> {
        // Serializing our own derive cannot fail; treat it as a bug if it does
        let raw = serde_json::to_string(all).unwrap_or_else(|e| {
            tracing::error!(error = %e, "favorite-store serialization failed");
            "[]".to_string()
        });
        self.backend.set_item(FAVORITES_KEY, &raw)
    }

    fn rebuild_view(&mut self, all: Vec<FavoriteStore>) {
        let min_visits = self.min_visits;
        let mut visible: Vec<FavoriteStore> = all
            .into_iter()
            .filter(|s| s.is_favorited || s.visit_count >= min_visits)
            .collect();
        visible.sort_by(canonical_order);
        self.stores = visible;
        self.error = None;
    }

    fn record_error(&mut self, context: &str, e: &rez_storage::StorageError) {
        tracing::warn!(error = %e, backend = %self.backend.name(), "failed to {context}");
        self.error = Some(format!("failed to {context}: {e}"));
    }
}

impl std::fmt::Debug for FavoriteStores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FavoriteStores")
            .field("visible", &self.stores.len())
            .field("error", &self.error)
            .field("backend", &self.backend.name())
            .finish()
    }
}

/// Canonical view order: bookmarked first by bookmark recency, then by
/// visit count, then by last-visit recency.
fn canonical_order(a: &FavoriteStore, b: &FavoriteStore) -> Ordering {
    b.is_favorited
        .cmp(&a.is_favorited)
        .then_with(|| b.added_at.unwrap_or(0).cmp(&a.added_at.unwrap_or(0)))
        .then_with(|| b.visit_count.cmp(&a.visit_count))
        .then_with(|| b.last_visited.cmp(&a.last_visited))
}
