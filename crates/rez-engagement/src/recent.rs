//! Recently viewed stores and products.
//!
//! [`RecentlyViewed`] keeps one unified, recency-sorted list of the
//! stores and products the user opened. Writes are fire-and-forget: a
//! recorded view lands in storage immediately but the in-memory list
//! only catches up on the next [`refresh`](RecentlyViewed::refresh).
//! Screens refresh on focus, so the relaxation is invisible in practice
//! and keeps the record path cheap.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use rez_storage::{KvBackend, StorageResult};

use crate::clock::Clock;

/// Storage key for the persisted list.
pub const RECENTLY_VIEWED_KEY: &str = "rez:recently-viewed:v1";

/// What kind of entity a recent item refers to.
///
/// Together with the entity id this forms the unique key of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecentKind {
    /// A store page.
    Store,
    /// A product page.
    Product,
}

/// A recently viewed store or product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentItem {
    /// Entity identifier (unique together with `kind`).
    pub id: String,
    /// Entity kind.
    pub kind: RecentKind,
    /// Display name.
    pub name: String,
    /// Image URL.
    pub image: String,
    /// Rating value, when the entity has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    /// Street address (stores).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Price (products).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// Cashback percentage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cashback_percentage: Option<f64>,
    /// URL slug for deep links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// When the entity was last viewed (ms since epoch). Sort key.
    pub viewed_at: u64,
}

/// Controller over the recently-viewed list.
pub struct RecentlyViewed {
    backend: Arc<dyn KvBackend>,
    clock: Arc<dyn Clock>,
    items: Vec<RecentItem>,
    error: Option<String>,
}

impl RecentlyViewed {
    /// Creates a controller and loads the list from storage.
    pub fn new(backend: Arc<dyn KvBackend>, clock: Arc<dyn Clock>) -> Self {
        let mut this = Self {
            backend,
            clock,
            items: Vec::new(),
            error: None,
        };
        this.refresh();
        this
    }

    /// The list, most recently viewed first, as of the last refresh.
    pub fn items(&self) -> &[RecentItem] {
        &self.items
    }

    /// The most recent storage error, if the last operation failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Records a store view.
    ///
    /// Write-through upsert keyed by `(id, kind)`; the in-memory list is
    /// not touched until the next [`refresh`](Self::refresh).
    pub fn add_store(&mut self, item: RecentItem) {
        debug_assert_eq!(item.kind, RecentKind::Store);
        self.record(item);
    }

    /// Records a product view. Same write-through semantics as
    /// [`add_store`](Self::add_store).
    pub fn add_product(&mut self, item: RecentItem) {
        debug_assert_eq!(item.kind, RecentKind::Product);
        self.record(item);
    }

    /// Reloads the list from storage and sorts it by recency.
    ///
    /// On failure the previous list is kept and the error recorded.
    pub fn refresh(&mut self) {
        match self.read_all() {
            Ok(mut all) => {
                all.sort_by(|a, b| b.viewed_at.cmp(&a.viewed_at));
                self.items = all;
                self.error = None;
            }
            Err(e) => self.record_error("load recently viewed", &e),
        }
    }

    /// Removes the persisted list and empties the in-memory one
    /// synchronously.
    pub fn clear_all(&mut self) {
        if let Err(e) = self.backend.remove_item(RECENTLY_VIEWED_KEY) {
            self.record_error("clear recently viewed", &e);
            return;
        }
        self.items.clear();
        self.error = None;
    }

    // --- Storage layer ---

    fn record(&mut self, mut item: RecentItem) {
        let mut all = match self.read_all() {
            Ok(all) => all,
            Err(e) => {
                self.record_error("load recently viewed", &e);
                return;
            }
        };

        item.viewed_at = self.clock.now_ms();
        all.retain(|existing| !(existing.id == item.id && existing.kind == item.kind));
        all.push(item);

        if let Err(e) = self.write_all(&all) {
            self.record_error("persist recently viewed", &e);
        } else {
            self.error = None;
        }
    }

    fn read_all(&self) -> StorageResult<Vec<RecentItem>> {
        let Some(raw) = self.backend.get_item(RECENTLY_VIEWED_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(items) => Ok(items),
            Err(e) => {
                // Corrupt payload degrades to an empty list, not an error
                tracing::warn!(error = %e, "corrupt recently-viewed payload, starting empty");
                Ok(Vec::new())
            }
        }
    }

    fn write_all(&self, all: &[RecentItem]) -> StorageResult<()> {
        let raw = serde_json::to_string(all).unwrap_or_else(|e| {
            tracing::error!(error = %e, "recently-viewed serialization failed");
            "[]".to_string()
        });
        self.backend.set_item(RECENTLY_VIEWED_KEY, &raw)
    }

    fn record_error(&mut self, context: &str, e: &rez_storage::StorageError) {
        tracing::warn!(error = %e, backend = %self.backend.name(), "failed to {context}");
        self.error = Some(format!("failed to {context}: {e}"));
    }
}

impl std::fmt::Debug for RecentlyViewed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecentlyViewed")
            .field("items", &self.items.len())
            .field("error", &self.error)
            .field("backend", &self.backend.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use rez_storage::MemoryStorage;

    fn store_item(id: &str) -> RecentItem {
        RecentItem {
            id: id.to_string(),
            kind: RecentKind::Store,
            name: format!("Store {id}"),
            image: format!("https://img.example/{id}.jpg"),
            rating: Some(4.0),
            address: Some("12 Market Road".to_string()),
            price: None,
            cashback_percentage: Some(5.0),
            slug: None,
            viewed_at: 0,
        }
    }

    fn product_item(id: &str) -> RecentItem {
        RecentItem {
            id: id.to_string(),
            kind: RecentKind::Product,
            name: format!("Product {id}"),
            image: format!("https://img.example/{id}.jpg"),
            rating: Some(4.5),
            address: None,
            price: Some(199.0),
            cashback_percentage: None,
            slug: None,
            viewed_at: 0,
        }
    }

    fn controller() -> (Arc<MemoryStorage>, Arc<ManualClock>, RecentlyViewed) {
        let backend = Arc::new(MemoryStorage::new());
        let clock = Arc::new(ManualClock::starting_at(100));
        let recent = RecentlyViewed::new(backend.clone(), clock.clone());
        (backend, clock, recent)
    }

    #[test]
    fn starts_empty() {
        let (_, _, recent) = controller();
        assert!(recent.items().is_empty());
        assert!(recent.error().is_none());
    }

    #[test]
    fn add_is_invisible_until_refresh() {
        let (_, _, mut recent) = controller();
        recent.add_store(store_item("s1"));

        // Deliberate relaxation: write-through, reconcile later
        assert!(recent.items().is_empty());

        recent.refresh();
        assert_eq!(recent.items().len(), 1);
        assert_eq!(recent.items()[0].id, "s1");
        assert_eq!(recent.items()[0].viewed_at, 100);
    }

    #[test]
    fn refresh_sorts_most_recent_first() {
        let (_, clock, mut recent) = controller();
        clock.set(100);
        recent.add_store(store_item("a"));
        clock.set(300);
        recent.add_product(product_item("b"));
        clock.set(200);
        recent.add_store(store_item("c"));

        recent.refresh();
        let ids: Vec<&str> = recent.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn reviewing_updates_timestamp_without_duplicating() {
        let (_, clock, mut recent) = controller();
        recent.add_store(store_item("s1"));
        clock.set(500);
        recent.add_store(store_item("s1"));

        recent.refresh();
        assert_eq!(recent.items().len(), 1);
        assert_eq!(recent.items()[0].viewed_at, 500);
    }

    #[test]
    fn store_and_product_with_same_id_are_distinct() {
        let (_, clock, mut recent) = controller();
        recent.add_store(store_item("x"));
        clock.set(200);
        recent.add_product(product_item("x"));

        recent.refresh();
        assert_eq!(recent.items().len(), 2);
        assert_eq!(recent.items()[0].kind, RecentKind::Product);
        assert_eq!(recent.items()[1].kind, RecentKind::Store);
    }

    #[test]
    fn clear_all_is_synchronous() {
        let (backend, _, mut recent) = controller();
        recent.add_store(store_item("s1"));
        recent.refresh();
        assert_eq!(recent.items().len(), 1);

        recent.clear_all();
        assert!(recent.items().is_empty());
        assert!(backend.get_item(RECENTLY_VIEWED_KEY).unwrap().is_none());
    }

    #[test]
    fn corrupt_payload_degrades_to_empty() {
        let backend = Arc::new(MemoryStorage::new());
        backend.set_item(RECENTLY_VIEWED_KEY, "not json").unwrap();

        let recent = RecentlyViewed::new(backend, Arc::new(ManualClock::default()));
        assert!(recent.items().is_empty());
        assert!(recent.error().is_none());
    }

    #[test]
    fn caller_timestamp_is_overwritten() {
        let (_, _, mut recent) = controller();
        let mut item = store_item("s1");
        item.viewed_at = 999_999;
        recent.add_store(item);

        recent.refresh();
        assert_eq!(recent.items()[0].viewed_at, 100);
    }

    #[test]
    fn list_survives_reopen() {
        let (backend, clock, mut recent) = controller();
        recent.add_store(store_item("s1"));
        recent.add_product(product_item("p1"));

        let reopened = RecentlyViewed::new(backend, clock);
        assert_eq!(reopened.items().len(), 2);
    }
}
