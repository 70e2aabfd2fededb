#![forbid(unsafe_code)]

//! Persisted engagement collections for the ReZ client.
//!
//! Two controllers over [`rez_storage::KvBackend`]:
//!
//! - [`FavoriteStores`] - Bookmarked and frequently visited stores, with
//!   a visibility filter and a canonical sort
//! - [`RecentlyViewed`] - Stores and products the user recently opened,
//!   sorted by recency
//!
//! # Consistency model
//! Storage is the source of truth. Favorites mutators rewrite the
//! persisted set and rebuild the visible view from it (reload-reconcile);
//! recently-viewed writes are fire-and-forget, with the view catching up
//! on the next [`RecentlyViewed::refresh`].
//!
//! # Failure model
//! Storage failures never propagate: the controller logs, records a
//! human-readable error string, and keeps its previous view intact.

pub mod clock;
pub mod favorites;
pub mod recent;

pub use clock::{Clock, ManualClock, SystemClock};
pub use favorites::{FavoriteStores, FavoriteStore, Rating, StoreProfile, MIN_VISITS_TO_SHOW};
pub use recent::{RecentItem, RecentKind, RecentlyViewed};
