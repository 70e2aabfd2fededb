//! Browsing-mode persistence.
//!
//! [`ModeStore`] holds a small enumerable value (the app's browsing mode)
//! in memory, mirrors it durably through a [`KvBackend`], and coalesces
//! rapid repeated saves into a single durable write.
//!
//! Readers always see the most recent accepted value immediately; the
//! durable write lands after a quiet period driven by [`tick`](ModeStore::tick).
//! Absent or out-of-list persisted values fall back to the default as a
//! normal, non-error path.

use std::sync::Arc;
use std::time::Duration;

use crate::backend::KvBackend;
use crate::debounce::Debouncer;

/// Storage key for the persisted browsing mode.
pub const MODE_KEY: &str = "rez:browse-mode";

/// Quiet period before a mode change is written durably.
pub const MODE_WRITE_QUIET: Duration = Duration::from_millis(100);

/// Browsing modes the original client ships with.
pub const REZ_MODES: &[&str] = &["near-u", "mall", "cash", "prive"];

/// Default browsing mode.
pub const REZ_DEFAULT_MODE: &str = "near-u";

/// Allow-list-validated scalar with debounced persistence.
pub struct ModeStore {
    backend: Arc<dyn KvBackend>,
    allowed: &'static [&'static str],
    default: &'static str,
    current: String,
    writer: Debouncer<String>,
}

impl ModeStore {
    /// Creates a mode store over `backend` with the given allow-list.
    ///
    /// Loads the persisted value immediately. A missing, unreadable, or
    /// out-of-list value yields the default.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `default` is not in `allowed`.
    pub fn new(
        backend: Arc<dyn KvBackend>,
        allowed: &'static [&'static str],
        default: &'static str,
    ) -> Self {
        debug_assert!(
            allowed.contains(&default),
            "default mode must be in the allow-list"
        );

        let current = match backend.get_item(MODE_KEY) {
            Ok(Some(stored)) if allowed.iter().any(|m| *m == stored) => stored,
            Ok(Some(stored)) => {
                tracing::debug!(stored = %stored, default = %default, "persisted mode not in allow-list, using default");
                default.to_string()
            }
            Ok(None) => default.to_string(),
            Err(e) => {
                tracing::warn!(error = %e, backend = %backend.name(), "failed to load persisted mode, using default");
                default.to_string()
            }
        };

        Self {
            backend,
            allowed,
            default,
            current,
            writer: Debouncer::new(MODE_WRITE_QUIET),
        }
    }

    /// Creates a store with the ReZ client's modes and default.
    pub fn with_rez_modes(backend: Arc<dyn KvBackend>) -> Self {
        Self::new(backend, REZ_MODES, REZ_DEFAULT_MODE)
    }

    /// The current mode. Reflects the latest accepted save, whether or
    /// not the durable write has landed yet.
    pub fn current(&self) -> &str {
        &self.current
    }

    /// The allow-list this store validates against.
    pub fn allowed(&self) -> &'static [&'static str] {
        self.allowed
    }

    /// Whether a durable write is still waiting on its quiet period.
    pub fn write_pending(&self) -> bool {
        self.writer.is_pending()
    }

    /// Saves a new mode.
    ///
    /// Values outside the allow-list are rejected with a warning and no
    /// state change. Valid values update the in-memory mode synchronously
    /// and schedule a durable write; within a burst only the last value
    /// is persisted. Returns whether the value was accepted.
    pub fn save(&mut self, value: &str) -> bool {
        if !self.allowed.iter().any(|m| *m == value) {
            tracing::warn!(value = %value, "rejected mode outside allow-list");
            return false;
        }
        self.current = value.to_string();
        self.writer.schedule(value.to_string());
        true
    }

    /// Advances time by `delta`, performing the durable write if the
    /// quiet period has elapsed.
    ///
    /// A failed write is logged; the in-memory value stands and no error
    /// reaches the caller.
    pub fn tick(&mut self, delta: Duration) {
        if let Some(value) = self.writer.tick(delta) {
            self.write(&value);
        }
    }

    /// Forces any pending write out immediately.
    ///
    /// Call when the owning surface is about to go away (app background,
    /// screen teardown) so a burst's final value is not lost.
    pub fn flush(&mut self) {
        if let Some(value) = self.writer.flush() {
            self.write(&value);
        }
    }

    /// Removes the durable entry and resets to the default synchronously.
    ///
    /// Any pending write is cancelled.
    pub fn clear(&mut self) {
        self.writer.cancel();
        self.current = self.default.to_string();
        if let Err(e) = self.backend.remove_item(MODE_KEY) {
            tracing::warn!(error = %e, backend = %self.backend.name(), "failed to clear persisted mode");
        }
    }

    fn write(&self, value: &str) {
        if let Err(e) = self.backend.set_item(MODE_KEY, value) {
            tracing::warn!(error = %e, backend = %self.backend.name(), "failed to persist mode");
        }
    }
}

impl std::fmt::Debug for ModeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModeStore")
            .field("current", &self.current)
            .field("write_pending", &self.writer.is_pending())
            .field("backend", &self.backend.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryStorage;

    fn store() -> (Arc<MemoryStorage>, ModeStore) {
        let backend = Arc::new(MemoryStorage::new());
        let mode = ModeStore::with_rez_modes(backend.clone());
        (backend, mode)
    }

    #[test]
    fn starts_at_default_when_nothing_persisted() {
        let (_, mode) = store();
        assert_eq!(mode.current(), "near-u");
        assert!(!mode.write_pending());
    }

    #[test]
    fn loads_persisted_mode() {
        let backend = Arc::new(MemoryStorage::new());
        backend.set_item(MODE_KEY, "prive").unwrap();
        let mode = ModeStore::with_rez_modes(backend);
        assert_eq!(mode.current(), "prive");
    }

    #[test]
    fn corrupt_persisted_mode_falls_back_to_default() {
        let backend = Arc::new(MemoryStorage::new());
        backend.set_item(MODE_KEY, "not-a-mode").unwrap();
        let mode = ModeStore::with_rez_modes(backend);
        assert_eq!(mode.current(), "near-u");
    }

    #[test]
    fn save_updates_memory_synchronously() {
        let (backend, mut mode) = store();
        assert!(mode.save("mall"));
        assert_eq!(mode.current(), "mall");
        // Durable write has not landed yet
        assert!(backend.get_item(MODE_KEY).unwrap().is_none());
        assert!(mode.write_pending());
    }

    #[test]
    fn burst_persists_single_final_value() {
        let (backend, mut mode) = store();
        assert!(mode.save("mall"));
        assert!(mode.save("cash"));

        mode.tick(MODE_WRITE_QUIET);
        assert_eq!(
            backend.get_item(MODE_KEY).unwrap().as_deref(),
            Some("cash")
        );
        assert!(!mode.write_pending());
    }

    #[test]
    fn invalid_mode_rejected_without_change() {
        let backend = Arc::new(MemoryStorage::new());
        backend.set_item(MODE_KEY, "mall").unwrap();
        let mut mode = ModeStore::with_rez_modes(backend.clone());

        assert!(!mode.save("bogus"));
        assert_eq!(mode.current(), "mall");
        assert!(!mode.write_pending());
        assert_eq!(backend.get_item(MODE_KEY).unwrap().as_deref(), Some("mall"));
    }

    #[test]
    fn flush_writes_immediately() {
        let (backend, mut mode) = store();
        mode.save("cash");
        mode.flush();
        assert_eq!(backend.get_item(MODE_KEY).unwrap().as_deref(), Some("cash"));
    }

    #[test]
    fn clear_resets_and_cancels_pending_write() {
        let (backend, mut mode) = store();
        mode.save("prive");
        mode.clear();

        assert_eq!(mode.current(), "near-u");
        assert!(!mode.write_pending());
        // The pending "prive" write must never land
        mode.tick(MODE_WRITE_QUIET);
        assert!(backend.get_item(MODE_KEY).unwrap().is_none());
    }

    #[test]
    fn drop_with_pending_write_writes_nothing() {
        let backend = Arc::new(MemoryStorage::new());
        {
            let mut mode = ModeStore::with_rez_modes(backend.clone());
            mode.save("mall");
        }
        assert!(backend.get_item(MODE_KEY).unwrap().is_none());
    }

    #[test]
    fn save_after_fire_schedules_again() {
        let (backend, mut mode) = store();
        mode.save("mall");
        mode.tick(MODE_WRITE_QUIET);
        assert_eq!(backend.get_item(MODE_KEY).unwrap().as_deref(), Some("mall"));

        mode.save("cash");
        mode.tick(MODE_WRITE_QUIET);
        assert_eq!(backend.get_item(MODE_KEY).unwrap().as_deref(), Some("cash"));
    }
}
