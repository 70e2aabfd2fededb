//! String-keyed storage backends.
//!
//! This module provides the [`KvBackend`] trait and its built-in
//! implementations. The trait mirrors the async-storage surface the
//! client consumes: per-key get/set/remove plus batch helpers.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      KvBackend                                │
//! │   - MemoryStorage: in-memory (testing, ephemeral)             │
//! │   - FileStorage: JSON file (requires file-storage)            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Invariants
//!
//! 1. **Graceful degradation**: Storage failures never panic; operations return `Result`.
//! 2. **Atomic writes**: File storage uses write-rename pattern to prevent corruption.
//! 3. **Lenient loads**: Missing or corrupt entries are skipped, never fatal.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | `StorageError::Io` | File I/O failure | Returns error, memory unaffected |
//! | `StorageError::Serialization` | JSON encode/decode | Entry skipped, logged |
//! | `StorageError::Corruption` | Poisoned lock, bad format | Returns error |
//! | Missing key | First run, cleared value | `Ok(None)` |

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

// ─────────────────────────────────────────────────────────────────────────────
// Error Types
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur during storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// I/O error during file operations.
    Io(std::io::Error),
    /// Serialization or deserialization error.
    #[cfg(feature = "file-storage")]
    Serialization(String),
    /// Storage state is corrupted (poisoned lock, invalid format).
    Corruption(String),
    /// Backend is not available (e.g., unwritable directory).
    Unavailable(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "file-storage")]
            StorageError::Serialization(msg) => write!(f, "serialization error: {msg}"),
            StorageError::Corruption(msg) => write!(f, "storage corruption: {msg}"),
            StorageError::Unavailable(msg) => write!(f, "storage unavailable: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            #[cfg(feature = "file-storage")]
            StorageError::Serialization(_) => None,
            StorageError::Corruption(_) => None,
            StorageError::Unavailable(_) => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

// ─────────────────────────────────────────────────────────────────────────────
// Backend Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Trait for pluggable string-keyed storage backends.
///
/// Implementations must be thread-safe (`Send + Sync`) so controllers
/// can share a backend behind an `Arc`.
///
/// # Implementation Notes
///
/// - `get_item` returns `Ok(None)` for missing keys; absence is not an error.
/// - Mutations should be atomic per call (no partially written values).
/// - Batch helpers have defaults built from the per-key operations;
///   backends may override them with something cheaper.
pub trait KvBackend: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Read the value stored under `key`, if any.
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove the value stored under `key`. Removing a missing key is a no-op.
    fn remove_item(&self, key: &str) -> StorageResult<()>;

    /// Read several keys at once. Result order matches `keys`.
    fn multi_get(&self, keys: &[&str]) -> StorageResult<Vec<Option<String>>> {
        keys.iter().map(|k| self.get_item(k)).collect()
    }

    /// Remove several keys at once.
    fn multi_remove(&self, keys: &[&str]) -> StorageResult<()> {
        for k in keys {
            self.remove_item(k)?;
        }
        Ok(())
    }

    /// Remove every stored value.
    fn clear(&self) -> StorageResult<()>;

    /// Check if the backend is available and functional.
    fn is_available(&self) -> bool {
        true
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory Storage (always available)
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory storage backend for testing and ephemeral state.
///
/// Values are lost when the process exits. Useful for:
/// - Unit testing controllers without file I/O
/// - Sessions that don't need cross-run persistence
#[derive(Default)]
pub struct MemoryStorage {
    data: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create memory storage pre-populated with entries.
    #[must_use]
    pub fn with_entries(entries: HashMap<String, String>) -> Self {
        Self {
            data: RwLock::new(entries),
        }
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.read().map(|g| g.len()).unwrap_or(0)
    }

    /// Whether the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KvBackend for MemoryStorage {
    fn name(&self) -> &str {
        "MemoryStorage"
    }

    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let guard = self
            .data
            .read()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        Ok(guard.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        guard.remove(key);
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
        guard.clear();
        Ok(())
    }
}

impl fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStorage")
            .field("entries", &self.len())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Storage (requires file-storage feature)
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "file-storage")]
mod file_storage {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::fs::{self, File};
    use std::io::{BufReader, BufWriter, Write};
    use std::path::{Path, PathBuf};

    /// File format for stored values (JSON).
    #[derive(Serialize, Deserialize)]
    struct StoreFile {
        /// Format version for future migrations.
        format_version: u32,
        /// Map of key -> entry.
        entries: HashMap<String, FileEntry>,
    }

    /// Serialized entry in the store file.
    #[derive(Serialize, Deserialize)]
    struct FileEntry {
        /// Base64-encoded value for binary safety.
        value_base64: String,
    }

    impl StoreFile {
        const FORMAT_VERSION: u32 = 1;

        fn new() -> Self {
            Self {
                format_version: Self::FORMAT_VERSION,
                entries: HashMap::new(),
            }
        }
    }

    /// File-based storage backend using JSON.
    ///
    /// The whole key space is held in memory and mirrored to a single
    /// JSON file with an atomic write-rename pattern on every mutation.
    ///
    /// # File Format
    ///
    /// ```json
    /// {
    ///   "format_version": 1,
    ///   "entries": {
    ///     "rez:browse-mode": { "value_base64": "bmVhci11" }
    ///   }
    /// }
    /// ```
    ///
    /// # Atomic Writes
    ///
    /// 1. Write to `{path}.tmp`
    /// 2. Flush and sync
    /// 3. Rename `{path}.tmp` -> `{path}`
    pub struct FileStorage {
        path: PathBuf,
        cache: RwLock<HashMap<String, String>>,
    }

    impl FileStorage {
        /// Open file storage at the given path.
        ///
        /// The file does not need to exist. An unreadable or corrupt file
        /// is logged and treated as empty; stored state is a cache, never
        /// a reason to fail startup.
        #[must_use]
        pub fn open(path: impl AsRef<Path>) -> Self {
            let path = path.as_ref().to_path_buf();
            let cache = load_lenient(&path);
            Self {
                path,
                cache: RwLock::new(cache),
            }
        }

        /// Path of the backing file.
        #[must_use]
        pub fn path(&self) -> &Path {
            &self.path
        }

        fn temp_path(&self) -> PathBuf {
            let mut tmp = self.path.clone();
            tmp.set_extension("json.tmp");
            tmp
        }

        /// Rewrite the backing file from the in-memory map.
        fn persist(&self, snapshot: &HashMap<String, String>) -> StorageResult<()> {
            use base64::Engine;

            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }

            let mut store_file = StoreFile::new();
            for (key, value) in snapshot {
                store_file.entries.insert(
                    key.clone(),
                    FileEntry {
                        value_base64: base64::engine::general_purpose::STANDARD
                            .encode(value.as_bytes()),
                    },
                );
            }

            // Write to temp file first (atomic pattern)
            let tmp_path = self.temp_path();
            {
                let file = File::create(&tmp_path)?;
                let mut writer = BufWriter::new(file);
                serde_json::to_writer_pretty(&mut writer, &store_file).map_err(|e| {
                    StorageError::Serialization(format!("failed to serialize store: {e}"))
                })?;
                writer.flush()?;
                writer.get_ref().sync_all()?;
            }
            fs::rename(&tmp_path, &self.path)?;

            tracing::debug!(
                path = %self.path.display(),
                entries = snapshot.len(),
                "persisted key-value store"
            );
            Ok(())
        }
    }

    /// Load the store file, skipping anything unreadable.
    fn load_lenient(path: &Path) -> HashMap<String, String> {
        use base64::Engine;

        if !path.exists() {
            // First run - nothing stored yet
            return HashMap::new();
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to open store file, starting empty");
                return HashMap::new();
            }
        };

        let store_file: StoreFile = match serde_json::from_reader(BufReader::new(file)) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to parse store file, starting empty");
                return HashMap::new();
            }
        };

        if store_file.format_version != StoreFile::FORMAT_VERSION {
            tracing::warn!(
                stored = store_file.format_version,
                expected = StoreFile::FORMAT_VERSION,
                "store file format version mismatch, ignoring stored values"
            );
            return HashMap::new();
        }

        let mut result = HashMap::new();
        for (key, entry) in store_file.entries {
            let bytes = match base64::engine::general_purpose::STANDARD.decode(&entry.value_base64)
            {
                Ok(b) => b,
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "failed to decode stored value, skipping");
                    continue;
                }
            };
            match String::from_utf8(bytes) {
                Ok(value) => {
                    result.insert(key, value);
                }
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "stored value is not valid UTF-8, skipping");
                }
            }
        }
        result
    }

    impl KvBackend for FileStorage {
        fn name(&self) -> &str {
            "FileStorage"
        }

        fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
            let guard = self
                .cache
                .read()
                .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
            Ok(guard.get(key).cloned())
        }

        fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
            let mut guard = self
                .cache
                .write()
                .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
            guard.insert(key.to_string(), value.to_string());
            self.persist(&guard)
        }

        fn remove_item(&self, key: &str) -> StorageResult<()> {
            let mut guard = self
                .cache
                .write()
                .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
            if guard.remove(key).is_none() {
                return Ok(());
            }
            self.persist(&guard)
        }

        fn clear(&self) -> StorageResult<()> {
            let mut guard = self
                .cache
                .write()
                .map_err(|_| StorageError::Corruption("lock poisoned".into()))?;
            guard.clear();
            if self.path.exists() {
                fs::remove_file(&self.path)?;
            }
            Ok(())
        }

        fn is_available(&self) -> bool {
            // Check if we can write to the directory
            if let Some(parent) = self.path.parent() {
                if !parent.exists() {
                    return fs::create_dir_all(parent).is_ok();
                }
                let test_path = parent.join(".rez_test_write");
                if fs::write(&test_path, b"test").is_ok() {
                    let _ = fs::remove_file(&test_path);
                    return true;
                }
            }
            false
        }
    }

    impl fmt::Debug for FileStorage {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("FileStorage")
                .field("path", &self.path)
                .finish()
        }
    }
}

#[cfg(feature = "file-storage")]
pub use file_storage::FileStorage;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
