#![forbid(unsafe_code)]

//! ReZ client persistence layer.
//!
//! This crate provides the key-value storage foundation the ReZ client
//! core builds on:
//!
//! - [`KvBackend`] - Pluggable string-keyed async-storage-style backend
//! - [`MemoryStorage`] - In-memory backend (testing, ephemeral)
//! - `FileStorage` - JSON file backend (requires `file-storage`)
//! - [`Debouncer`] - Single-slot write coalescer
//! - [`ModeStore`] - Allow-list-validated scalar with debounced persistence
//!
//! # Role in the system
//! Every persisted collection in the client (favorite stores, recently
//! viewed items, the browsing mode) goes through a [`KvBackend`]. Each
//! consumer owns a disjoint key space, so the backend's own locking is
//! the only synchronization required.
//!
//! # Failure model
//! Backend rejection means "value unavailable", never fatal. Consumers
//! keep their previous in-memory state on read failure and treat a failed
//! write as not-applied. Nothing in this crate panics on storage failure.

pub mod backend;
pub mod debounce;
pub mod mode;

pub use backend::{KvBackend, MemoryStorage, StorageError, StorageResult};
pub use debounce::Debouncer;
pub use mode::ModeStore;

#[cfg(feature = "file-storage")]
pub use backend::FileStorage;
