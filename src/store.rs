//! Single-slot-per-identifier mailbox shared by the ingestion and polling
//! endpoints.
//!
//! Each identifier holds at most one pending payload. A new [`RelayStore::put`]
//! overwrites whatever has not been taken yet (last write wins), and
//! [`RelayStore::take_and_clear`] removes the payload in the same step that
//! reads it, so every payload is delivered at most once.
//!
//! Entries live in a sharded [`DashMap`]: operations on unrelated identifiers
//! lock different shards and do not contend.

use std::sync::Arc;

use dashmap::DashMap;

/// Concurrent identifier → latest pending payload mapping.
///
/// Cloning is cheap and yields another handle to the same mapping.
/// Independently constructed stores share nothing.
#[derive(Debug, Clone, Default)]
pub struct RelayStore {
    entries: Arc<DashMap<String, String>>,
}

impl RelayStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `payload` as the pending value for `identifier`, silently
    /// discarding any value that was never taken.
    ///
    /// The empty string is a valid, distinct identifier here.
    pub fn put(&self, identifier: impl Into<String>, payload: impl Into<String>) {
        self.entries.insert(identifier.into(), payload.into());
    }

    /// Remove and return the pending payload for `identifier`, if any.
    ///
    /// Read and delete happen under one shard lock; two concurrent calls
    /// for the same identifier never both observe the same payload.
    #[must_use]
    pub fn take_and_clear(&self, identifier: &str) -> Option<String> {
        self.entries.remove(identifier).map(|(_, payload)| payload)
    }

    /// Number of identifiers currently holding a payload.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no identifier currently holds a payload.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
