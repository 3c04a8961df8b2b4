//! Best-effort JSON persistence over a [`StorageBackend`].
//!
//! Nothing here returns an error to the caller. Reads fall back to the
//! caller's default and writes that fail are logged and dropped, so a broken
//! or full backend degrades the app to in-memory state instead of crashing it.

use std::sync::Arc;

use metricspace_core::events::{attrs, emit_best_effort};
use metricspace_core::{EventSink, NullSink};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::memory::MemoryBackend;
use crate::traits::StorageBackend;

/// Event emitted after every successful write.
pub const STORAGE_WRITE_EVENT: &str = "storage_write";

/// Durable key → JSON value store.
pub struct PersistenceStore {
    backend: Box<dyn StorageBackend>,
    events: Arc<dyn EventSink>,
}

impl PersistenceStore {
    /// Creates a store over `backend`, reporting writes to `events`.
    pub fn new<B: StorageBackend + 'static>(backend: B, events: Arc<dyn EventSink>) -> Self {
        Self {
            backend: Box::new(backend),
            events,
        }
    }

    /// An unbounded in-memory store that discards analytics.
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new(), Arc::new(NullSink))
    }

    /// Name of the underlying backend.
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Stored value for `key`, or `initial` if absent or unreadable.
    pub fn read<T: DeserializeOwned>(&self, key: &str, initial: T) -> T {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return initial,
            Err(e) => {
                tracing::warn!(
                    key,
                    backend = self.backend.name(),
                    error = %e,
                    "Storage read failed"
                );
                return initial;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "Ignoring unreadable stored value");
                initial
            }
        }
    }

    /// Serializes `value` and stores it under `key`, replacing any previous
    /// value.
    pub fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let serialized = match serde_json::to_string(value) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(key, error = %e, "Value not serializable; write skipped");
                return;
            }
        };
        if let Err(e) = self.backend.put(key, &serialized) {
            tracing::warn!(key, backend = self.backend.name(), error = %e, "Storage write failed");
            return;
        }
        tracing::debug!(key, size = serialized.len(), "Stored value");
        emit_best_effort(
            self.events.as_ref(),
            STORAGE_WRITE_EVENT,
            &attrs([
                ("key", serde_json::Value::from(key)),
                ("size", serde_json::Value::from(serialized.len())),
            ]),
        );
    }

    /// Deletes `key`. Removing an absent key is a no-op.
    pub fn remove(&self, key: &str) {
        if let Err(e) = self.backend.delete(key) {
            tracing::warn!(key, backend = self.backend.name(), error = %e, "Storage remove failed");
        }
    }

    /// All stored keys beginning with `prefix`, sorted.
    pub fn list_keys(&self, prefix: &str) -> Vec<String> {
        match self.backend.keys(prefix) {
            Ok(mut keys) => {
                keys.sort();
                keys
            }
            Err(e) => {
                tracing::warn!(
                    prefix,
                    backend = self.backend.name(),
                    error = %e,
                    "Storage key listing failed"
                );
                Vec::new()
            }
        }
    }
}

impl std::fmt::Debug for PersistenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceStore")
            .field("backend", &self.backend.name())
            .finish()
    }
}
