//! Storage backend abstraction.

use crate::error::Result;

/// A string key → string value store.
///
/// Operations are synchronous and complete before returning. Implementations
/// use interior mutability so a backend can be shared behind `&self`.
pub trait StorageBackend: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Stored value for `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Deletes `key`. Deleting an absent key succeeds.
    fn delete(&self, key: &str) -> Result<()>;

    /// All keys starting with `prefix`.
    fn keys(&self, prefix: &str) -> Result<Vec<String>>;
}
