//! Error types for metricspace-storage

use thiserror::Error;

/// Result type alias for metricspace-storage operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in metricspace-storage
///
/// Backends return these; [`PersistenceStore`](crate::PersistenceStore)
/// logs and absorbs them.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from metricspace-core
    #[error("Core error: {0}")]
    Core(#[from] metricspace_core::Error),

    /// The storage engine reported a failure
    #[error("Backend error: {message}")]
    Backend {
        /// What the engine reported
        message: String,
    },

    /// A write would exceed the backend's capacity
    #[error("Quota exceeded writing '{key}': {needed} bytes needed, {quota} allowed")]
    QuotaExceeded {
        /// Key being written
        key: String,
        /// Total bytes the store would hold after the write
        needed: usize,
        /// Capacity in bytes
        quota: usize,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wraps any engine error as [`Error::Backend`].
    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        Error::Backend {
            message: err.to_string(),
        }
    }
}
