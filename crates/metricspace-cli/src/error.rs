//! Error types for metricspace-cli

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias for metricspace-cli operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in metricspace-cli
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from metricspace-core
    #[error("{0}")]
    Core(#[from] metricspace_core::Error),

    /// Error from metricspace-gate, shown to the user verbatim
    #[error(transparent)]
    Gate(#[from] metricspace_gate::Error),

    /// Error from metricspace-storage
    #[error("Storage error: {0}")]
    Storage(#[from] metricspace_storage::Error),

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic
        message: String,
    },

    /// I/O error on a specific path
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Wraps an I/O error with the path it concerns.
    pub fn io_with_path(source: std::io::Error, path: &Path) -> Self {
        Error::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
