//! Error types for metricspace-core

use thiserror::Error;

/// Result type alias for metricspace-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in metricspace-core
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Calculator input failed validation
    #[error("Validation error: {message}")]
    Validation {
        /// Field that failed validation, if any
        field: Option<String>,
        /// What went wrong
        message: String,
    },

    /// Calculator id is not in the catalog
    #[error("Unknown calculator: {id}")]
    UnknownCalculator {
        /// The id that was looked up
        id: String,
    },

    /// Plan id could not be parsed
    #[error("Unknown plan: {id}")]
    UnknownPlan {
        /// The id that was parsed
        id: String,
    },

    /// An event sink rejected an event
    #[error("Event sink error: {message}")]
    EventSink {
        /// What the sink reported
        message: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Creates a new validation error.
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Error::Validation {
            field: None,
            message: message.into(),
        }
    }

    /// Creates a new validation error with a field name.
    pub fn validation_field<F, M>(field: F, message: M) -> Self
    where
        F: Into<String>,
        M: Into<String>,
    {
        Error::Validation {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Creates a new event sink error.
    pub fn event_sink<S: Into<String>>(message: S) -> Self {
        Error::EventSink {
            message: message.into(),
        }
    }
}
