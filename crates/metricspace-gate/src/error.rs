//! Error types for metricspace-gate
//!
//! Access denials and exhausted quotas are not errors; the gate reports them
//! as values. These variants cover upstream failures whose message is shown
//! to the user as-is.

use thiserror::Error;

/// Result type alias for metricspace-gate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in metricspace-gate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from metricspace-core
    #[error("Core error: {0}")]
    Core(#[from] metricspace_core::Error),

    /// The operation needs a signed-in user
    #[error("You must be signed in to {action}")]
    NotAuthenticated {
        /// What the user tried to do
        action: String,
    },

    /// The payment provider did not report success
    #[error("Payment was not completed (status '{status}')")]
    Payment {
        /// Status string returned by the provider
        status: String,
    },

    /// The profile service returned something unusable
    #[error("Could not load your profile: {message}")]
    Profile {
        /// What went wrong
        message: String,
    },
}

impl Error {
    /// Creates a new not-authenticated error.
    pub fn not_authenticated<S: Into<String>>(action: S) -> Self {
        Error::NotAuthenticated {
            action: action.into(),
        }
    }

    /// Creates a new profile error.
    pub fn profile<S: Into<String>>(message: S) -> Self {
        Error::Profile {
            message: message.into(),
        }
    }
}
