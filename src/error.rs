//! Error types for lifecycle-context operations.

use thiserror::Error;

/// Result type alias for context operations.
pub type Result<T> = std::result::Result<T, ContextError>;

/// Error taxonomy for context handling.
///
/// Missing data (absent config keys, absent credentials, no context store)
/// is deliberately **not** represented here: those conditions resolve to
/// empty or `None` results. Only remote-call failures, malformed payloads,
/// and API-dependent calls on an unauthenticated context are errors.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ContextError {
    /// An API-dependent call was made on a context without a remote client.
    ///
    /// Normalizing a credential-less lifecycle (UNINSTALL, CONFIGURATION)
    /// is not an error; the error surfaces only when the resulting context
    /// is asked to reach the remote API.
    #[error("context is not authenticated")]
    Unauthenticated,

    /// The raw lifecycle payload could not be decoded.
    #[error("malformed lifecycle payload: {message}")]
    Payload {
        /// Decoder failure detail.
        message: String,
    },

    /// The context store collaborator failed.
    #[error("context store error: {message}")]
    Store {
        /// Store failure detail.
        message: String,
    },

    /// A device metadata or state lookup failed.
    ///
    /// One failed lookup fails the enclosing aggregate call; no partial
    /// results are returned.
    #[error("device lookup failed for {device_id}: {message}")]
    Device {
        /// Device whose lookup failed.
        device_id: String,
        /// Lookup failure detail.
        message: String,
    },
}

impl ContextError {
    /// Returns `true` if this error is the unauthenticated-context condition.
    #[must_use]
    pub const fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthenticated)
    }
}
