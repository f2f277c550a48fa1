//! # Tally Error Types
//!
//! Typed error handling for the rupee-tally backend.
//! Every operation returns `Result<T, TallyError>`; the HTTP layer turns the
//! error into a status code and a client-safe message.

use thiserror::Error;

/// Core error type for all tally operations
#[derive(Debug, Error)]
pub enum TallyError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A required verification field was absent or empty
    #[error("Missing fields")]
    MissingFields,

    /// Payment signature did not match the expected HMAC
    #[error("Invalid signature")]
    InvalidSignature,

    /// Access token missing, malformed, forged or expired
    #[error("Unauthorized")]
    Unauthorized,

    /// Payment gateway call failed
    #[error("Upstream error [{provider}]: {message}")]
    Upstream { provider: String, message: String },

    /// Persistence fault in the counter store
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TallyError {
    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            TallyError::MissingFields => 400,
            TallyError::InvalidSignature => 400,
            TallyError::Unauthorized => 403,
            TallyError::Configuration(_) => 500,
            TallyError::Upstream { .. } => 500,
            TallyError::Storage(_) => 500,
            TallyError::Serialization(_) => 500,
            TallyError::Internal(_) => 500,
        }
    }

    /// Message safe to show to a client.
    ///
    /// Gateway messages are passed through; storage and internal details
    /// stay in the logs.
    pub fn client_message(&self) -> String {
        match self {
            TallyError::MissingFields => "Missing fields".to_string(),
            TallyError::InvalidSignature => "Invalid signature".to_string(),
            TallyError::Unauthorized => "Unauthorized".to_string(),
            TallyError::Upstream { message, .. } => message.clone(),
            TallyError::Storage(_) => "Storage error".to_string(),
            TallyError::Configuration(_)
            | TallyError::Serialization(_)
            | TallyError::Internal(_) => "Internal server error".to_string(),
        }
    }

    /// Shorthand for a storage fault
    pub fn storage(message: impl Into<String>) -> Self {
        TallyError::Storage(message.into())
    }
}

/// Result type alias for tally operations
pub type TallyResult<T> = Result<T, TallyError>;
