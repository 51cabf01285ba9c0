//! Error types for Threadline.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// A shared error type for the whole workspace.
///
/// Store operations never produce these for normal-domain conditions
/// (a missing thread is a no-op, not an error). They come out of the
/// injected capabilities: persistence, credentials, and the asynchronous
/// reply/delete/reference-data services.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ThreadlineError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Data access error (blob store / snapshot layer)
    #[error("Data access error: {0}")]
    DataAccess(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Snapshot schema migration error
    #[error("Migration error: {0}")]
    Migration(String),

    /// No credential is present for a gated operation
    #[error("Not authenticated: {0}")]
    Unauthenticated(String),

    /// Caller supplied input the domain rejects (empty message, bad OTP, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A send is already outstanding for this thread
    #[error("A reply is still pending for thread '{thread_id}'")]
    SendInFlight { thread_id: String },

    /// An external service failed or answered negatively
    #[error("Service error: {0}")]
    Service(String),

    /// An awaited external call did not settle in time
    #[error("Timed out after {millis}ms: {operation}")]
    Timeout { operation: String, millis: u64 },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ThreadlineError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a DataAccess error
    pub fn data_access(message: impl Into<String>) -> Self {
        Self::DataAccess(message.into())
    }

    /// Creates a Migration error
    pub fn migration(message: impl Into<String>) -> Self {
        Self::Migration(message.into())
    }

    /// Creates an InvalidInput error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Creates a Service error
    pub fn service(message: impl Into<String>) -> Self {
        Self::Service(message.into())
    }

    /// Creates a Timeout error. Durations beyond `u64::MAX` ms saturate.
    pub fn timeout(operation: impl Into<String>, after: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            millis: u64::try_from(after.as_millis()).unwrap_or(u64::MAX),
        }
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a serialization error
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }

    /// Check if this is a rejected concurrent send
    pub fn is_send_in_flight(&self) -> bool {
        matches!(self, Self::SendInFlight { .. })
    }

    /// Check if this is a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Check if this is an authentication failure
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthenticated(_))
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for ThreadlineError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for ThreadlineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for ThreadlineError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for ThreadlineError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<version_migrate::MigrationError> for ThreadlineError {
    fn from(err: version_migrate::MigrationError) -> Self {
        use version_migrate::MigrationError;

        match err {
            MigrationError::DeserializationError(_) | MigrationError::SerializationError(_) => {
                Self::Serialization {
                    format: "migration".to_string(),
                    message: err.to_string(),
                }
            }
            MigrationError::IoError { .. } => Self::Io {
                message: err.to_string(),
            },
            _ => Self::Migration(err.to_string()),
        }
    }
}

impl From<anyhow::Error> for ThreadlineError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<String> for ThreadlineError {
    fn from(err: String) -> Self {
        Self::Internal(err)
    }
}

/// A type alias for `Result<T, ThreadlineError>`.
pub type Result<T> = std::result::Result<T, ThreadlineError>;
