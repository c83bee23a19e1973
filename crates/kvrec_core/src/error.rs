//! Error types for kvrec core.

use crate::record::ValidationError;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in kvrec core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The record does not exist (or its stored payload is unreadable).
    #[error("{collection} record not found: {id}")]
    NotFound {
        /// The collection searched.
        collection: String,
        /// The id that was not found.
        id: String,
    },

    /// Input fields or a stored payload failed schema validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The underlying store call failed.
    #[error("storage error: {0}")]
    Storage(#[from] kvrec_storage::StorageError),

    /// A record could not be serialized for storage.
    #[error("encoding error: {0}")]
    Encode(#[from] serde_json::Error),

    /// The request itself is malformed (unknown operation, missing id).
    #[error("invalid request: {message}")]
    InvalidRequest {
        /// Description of the problem.
        message: String,
    },

    /// The configuration is invalid or could not be loaded.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the problem.
        message: String,
    },
}

/// Coarse classification of a [`CoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The record is absent.
    NotFound,
    /// Input or stored data is malformed.
    Validation,
    /// The store or serialization failed.
    Storage,
    /// Configuration problem, raised before any operation runs.
    Config,
}

impl ErrorKind {
    /// Returns a stable lowercase name for the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Validation => "validation",
            Self::Storage => "storage",
            Self::Config => "config",
        }
    }
}

impl CoreError {
    /// Creates a not found error.
    pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Creates an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Classifies the error.
    ///
    /// Serialization failures count as storage failures.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Validation(_) | Self::InvalidRequest { .. } => ErrorKind::Validation,
            Self::Storage(_) | Self::Encode(_) => ErrorKind::Storage,
            Self::Config { .. } => ErrorKind::Config,
        }
    }
}
