//! Server error types and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use kvrec_core::{CoreError, ErrorKind};
use serde_json::json;
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The request body could not be understood.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The engine rejected or failed the operation.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Network or listener failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Returns the HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Core(err) => match err.kind() {
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Storage | ErrorKind::Config => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Io(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error kind reported to clients.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => ErrorKind::Validation.as_str(),
            Self::Core(err) => err.kind().as_str(),
            Self::Io(_) | Self::Internal(_) => "internal",
        }
    }

    /// Returns true if this error was caused by the client.
    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }

    /// Returns true if this error is a server-side problem.
    pub fn is_server_error(&self) -> bool {
        self.status().is_server_error()
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.is_server_error() {
            tracing::error!(error = %self, "query failed");
        } else {
            tracing::debug!(error = %self, "query rejected");
        }
        let body = json!({
            "error": {
                "kind": self.kind(),
                "message": self.to_string(),
            }
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvrec_storage::StorageError;

    #[test]
    fn status_mapping() {
        assert_eq!(
            ServerError::InvalidRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServerError::from(CoreError::not_found("todos", "a")).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServerError::from(CoreError::invalid_request("no id")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServerError::from(CoreError::from(StorageError::unavailable("down"))).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn error_classification() {
        let client = ServerError::from(CoreError::invalid_request("bad"));
        assert!(client.is_client_error());
        assert!(!client.is_server_error());
        assert_eq!(client.kind(), "validation");

        let server = ServerError::Internal("join".into());
        assert!(server.is_server_error());
        assert_eq!(server.kind(), "internal");
    }
}
