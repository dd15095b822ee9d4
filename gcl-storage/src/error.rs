//! Sync engine error types and failure classification.

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur while synchronizing a bucket.
///
/// The `AuthExpired` / `Transient` / `Permanent` split drives the executor's
/// retry policy, so the transport must classify every failure into one of
/// them at the HTTP boundary.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("access token expired or invalid")]
    AuthExpired,

    #[error("transient failure: {0}")]
    Transient(String),

    #[error("permanent failure: {0}")]
    Permanent(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("cipher error: {0}")]
    Cipher(String),

    #[error("credential refresh failed: {0}")]
    Auth(#[from] gcl_auth::AuthError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{failed} of {total} planned actions failed")]
    PartialRun { failed: usize, total: usize },
}

impl StorageError {
    /// Classifies an HTTP status into the retry taxonomy.
    pub fn from_status(status: reqwest::StatusCode, context: &str) -> Self {
        use reqwest::StatusCode;

        match status {
            StatusCode::UNAUTHORIZED => StorageError::AuthExpired,
            StatusCode::NOT_FOUND => StorageError::NotFound(context.to_string()),
            StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => {
                StorageError::Transient(format!("{context}: {status}"))
            }
            s if s.is_server_error() => StorageError::Transient(format!("{context}: {status}")),
            s if s.is_client_error() => StorageError::Permanent(format!("{context}: {status}")),
            s => StorageError::Permanent(format!("{context}: unexpected status {s}")),
        }
    }

    pub fn is_auth_expired(&self) -> bool {
        matches!(self, StorageError::AuthExpired)
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, StorageError::Transient(_))
    }
}
