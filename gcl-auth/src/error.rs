//! Auth error types.

use thiserror::Error;

/// Result type for auth operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Errors that can occur while obtaining or refreshing tokens.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token endpoint rejected the refresh grant: {0}")]
    TokenRejected(String),

    #[error("no access token available, authorize first")]
    NotAuthorized,

    #[error("invalid auth configuration: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
