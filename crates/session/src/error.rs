//! Session errors

use thiserror::Error;

/// Errors surfaced by the session manager and token helpers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Token could not be parsed into claims
    #[error("Invalid token")]
    InvalidToken,

    /// Token parsed but its `exp` claim has passed
    #[error("Token expired")]
    TokenExpired,

    /// `login` was handed a credential that does not decode
    #[error("Invalid credential")]
    InvalidCredential,

    /// Authorization header is not of the form `Bearer <token>`
    #[error("Invalid authorization header format")]
    InvalidAuthorizationFormat,

    /// Persistent store could not be read or written
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

/// Errors reported by a [`crate::TokenStore`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage contents corrupt: {0}")]
    Corrupt(String),
}

impl From<StorageError> for SessionError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Unavailable(reason) => SessionError::StorageUnavailable(reason),
            StorageError::Corrupt(reason) => {
                SessionError::StorageUnavailable(format!("corrupt contents: {reason}"))
            }
        }
    }
}
