//! Authentication error types.

use thiserror::Error;
use warden_core::error::WardenError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing or malformed bearer credential")]
    MissingCredential,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("no session for user")]
    SessionNotFound,

    #[error("refresh token does not match session")]
    RefreshTokenMismatch,

    #[error("device mismatch")]
    DeviceMismatch,

    #[error("refresh token was rotated concurrently")]
    RotationConflict,

    #[error("signing error: {0}")]
    Signing(String),

    #[error("entropy error: {0}")]
    Entropy(String),
}

impl From<AuthError> for WardenError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredential
            | AuthError::TokenExpired
            | AuthError::TokenInvalid(_)
            | AuthError::SessionNotFound
            | AuthError::RefreshTokenMismatch
            | AuthError::DeviceMismatch
            | AuthError::RotationConflict => WardenError::Unauthorized {
                reason: err.to_string(),
            },
            AuthError::Signing(_) | AuthError::Entropy(_) => WardenError::Crypto(err.to_string()),
        }
    }
}
