//! Error types for the Warden system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WardenError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Credential missing, invalid, expired or mismatched. The reason is
    /// for logs only; callers report every variant the same way.
    #[error("Unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("Credential issuance failed: {0}")]
    Issuance(String),

    #[error("Session refresh failed: {0}")]
    Refresh(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl WardenError {
    /// `true` for errors caused by the client rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            WardenError::Validation { .. } | WardenError::Unauthorized { .. }
        )
    }
}

pub type WardenResult<T> = Result<T, WardenError>;
