//! HTTP error mapping.
//!
//! Clients get a terse, uniform reason; the detail only goes to the log.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, info};
use warden_auth::AuthError;
use warden_core::error::WardenError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed input; no state was changed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Credential missing, invalid, expired or mismatched.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<WardenError> for ApiError {
    fn from(err: WardenError) -> Self {
        match err {
            WardenError::Validation { message } => ApiError::InvalidRequest(message),
            WardenError::Unauthorized { reason } => ApiError::Unauthorized(reason),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        WardenError::from(err).into()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::InvalidRequest(detail) => {
                info!(%detail, "Rejected malformed request");
                (StatusCode::BAD_REQUEST, "invalid request")
            }
            ApiError::Unauthorized(reason) => {
                info!(%reason, "Rejected unauthorized request");
                (StatusCode::UNAUTHORIZED, "unauthorized")
            }
            ApiError::Internal(detail) => {
                error!(%detail, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            }
        };

        (status, body).into_response()
    }
}
