//! Request-derived inputs: the authenticated user and the client
//! fingerprint.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::{AUTHORIZATION, USER_AGENT};
use axum::http::request::Parts;
use uuid::Uuid;
use warden_auth::{AnomalyNotifier, authenticate};
use warden_core::models::session::Fingerprint;
use warden_core::repository::SessionRepository;

use crate::error::ApiError;
use crate::state::AppState;

const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// The user proven by the request's bearer access token.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser(pub Uuid);

impl<S, N> FromRequestParts<Arc<AppState<S, N>>> for AuthenticatedUser
where
    S: SessionRepository + 'static,
    N: AnomalyNotifier + 'static,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<S, N>>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        let user_id = authenticate(header, state.auth_config())?;
        Ok(Self(user_id))
    }
}

/// Build the client fingerprint from the `User-Agent` header and the
/// peer address (or the first forwarded hop when trusted).
pub fn client_fingerprint(
    headers: &HeaderMap,
    peer: SocketAddr,
    trust_forwarded_for: bool,
) -> Fingerprint {
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let forwarded = trust_forwarded_for
        .then(|| forwarded_client(headers))
        .flatten();
    let ip_address = forwarded.unwrap_or_else(|| peer.ip().to_string());

    Fingerprint::new(user_agent, ip_address)
}

fn forwarded_client(headers: &HeaderMap) -> Option<String> {
    headers
        .get(X_FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|hop| !hop.is_empty())
        .map(str::to_string)
}
