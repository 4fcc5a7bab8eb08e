//! Request handlers.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, State};
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use warden_auth::{AnomalyNotifier, IssueInput, RefreshInput, TokenPair};
use warden_core::repository::SessionRepository;

use crate::error::ApiError;
use crate::extract::{AuthenticatedUser, client_fingerprint};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct IssueRequest {
    pub user_guid: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub user_guid: Uuid,
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct TokensResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
}

impl From<TokenPair> for TokensResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            expires_in: pair.expires_in,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user_guid: Uuid,
}

pub async fn health() -> &'static str {
    "OK"
}

/// POST /tokens
pub async fn issue_tokens<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Result<Json<IssueRequest>, JsonRejection>,
) -> Result<Json<TokensResponse>, ApiError>
where
    S: SessionRepository + 'static,
    N: AnomalyNotifier + 'static,
{
    let Json(req) = body?;
    let fingerprint = client_fingerprint(&headers, peer, state.trust_forwarded_for);

    let pair = state
        .sessions
        .issue_pair(IssueInput {
            user_id: req.user_guid,
            fingerprint,
        })
        .await?;

    Ok(Json(pair.into()))
}

/// POST /tokens/refresh
pub async fn refresh_tokens<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<TokensResponse>, ApiError>
where
    S: SessionRepository + 'static,
    N: AnomalyNotifier + 'static,
{
    let Json(req) = body?;
    let fingerprint = client_fingerprint(&headers, peer, state.trust_forwarded_for);

    let pair = state
        .sessions
        .refresh(RefreshInput {
            user_id: req.user_guid,
            raw_refresh_token: req.refresh_token,
            fingerprint,
        })
        .await?;

    Ok(Json(pair.into()))
}

/// GET /me
pub async fn me(AuthenticatedUser(user_id): AuthenticatedUser) -> Json<MeResponse> {
    Json(MeResponse { user_guid: user_id })
}

/// POST /logout
pub async fn logout<S, N>(
    State(state): State<Arc<AppState<S, N>>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
) -> Result<&'static str, ApiError>
where
    S: SessionRepository + 'static,
    N: AnomalyNotifier + 'static,
{
    state.sessions.logout(user_id).await?;
    Ok("logged out")
}
