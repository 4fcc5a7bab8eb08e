//! Route table.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;
use warden_auth::AnomalyNotifier;
use warden_core::repository::SessionRepository;

use crate::handlers;
use crate::state::AppState;

pub fn create_router<S, N>(state: Arc<AppState<S, N>>) -> Router
where
    S: SessionRepository + 'static,
    N: AnomalyNotifier + 'static,
{
    Router::new()
        .route("/", get(handlers::health))
        .route("/tokens", post(handlers::issue_tokens::<S, N>))
        .route("/tokens/refresh", post(handlers::refresh_tokens::<S, N>))
        .route("/me", get(handlers::me))
        .route("/logout", post(handlers::logout::<S, N>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
