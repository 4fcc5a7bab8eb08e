//! Warden Server — application entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use warden_auth::SessionService;
use warden_db::open_store;
use warden_server::webhook::WebhookDispatcher;
use warden_server::{AppConfig, AppState, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warden=info".parse()?))
        .json()
        .init();

    info!("Starting Warden server...");

    let config = AppConfig::load()?;

    let store = open_store(&config.database).await?;

    let notifier = WebhookDispatcher::spawn(&config.notifier)?;
    let sessions = SessionService::new(
        store,
        notifier,
        config.auth.to_auth_config(),
    );
    let state = Arc::new(AppState::new(sessions, config.server.trust_forwarded_for));
    let app = create_router(state);

    let listener = TcpListener::bind(&config.server.bind).await?;
    info!(bind = %config.server.bind, "Warden listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Warden server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
