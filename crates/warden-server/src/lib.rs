//! Warden Server — HTTP endpoints for token issuance, refresh, identity
//! lookup and logout.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod webhook;

pub use config::AppConfig;
pub use routes::create_router;
pub use state::AppState;
