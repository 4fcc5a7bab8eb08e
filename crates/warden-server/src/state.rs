//! Shared application state.

use warden_auth::{AnomalyNotifier, AuthConfig, SessionService};
use warden_core::repository::SessionRepository;

pub struct AppState<S: SessionRepository, N: AnomalyNotifier> {
    pub sessions: SessionService<S, N>,
    /// Use the first `X-Forwarded-For` hop as the client address.
    pub trust_forwarded_for: bool,
}

impl<S: SessionRepository, N: AnomalyNotifier> AppState<S, N> {
    pub fn new(sessions: SessionService<S, N>, trust_forwarded_for: bool) -> Self {
        Self {
            sessions,
            trust_forwarded_for,
        }
    }

    pub fn auth_config(&self) -> &AuthConfig {
        self.sessions.config()
    }
}
