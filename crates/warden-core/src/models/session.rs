//! Session domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Client origin a session is bound to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    pub user_agent: String,
    pub ip_address: String,
}

impl Fingerprint {
    pub fn new(user_agent: impl Into<String>, ip_address: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            ip_address: ip_address.into(),
        }
    }
}

/// The single live session of a user. Keyed by `user_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: Uuid,
    /// SHA-256 hex digest of the current refresh token.
    pub token_hash: String,
    pub user_agent: String,
    pub ip_address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::new(self.user_agent.clone(), self.ip_address.clone())
    }
}

/// Insert-or-replace input; replaces any existing session of the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertSession {
    pub user_id: Uuid,
    pub token_hash: String,
    pub fingerprint: Fingerprint,
}

/// Conditional replace: applied only while the stored digest still
/// equals `expected_token_hash`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotateSession {
    pub user_id: Uuid,
    pub expected_token_hash: String,
    pub token_hash: String,
    pub fingerprint: Fingerprint,
}
