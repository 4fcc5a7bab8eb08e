//! Session lifecycle: issuance, refresh rotation and logout.

use tracing::{info, warn};
use uuid::Uuid;
use warden_core::error::{WardenError, WardenResult};
use warden_core::models::session::{Fingerprint, RotateSession, UpsertSession};
use warden_core::repository::SessionRepository;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::notify::{AddressChange, AnomalyNotifier};
use crate::token;

/// Input for issuing a fresh credential pair.
#[derive(Debug)]
pub struct IssueInput {
    pub user_id: Uuid,
    pub fingerprint: Fingerprint,
}

/// Input for the refresh token rotation flow.
#[derive(Debug)]
pub struct RefreshInput {
    pub user_id: Uuid,
    pub raw_refresh_token: String,
    pub fingerprint: Fingerprint,
}

/// An access/refresh token pair handed back to the client.
#[derive(Debug, Clone)]
pub struct TokenPair {
    /// Signed JWT access token.
    pub access_token: String,
    /// Raw opaque refresh token (only its digest is stored).
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// Session lifecycle service.
///
/// Generic over the store and the notifier so that the auth layer has
/// no dependency on the database crate or on any transport.
pub struct SessionService<S: SessionRepository, N: AnomalyNotifier> {
    session_repo: S,
    notifier: N,
    config: AuthConfig,
}

impl<S: SessionRepository, N: AnomalyNotifier> SessionService<S, N> {
    pub fn new(session_repo: S, notifier: N, config: AuthConfig) -> Self {
        Self {
            session_repo,
            notifier,
            config,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Mint a new pair and the digest to persist for it.
    fn mint(&self, user_id: Uuid) -> Result<(TokenPair, String), AuthError> {
        let access_token = token::issue_access_token(user_id, &self.config)?;
        let refresh_token = token::generate_refresh_token(self.config.refresh_token_bytes)?;
        let token_hash = token::hash_refresh_token(&refresh_token);

        Ok((
            TokenPair {
                access_token,
                refresh_token,
                expires_in: self.config.access_token_lifetime_secs,
            },
            token_hash,
        ))
    }

    /// Issue a credential pair and bind a new session to `fingerprint`.
    ///
    /// Any existing session of the user is replaced. If persisting the
    /// session fails the minted pair is discarded.
    pub async fn issue_pair(&self, input: IssueInput) -> WardenResult<TokenPair> {
        let (pair, token_hash) = self
            .mint(input.user_id)
            .map_err(|e| WardenError::Issuance(e.to_string()))?;

        self.session_repo
            .upsert(UpsertSession {
                user_id: input.user_id,
                token_hash,
                fingerprint: input.fingerprint,
            })
            .await
            .map_err(|e| WardenError::Issuance(e.to_string()))?;

        info!(user_id = %input.user_id, "Session issued");
        Ok(pair)
    }

    /// Rotate a refresh token: verify it against the stored session and
    /// the client fingerprint, then issue a new pair.
    ///
    /// Each refresh token is single-use. A changed user agent ends the
    /// session; a changed network address only raises a notification.
    pub async fn refresh(&self, input: RefreshInput) -> WardenResult<TokenPair> {
        let user_id = input.user_id;

        // 1. Look up the session.
        let session = self
            .session_repo
            .get(user_id)
            .await
            .map_err(|e| match e {
                WardenError::NotFound { .. } => AuthError::SessionNotFound.into(),
                other => WardenError::Refresh(other.to_string()),
            })?;

        // 2. Presented token must be the current one.
        let presented_hash = token::hash_refresh_token(&input.raw_refresh_token);
        if presented_hash != session.token_hash {
            warn!(user_id = %user_id, "Refresh with stale or unknown token");
            return Err(AuthError::RefreshTokenMismatch.into());
        }

        // 3. User agent change terminates the session outright.
        if input.fingerprint.user_agent != session.user_agent {
            warn!(user_id = %user_id, "User agent changed on refresh, terminating session");
            if let Err(e) = self.session_repo.delete(user_id).await {
                warn!(user_id = %user_id, error = %e, "Failed to delete mismatched session");
            }
            return Err(AuthError::DeviceMismatch.into());
        }

        // 4. Address change is reported but tolerated.
        if input.fingerprint.ip_address != session.ip_address {
            info!(
                user_id = %user_id,
                old_ip = %session.ip_address,
                new_ip = %input.fingerprint.ip_address,
                "Client address changed on refresh"
            );
            self.notifier.address_changed(AddressChange {
                user_id,
                new_ip: input.fingerprint.ip_address.clone(),
            });
        }

        // 5. New pair.
        let (pair, token_hash) = self
            .mint(user_id)
            .map_err(|e| WardenError::Refresh(e.to_string()))?;

        // 6. Swap it in, conditional on nobody having rotated meanwhile.
        self.session_repo
            .rotate(RotateSession {
                user_id,
                expected_token_hash: session.token_hash,
                token_hash,
                fingerprint: input.fingerprint,
            })
            .await
            .map_err(|e| match e {
                WardenError::NotFound { .. } => {
                    warn!(user_id = %user_id, "Lost refresh race");
                    AuthError::RotationConflict.into()
                }
                other => WardenError::Refresh(other.to_string()),
            })?;

        info!(user_id = %user_id, "Session rotated");
        Ok(pair)
    }

    /// End the user's session. Idempotent.
    pub async fn logout(&self, user_id: Uuid) -> WardenResult<()> {
        self.session_repo.delete(user_id).await?;
        info!(user_id = %user_id, "Session ended");
        Ok(())
    }
}
