//! Authentication configuration.

use std::fmt;

/// Default access token lifetime: 15 minutes.
pub const DEFAULT_ACCESS_TOKEN_LIFETIME_SECS: u64 = 900;

/// Default refresh token entropy in bytes.
pub const DEFAULT_REFRESH_TOKEN_BYTES: usize = 32;

/// Configuration for the credential codec and session service.
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC secret for signing access tokens. Read-only after startup.
    pub jwt_secret: String,
    /// JWT issuer (`iss` claim).
    pub jwt_issuer: String,
    /// Access token lifetime in seconds (default: 900 = 15 minutes).
    pub access_token_lifetime_secs: u64,
    /// Random bytes per refresh token (default and minimum: 32).
    pub refresh_token_bytes: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_issuer: "warden".into(),
            access_token_lifetime_secs: DEFAULT_ACCESS_TOKEN_LIFETIME_SECS,
            refresh_token_bytes: DEFAULT_REFRESH_TOKEN_BYTES,
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_issuer", &self.jwt_issuer)
            .field(
                "access_token_lifetime_secs",
                &self.access_token_lifetime_secs,
            )
            .field("refresh_token_bytes", &self.refresh_token_bytes)
            .finish()
    }
}
