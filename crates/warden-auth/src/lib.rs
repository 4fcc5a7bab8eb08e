//! Warden Auth — access token issuance/validation, refresh token
//! rotation with device binding, and anomaly notification.

pub mod authenticator;
pub mod config;
pub mod error;
pub mod notify;
pub mod service;
pub mod token;

pub use authenticator::authenticate;
pub use config::AuthConfig;
pub use error::AuthError;
pub use notify::{AddressChange, AnomalyNotifier, ChannelNotifier};
pub use service::{IssueInput, RefreshInput, SessionService, TokenPair};
pub use token::AccessTokenClaims;
