//! Bearer-token request authentication.

use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::token;

const BEARER_PREFIX: &str = "Bearer ";

/// Pull the token out of an `Authorization: Bearer <token>` value.
pub fn extract_bearer(header: Option<&str>) -> Result<&str, AuthError> {
    let token = header
        .and_then(|v| v.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .ok_or(AuthError::MissingCredential)?;

    if token.is_empty() {
        return Err(AuthError::MissingCredential);
    }
    Ok(token)
}

/// Authenticate a raw `Authorization` header value and return the user
/// it proves. Never consults the session store.
pub fn authenticate(header: Option<&str>, config: &AuthConfig) -> Result<Uuid, AuthError> {
    let raw = extract_bearer(header)?;
    token::validate_access_token(raw, config)?.user_id()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "authenticator-secret".into(),
            ..Default::default()
        }
    }

    #[test]
    fn valid_bearer_yields_user() {
        let config = test_config();
        let user_id = Uuid::new_v4();
        let jwt = token::issue_access_token(user_id, &config).unwrap();

        let header = format!("Bearer {jwt}");
        assert_eq!(authenticate(Some(&header), &config).unwrap(), user_id);
    }

    #[test]
    fn missing_or_malformed_header() {
        let config = test_config();
        for header in [None, Some(""), Some("Bearer "), Some("Basic abc"), Some("bearer x")] {
            let err = authenticate(header, &config).unwrap_err();
            assert!(
                matches!(err, AuthError::MissingCredential),
                "header {header:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn garbage_token_is_invalid() {
        let config = test_config();
        let err = authenticate(Some("Bearer not.a.jwt"), &config).unwrap_err();
        assert!(matches!(err, AuthError::TokenInvalid(_)));
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let config = test_config();
        let now = chrono::Utc::now().timestamp();
        let claims = token::AccessTokenClaims {
            sub: Uuid::new_v4().to_string(),
            iss: config.jwt_issuer.clone(),
            iat: now - 960,
            exp: now - 60,
            jti: Uuid::new_v4().to_string(),
        };
        let jwt = token::encode_claims(&claims, &config).unwrap();

        let header = format!("Bearer {jwt}");
        let err = authenticate(Some(&header), &config).unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired), "got: {err:?}");
    }
}
