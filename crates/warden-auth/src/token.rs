//! JWT access token issuance/verification and opaque refresh token
//! generation.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::TryRngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;

/// Algorithm used when signing.
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::HS512;

/// Fewest random bytes a refresh token may carry.
pub const MIN_REFRESH_TOKEN_BYTES: usize = 32;

/// Accepted on verification: the whole HMAC family, nothing else.
const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// JWT claims embedded in every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject: user ID (UUID string).
    pub sub: String,
    /// Issuer.
    pub iss: String,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// Unique token ID (UUID string).
    pub jti: String,
}

/// Issue a signed HMAC JWT access token valid for
/// `config.access_token_lifetime_secs`.
pub fn issue_access_token(user_id: Uuid, config: &AuthConfig) -> Result<String, AuthError> {
    let now = Utc::now().timestamp();
    let claims = AccessTokenClaims {
        sub: user_id.to_string(),
        iss: config.jwt_issuer.clone(),
        iat: now,
        exp: now + config.access_token_lifetime_secs as i64,
        jti: Uuid::new_v4().to_string(),
    };
    encode_claims(&claims, config)
}

/// Sign arbitrary claims with the configured secret.
pub fn encode_claims(claims: &AccessTokenClaims, config: &AuthConfig) -> Result<String, AuthError> {
    if config.jwt_secret.is_empty() {
        return Err(AuthError::Signing("signing secret is empty".into()));
    }

    let key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
    jsonwebtoken::encode(&Header::new(SIGNING_ALGORITHM), claims, &key)
        .map_err(|e| AuthError::Signing(format!("JWT encode: {e}")))
}

/// Decode and verify an HMAC JWT access token.
///
/// Expiry is checked without leeway: a token is expired as soon as the
/// current time passes `exp`.
pub fn decode_access_token(
    token: &str,
    config: &AuthConfig,
) -> Result<AccessTokenClaims, AuthError> {
    if config.jwt_secret.is_empty() {
        return Err(AuthError::TokenInvalid("verification secret is empty".into()));
    }

    let key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

    let mut validation = Validation::new(SIGNING_ALGORITHM);
    validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
    validation.leeway = 0;
    validation.set_issuer(&[&config.jwt_issuer]);
    validation.set_required_spec_claims(&["sub", "exp", "iat", "iss"]);

    jsonwebtoken::decode::<AccessTokenClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid(e.to_string()),
        })
}

/// Validated JWT claims, a newtype proving the token was verified.
#[derive(Debug, Clone)]
pub struct ValidatedClaims(pub AccessTokenClaims);

impl ValidatedClaims {
    /// The authenticated user.
    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.0.sub)
            .map_err(|_| AuthError::TokenInvalid("subject is not a UUID".into()))
    }
}

/// Validate a JWT access token (signature, algorithm, expiry, issuer)
/// and return the verified claims.
///
/// Purely stateless: no store lookup is performed.
pub fn validate_access_token(
    token: &str,
    config: &AuthConfig,
) -> Result<ValidatedClaims, AuthError> {
    decode_access_token(token, config).map(ValidatedClaims)
}

/// Generate a cryptographically random opaque refresh token of
/// `byte_len` bytes, base64url-encoded without padding.
pub fn generate_refresh_token(byte_len: usize) -> Result<String, AuthError> {
    if byte_len < MIN_REFRESH_TOKEN_BYTES {
        return Err(AuthError::Entropy(format!(
            "refresh tokens need at least {MIN_REFRESH_TOKEN_BYTES} bytes, got {byte_len}"
        )));
    }

    let mut bytes = vec![0u8; byte_len];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| AuthError::Entropy(format!("OS random source: {e}")))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// SHA-256 hash of a raw refresh token, hex-encoded.
///
/// This is the value stored in the database as `session.token_hash`.
pub fn hash_refresh_token(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret-0123456789".into(),
            jwt_issuer: "warden-test".into(),
            ..Default::default()
        }
    }

    fn claims_for(user_id: Uuid, iat: i64, exp: i64, config: &AuthConfig) -> AccessTokenClaims {
        AccessTokenClaims {
            sub: user_id.to_string(),
            iss: config.jwt_issuer.clone(),
            iat,
            exp,
            jti: Uuid::new_v4().to_string(),
        }
    }

    #[test]
    fn jwt_roundtrip() {
        let config = test_config();
        let user_id = Uuid::new_v4();

        let token = issue_access_token(user_id, &config).unwrap();
        let claims = decode_access_token(&token, &config).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.iss, "warden-test");
        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn jti_is_unique() {
        let config = test_config();
        let uid = Uuid::new_v4();

        let t1 = issue_access_token(uid, &config).unwrap();
        let t2 = issue_access_token(uid, &config).unwrap();

        assert_ne!(t1, t2);
        let c1 = decode_access_token(&t1, &config).unwrap();
        let c2 = decode_access_token(&t2, &config).unwrap();
        assert_ne!(c1.jti, c2.jti);
    }

    #[test]
    fn empty_secret_is_a_signing_error() {
        let config = AuthConfig::default();
        let err = issue_access_token(Uuid::new_v4(), &config).unwrap_err();
        assert!(matches!(err, AuthError::Signing(_)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = test_config();
        let now = Utc::now().timestamp();
        let claims = claims_for(Uuid::new_v4(), now - 960, now - 60, &config);
        let token = encode_claims(&claims, &config).unwrap();

        let err = decode_access_token(&token, &config).unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired), "got: {err:?}");
    }

    #[test]
    fn token_from_other_key_is_invalid() {
        let config = test_config();
        let other = AuthConfig {
            jwt_secret: "a-completely-different-secret".into(),
            ..test_config()
        };
        let token = issue_access_token(Uuid::new_v4(), &other).unwrap();

        let err = decode_access_token(&token, &config).unwrap_err();
        assert!(matches!(err, AuthError::TokenInvalid(_)), "got: {err:?}");
    }

    #[test]
    fn other_hmac_variants_are_accepted() {
        let config = test_config();
        let user_id = Uuid::new_v4();
        let now = Utc::now().timestamp();
        let claims = claims_for(user_id, now, now + 60, &config);
        let key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &key).unwrap();

        let decoded = decode_access_token(&token, &config).unwrap();
        assert_eq!(decoded.sub, user_id.to_string());
    }

    #[test]
    fn non_hmac_algorithm_is_invalid() {
        let config = test_config();
        let now = Utc::now().timestamp();
        let claims = claims_for(Uuid::new_v4(), now, now + 60, &config);

        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap());
        let forged = format!("{header}.{payload}.c2lnbmF0dXJl");

        let err = decode_access_token(&forged, &config).unwrap_err();
        assert!(matches!(err, AuthError::TokenInvalid(_)), "got: {err:?}");

        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
        let unsigned = format!("{header}.{payload}.");
        let err = decode_access_token(&unsigned, &config).unwrap_err();
        assert!(matches!(err, AuthError::TokenInvalid(_)), "got: {err:?}");
    }

    #[test]
    fn wrong_issuer_is_invalid() {
        let config = test_config();
        let foreign = AuthConfig {
            jwt_issuer: "someone-else".into(),
            ..test_config()
        };
        let token = issue_access_token(Uuid::new_v4(), &foreign).unwrap();

        assert!(matches!(
            decode_access_token(&token, &config),
            Err(AuthError::TokenInvalid(_))
        ));
    }

    #[test]
    fn validated_claims_expose_user_id() {
        let config = test_config();
        let user_id = Uuid::new_v4();
        let token = issue_access_token(user_id, &config).unwrap();

        let validated = validate_access_token(&token, &config).unwrap();
        assert_eq!(validated.user_id().unwrap(), user_id);

        let tampered = format!("{token}x");
        assert!(validate_access_token(&tampered, &config).is_err());
    }

    #[test]
    fn refresh_token_is_url_safe() {
        let token = generate_refresh_token(32).unwrap();
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
        // 32 bytes → 43 base64url chars.
        assert_eq!(token.len(), 43);
    }

    #[test]
    fn refresh_tokens_differ() {
        let a = generate_refresh_token(32).unwrap();
        let b = generate_refresh_token(32).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn short_refresh_token_is_rejected() {
        let err = generate_refresh_token(16).unwrap_err();
        assert!(matches!(err, AuthError::Entropy(_)));
    }

    #[test]
    fn refresh_token_hash_is_deterministic() {
        let raw = "some-refresh-token";
        assert_eq!(hash_refresh_token(raw), hash_refresh_token(raw));
        assert_ne!(hash_refresh_token("token-a"), hash_refresh_token("token-b"));
    }
}
