//! Process configuration: a TOML file plus environment overrides.

use std::fmt;
use std::path::{Path, PathBuf};
use std::{env, fs};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use warden_auth::AuthConfig;
use warden_auth::config::{DEFAULT_ACCESS_TOKEN_LIFETIME_SECS, DEFAULT_REFRESH_TOKEN_BYTES};
use warden_auth::notify::DEFAULT_NOTIFY_CAPACITY;
use warden_auth::token::MIN_REFRESH_TOKEN_BYTES;
use warden_db::DbConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },

    #[error("signing secret is not configured (set JWT_SECRET or auth.jwt_secret)")]
    MissingSecret,

    #[error("invalid setting {field}: {reason}")]
    InvalidSetting {
        field: &'static str,
        reason: String,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DbConfig,
    #[serde(default)]
    pub auth: AuthSection,
    #[serde(default)]
    pub notifier: NotifierConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address, e.g. "0.0.0.0:8080"
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Take the client address from the first `X-Forwarded-For` hop
    /// instead of the socket peer. Only enable behind a trusted proxy.
    #[serde(default)]
    pub trust_forwarded_for: bool,
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            trust_forwarded_for: false,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AuthSection {
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_issuer")]
    pub jwt_issuer: String,
    #[serde(default = "default_access_lifetime")]
    pub access_token_lifetime_secs: u64,
    #[serde(default = "default_refresh_bytes")]
    pub refresh_token_bytes: usize,
}

fn default_issuer() -> String {
    "warden".to_string()
}

fn default_access_lifetime() -> u64 {
    DEFAULT_ACCESS_TOKEN_LIFETIME_SECS
}

fn default_refresh_bytes() -> usize {
    DEFAULT_REFRESH_TOKEN_BYTES
}

impl Default for AuthSection {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_issuer: default_issuer(),
            access_token_lifetime_secs: default_access_lifetime(),
            refresh_token_bytes: default_refresh_bytes(),
        }
    }
}

impl fmt::Debug for AuthSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSection")
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

impl AuthSection {
    pub fn to_auth_config(&self) -> AuthConfig {
        AuthConfig {
            jwt_secret: self.jwt_secret.clone(),
            jwt_issuer: self.jwt_issuer.clone(),
            access_token_lifetime_secs: self.access_token_lifetime_secs,
            refresh_token_bytes: self.refresh_token_bytes,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Address-change webhook. Unset or blank disables notifications.
    #[serde(default)]
    pub webhook_url: Option<String>,
    /// Per-request timeout for webhook delivery.
    #[serde(default = "default_webhook_timeout")]
    pub timeout_secs: u64,
    /// Events buffered before new ones are dropped.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_webhook_timeout() -> u64 {
    5
}

fn default_queue_capacity() -> usize {
    DEFAULT_NOTIFY_CAPACITY
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout_secs: default_webhook_timeout(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl AppConfig {
    /// Load from the config file (if present), apply environment
    /// overrides, and validate.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path();
        let mut cfg = if path.exists() {
            Self::from_file(&path)?
        } else {
            Self::default()
        };
        cfg.apply_env(|var| env::var(var).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    /// Apply environment overrides through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(secret) = lookup("JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(url) = lookup("WEBHOOK_URL") {
            self.notifier.webhook_url = Some(url);
        }
        if let Some(bind) = lookup("WARDEN_BIND") {
            self.server.bind = bind;
        }
        if let Some(url) = lookup("WARDEN_DB_URL") {
            self.database.url = url;
        }
        if let Some(value) = lookup("WARDEN_TRUST_FORWARDED_FOR") {
            self.server.trust_forwarded_for = match value.as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        var: "WARDEN_TRUST_FORWARDED_FOR",
                        value,
                    });
                }
            };
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        if self.auth.refresh_token_bytes < MIN_REFRESH_TOKEN_BYTES {
            return Err(ConfigError::InvalidSetting {
                field: "auth.refresh_token_bytes",
                reason: format!("must be at least {MIN_REFRESH_TOKEN_BYTES}"),
            });
        }
        if self.auth.access_token_lifetime_secs == 0 {
            return Err(ConfigError::InvalidSetting {
                field: "auth.access_token_lifetime_secs",
                reason: "must be positive".into(),
            });
        }
        if self.notifier.queue_capacity == 0 {
            return Err(ConfigError::InvalidSetting {
                field: "notifier.queue_capacity",
                reason: "must be positive".into(),
            });
        }
        Ok(())
    }
}

fn config_path() -> PathBuf {
    if let Ok(p) = env::var("WARDEN_CONFIG") {
        return PathBuf::from(p);
    }
    PathBuf::from("warden.toml")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = AppConfig::from_toml("").unwrap();
        assert_eq!(cfg.server.bind, "0.0.0.0:8080");
        assert!(!cfg.server.trust_forwarded_for);
        assert_eq!(cfg.auth.access_token_lifetime_secs, 900);
        assert_eq!(cfg.auth.refresh_token_bytes, 32);
        assert!(cfg.notifier.webhook_url.is_none());
        assert_eq!(cfg.database.namespace, "warden");
    }

    #[test]
    fn file_values_are_read() {
        let cfg = AppConfig::from_toml(
            r#"
            [server]
            bind = "127.0.0.1:9000"

            [auth]
            jwt_secret = "from-file"
            access_token_lifetime_secs = 60

            [notifier]
            webhook_url = "https://hooks.example.com/ip"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.server.bind, "127.0.0.1:9000");
        assert_eq!(cfg.auth.jwt_secret, "from-file");
        assert_eq!(cfg.auth.to_auth_config().access_token_lifetime_secs, 60);
        assert_eq!(
            cfg.notifier.webhook_url.as_deref(),
            Some("https://hooks.example.com/ip")
        );
    }

    #[test]
    fn env_overrides_file() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("JWT_SECRET", "from-env"),
            ("WEBHOOK_URL", "http://localhost:9999/hook"),
            ("WARDEN_TRUST_FORWARDED_FOR", "true"),
        ]);
        let mut cfg = AppConfig::from_toml("[auth]\njwt_secret = \"from-file\"").unwrap();

        cfg.apply_env(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(cfg.auth.jwt_secret, "from-env");
        assert_eq!(
            cfg.notifier.webhook_url.as_deref(),
            Some("http://localhost:9999/hook")
        );
        assert!(cfg.server.trust_forwarded_for);
    }

    #[test]
    fn bad_bool_env_is_rejected() {
        let mut cfg = AppConfig::default();
        let err = cfg
            .apply_env(|k| (k == "WARDEN_TRUST_FORWARDED_FOR").then(|| "maybe".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { .. }));
    }

    #[test]
    fn missing_secret_fails_validation() {
        let cfg = AppConfig::default();
        assert!(matches!(cfg.validate(), Err(ConfigError::MissingSecret)));
    }

    fn valid() -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.auth.jwt_secret = "validation-secret".into();
        cfg
    }

    #[test]
    fn defaults_with_secret_are_valid() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn short_refresh_tokens_are_rejected() {
        let mut cfg = valid();
        cfg.auth.refresh_token_bytes = 16;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidSetting { field: "auth.refresh_token_bytes", .. })
        ));
    }

    #[test]
    fn zero_queue_capacity_is_rejected() {
        let mut cfg = valid();
        cfg.notifier.queue_capacity = 0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidSetting { field: "notifier.queue_capacity", .. })
        ));
    }

    #[test]
    fn zero_access_lifetime_is_rejected() {
        let mut cfg = AppConfig::from_toml(
            "[auth]\njwt_secret = \"s\"\naccess_token_lifetime_secs = 0",
        )
        .unwrap();
        assert!(cfg.validate().is_err());
        cfg.auth.access_token_lifetime_secs = 60;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn debug_hides_secret() {
        let mut cfg = AppConfig::default();
        cfg.auth.jwt_secret = "hunter2-hunter2".into();
        assert!(!format!("{cfg:?}").contains("hunter2"));
    }
}
