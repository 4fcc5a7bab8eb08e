//! Opening the session store.

use std::fmt;

use serde::{Deserialize, Serialize};
use surrealdb::Surreal;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use tracing::info;

use crate::error::DbError;
use crate::repository::SurrealSessionRepository;
use crate::schema::ensure_schema;

/// Where the session store lives.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    /// SurrealDB WebSocket endpoint, `host:port`.
    pub url: String,
    pub namespace: String,
    pub database: String,
    /// Root credentials. An empty username skips sign-in, for servers
    /// started with authentication disabled.
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "warden".into(),
            database: "sessions".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("url", &self.url)
            .field("namespace", &self.namespace)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Connect to the configured store, make sure the `session` table
/// exists and hand back the repository the session service runs on.
pub async fn open_store(config: &DbConfig) -> Result<SurrealSessionRepository<Client>, DbError> {
    let db = Surreal::new::<Ws>(config.url.as_str()).await?;

    if !config.username.is_empty() {
        db.signin(Root {
            username: config.username.clone(),
            password: config.password.clone(),
        })
        .await?;
    }

    db.use_ns(config.namespace.as_str())
        .use_db(config.database.as_str())
        .await?;
    ensure_schema(&db).await?;

    info!(
        url = %config.url,
        namespace = %config.namespace,
        database = %config.database,
        "Session store opened"
    );
    Ok(SurrealSessionRepository::new(db))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_hides_password() {
        let config = DbConfig {
            password: "s3cret-pass".into(),
            ..Default::default()
        };
        assert!(!format!("{config:?}").contains("s3cret-pass"));
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: DbConfig = serde_json::from_str(r#"{"url":"db.internal:8000"}"#).unwrap();
        assert_eq!(config.url, "db.internal:8000");
        assert_eq!(config.namespace, "warden");
        assert_eq!(config.database, "sessions");
    }
}
