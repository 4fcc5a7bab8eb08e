//! SurrealDB implementation of [`SessionRepository`].
//!
//! The record id of a session is the user UUID, so `UPSERT` on that id
//! is an atomic insert-or-replace and a conditional `UPDATE ... WHERE`
//! is an atomic compare-and-swap on the token digest.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;
use warden_core::error::WardenResult;
use warden_core::models::session::{RotateSession, Session, UpsertSession};
use warden_core::repository::SessionRepository;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct SessionRow {
    token_hash: String,
    user_agent: String,
    ip_address: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SessionRow {
    fn into_session(self, user_id: Uuid) -> Session {
        Session {
            user_id,
            token_hash: self.token_hash,
            user_agent: self.user_agent,
            ip_address: self.ip_address,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

fn not_found(user_id: &str) -> DbError {
    DbError::NotFound {
        entity: "session".into(),
        id: user_id.to_string(),
    }
}

/// Whether SurrealDB aborted the statement because another transaction
/// wrote the same record.
fn is_write_conflict(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    message.contains("transaction conflict") || message.contains("write conflict")
}

/// SurrealDB implementation of the Session repository.
#[derive(Clone)]
pub struct SurrealSessionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealSessionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> SessionRepository for SurrealSessionRepository<C> {
    async fn upsert(&self, input: UpsertSession) -> WardenResult<Session> {
        let id_str = input.user_id.to_string();

        let result = self
            .db
            .query(
                "UPSERT type::record('session', $id) SET \
                 token_hash = $token_hash, \
                 user_agent = $user_agent, \
                 ip_address = $ip_address, \
                 updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("token_hash", input.token_hash))
            .bind(("user_agent", input.fingerprint.user_agent))
            .bind(("ip_address", input.fingerprint.ip_address))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<SessionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| not_found(&id_str))?;

        debug!(user_id = %input.user_id, "Session upserted");
        Ok(row.into_session(input.user_id))
    }

    async fn get(&self, user_id: Uuid) -> WardenResult<Session> {
        let id_str = user_id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('session', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<SessionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| not_found(&id_str))?;

        Ok(row.into_session(user_id))
    }

    async fn delete(&self, user_id: Uuid) -> WardenResult<()> {
        self.db
            .query("DELETE type::record('session', $id)")
            .bind(("id", user_id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        debug!(user_id = %user_id, "Session deleted");
        Ok(())
    }

    async fn rotate(&self, input: RotateSession) -> WardenResult<Session> {
        let id_str = input.user_id.to_string();

        // A write conflict means a concurrent rotation of the same record
        // committed first, which is the same outcome as a stale digest.
        let result = match self
            .db
            .query(
                "UPDATE type::record('session', $id) SET \
                 token_hash = $token_hash, \
                 user_agent = $user_agent, \
                 ip_address = $ip_address, \
                 updated_at = time::now() \
                 WHERE token_hash = $expected_token_hash",
            )
            .bind(("id", id_str.clone()))
            .bind(("token_hash", input.token_hash))
            .bind(("user_agent", input.fingerprint.user_agent))
            .bind(("ip_address", input.fingerprint.ip_address))
            .bind(("expected_token_hash", input.expected_token_hash))
            .await
        {
            Ok(result) => result,
            Err(e) if is_write_conflict(&e.to_string()) => {
                debug!(user_id = %input.user_id, "Rotation aborted by write conflict");
                return Err(not_found(&id_str).into());
            }
            Err(e) => return Err(DbError::from(e).into()),
        };

        let mut result = result.check().map_err(|e| {
            let message = e.to_string();
            if is_write_conflict(&message) {
                debug!(user_id = %input.user_id, "Rotation aborted by write conflict");
                not_found(&id_str)
            } else {
                DbError::Query(message)
            }
        })?;

        // No row back means the session is gone or its digest moved on.
        let rows: Vec<SessionRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| not_found(&id_str))?;

        debug!(user_id = %input.user_id, "Session rotated");
        Ok(row.into_session(input.user_id))
    }
}
