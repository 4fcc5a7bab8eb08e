//! Session table bootstrap.
//!
//! The record id of a session is the user UUID, so the table holds at
//! most one session per user. Every statement is `IF NOT EXISTS`, so
//! bootstrapping an already initialized database changes nothing.

use surrealdb::{Connection, Surreal};
use tracing::info;

use crate::error::DbError;

const SESSION_TABLE: &str = "\
DEFINE TABLE IF NOT EXISTS session SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS token_hash ON TABLE session TYPE string;
DEFINE FIELD IF NOT EXISTS user_agent ON TABLE session TYPE string DEFAULT '';
DEFINE FIELD IF NOT EXISTS ip_address ON TABLE session TYPE string DEFAULT '';
DEFINE FIELD IF NOT EXISTS created_at ON TABLE session TYPE datetime DEFAULT time::now();
DEFINE FIELD IF NOT EXISTS updated_at ON TABLE session TYPE datetime DEFAULT time::now();
";

/// Define the `session` table on the selected namespace and database.
pub async fn ensure_schema<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(SESSION_TABLE)
        .await?
        .check()
        .map_err(|e| DbError::Schema(e.to_string()))?;

    info!("Session table ready");
    Ok(())
}

/// The DDL applied by [`ensure_schema`].
pub fn session_table_ddl() -> &'static str {
    SESSION_TABLE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_definition_is_idempotent() {
        for statement in SESSION_TABLE.lines().filter(|l| !l.is_empty()) {
            assert!(
                statement.contains("IF NOT EXISTS"),
                "not idempotent: {statement}"
            );
        }
    }

    #[test]
    fn defines_fingerprint_fields() {
        for field in ["token_hash", "user_agent", "ip_address"] {
            assert!(SESSION_TABLE.contains(&format!("FIELD IF NOT EXISTS {field} ")));
        }
    }
}
