//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. The session store holds at
//! most one record per user; every write is a single atomic statement
//! so that concurrent refreshes of the same user serialize in the
//! store, not in the caller.

use uuid::Uuid;

use crate::error::WardenResult;
use crate::models::session::{RotateSession, Session, UpsertSession};

pub trait SessionRepository: Send + Sync {
    /// Insert the user's session, or replace the existing one.
    ///
    /// Replacing overwrites the token digest, fingerprint and
    /// `updated_at` together; `created_at` is preserved.
    fn upsert(&self, input: UpsertSession) -> impl Future<Output = WardenResult<Session>> + Send;

    /// Fetch the user's session. Missing → `WardenError::NotFound`.
    fn get(&self, user_id: Uuid) -> impl Future<Output = WardenResult<Session>> + Send;

    /// Delete the user's session. Deleting a missing session is not an
    /// error.
    fn delete(&self, user_id: Uuid) -> impl Future<Output = WardenResult<()>> + Send;

    /// Replace the session only if its digest still equals
    /// `input.expected_token_hash`.
    ///
    /// Returns `WardenError::NotFound` when no session matched, either
    /// because it is gone or because another rotation won the race.
    fn rotate(&self, input: RotateSession) -> impl Future<Output = WardenResult<Session>> + Send;
}
