//! Warden Database — SurrealDB connection management and the session
//! store.
//!
//! This crate provides:
//! - Opening the store ([`open_store`], [`DbConfig`])
//! - Session table bootstrap ([`ensure_schema`])
//! - The [`SessionRepository`](warden_core::repository::SessionRepository)
//!   implementation ([`repository::SurrealSessionRepository`])

mod connection;
mod error;
pub mod repository;
mod schema;

pub use connection::{DbConfig, open_store};
pub use error::DbError;
pub use schema::{ensure_schema, session_table_ddl};
