//! Warden Core — shared domain model, error taxonomy and the session
//! store contract.

pub mod error;
pub mod models;
pub mod repository;

pub use error::{WardenError, WardenResult};
