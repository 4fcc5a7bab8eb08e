//! Domain models for Warden.

pub mod session;
