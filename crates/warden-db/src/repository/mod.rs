//! SurrealDB repository implementations.

mod session;

pub use session::SurrealSessionRepository;
