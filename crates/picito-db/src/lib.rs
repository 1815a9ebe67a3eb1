//! Picito Database — SurrealDB connection management, schema
//! migrations and repository implementations.
//!
//! Repositories are generic over the SurrealDB [`surrealdb::Connection`]
//! so the same code runs against the embedded in-memory engine in tests
//! and a remote server in production.

mod connection;
mod error;
pub mod repository;
mod schema;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use schema::{current_version, latest_version, run_migrations};
