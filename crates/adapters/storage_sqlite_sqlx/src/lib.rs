//! # myhouse-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement `StateRepository` and `CredentialRepository` from `myhouse-app::ports`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `myhouse-app` (for port traits) and `myhouse-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod credential_repo;
pub mod error;
pub mod pool;
pub mod state_repo;

pub use credential_repo::SqliteCredentialRepository;
pub use error::StorageError;
pub use pool::{Config, Database};
pub use state_repo::SqliteStateRepository;
