//! SQLite storage bootstrap, schema setup and session factory.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the student store.
//! - Apply the schema bootstrap before any data access.
//! - Hand out one connection per unit of work.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - No student data is read or written before the bootstrap succeeds.

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory, Session, SessionFactory};

pub type StoreResult<T> = Result<T, StoreError>;

/// Transport-level failure talking to the store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    #[error("connection pool: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("session factory is shut down")]
    Closed,
}
