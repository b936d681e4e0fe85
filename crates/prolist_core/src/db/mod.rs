//! SQLite storage bootstrap and schema versioning entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the professional roster.
//! - Make sure the single `app_data` container exists before use.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version` (see [`schema`]).
//! - Core code must not read/write `app_data` before bootstrap succeeds.

mod open;
pub mod schema;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error("database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    #[error("required table `{0}` is missing")]
    MissingContainer(&'static str),
    #[error("table `{table}` is missing column `{column}`")]
    MissingContainerColumn {
        table: &'static str,
        column: &'static str,
    },
}
