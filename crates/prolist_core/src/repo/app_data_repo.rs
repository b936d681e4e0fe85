//! App-data repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide get/put access to the `app_data` key/value container.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Values are stored as JSON text; this layer does not interpret them.
//! - `put_entry` overwrites in place; entries are never deleted here.

use crate::db::schema::{check_container, stored_version, APP_DATA_TABLE, SCHEMA_VERSION};
use crate::db::DbError;
use once_cell::sync::Lazy;
use rusqlite::{params, Connection, OptionalExtension};

static SELECT_VALUE_SQL: Lazy<String> =
    Lazy::new(|| format!("SELECT value FROM {APP_DATA_TABLE} WHERE key = ?1;"));
static UPSERT_SQL: Lazy<String> = Lazy::new(|| {
    format!(
        "INSERT INTO {APP_DATA_TABLE} (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = (strftime('%s', 'now') * 1000);"
    )
});
static LIST_KEYS_SQL: Lazy<String> =
    Lazy::new(|| format!("SELECT key FROM {APP_DATA_TABLE} ORDER BY key ASC;"));

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for app-data persistence operations.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("connection schema version {actual_version} does not match expected {expected_version}")]
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    #[error("store key must not be empty")]
    InvalidKey,
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for keyed app-data entries.
pub trait AppDataRepository {
    fn get_entry(&self, key: &str) -> RepoResult<Option<String>>;
    fn put_entry(&self, key: &str, value: &str) -> RepoResult<()>;
    fn list_keys(&self) -> RepoResult<Vec<String>>;
}

/// SQLite-backed app-data repository.
pub struct SqliteAppDataRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAppDataRepository<'conn> {
    /// Wraps a connection that went through [`crate::db::open_db`].
    ///
    /// Rejects raw connections whose schema was never bootstrapped.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        verify_connection(conn)?;
        Ok(Self { conn })
    }

    /// Wraps a connection already accepted by [`verify_connection`].
    pub(crate) fn verified(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

/// Checks schema version and container shape of `conn`.
pub fn verify_connection(conn: &Connection) -> RepoResult<()> {
    let actual_version = stored_version(conn)?;
    if actual_version != SCHEMA_VERSION {
        return Err(RepoError::UninitializedConnection {
            expected_version: SCHEMA_VERSION,
            actual_version,
        });
    }
    check_container(conn)?;
    Ok(())
}

impl AppDataRepository for SqliteAppDataRepository<'_> {
    fn get_entry(&self, key: &str) -> RepoResult<Option<String>> {
        ensure_key(key)?;
        let value = self
            .conn
            .query_row(SELECT_VALUE_SQL.as_str(), [key], |row| row.get::<_, String>(0))
            .optional()?;
        Ok(value)
    }

    fn put_entry(&self, key: &str, value: &str) -> RepoResult<()> {
        ensure_key(key)?;
        self.conn.execute(UPSERT_SQL.as_str(), params![key, value])?;
        Ok(())
    }

    fn list_keys(&self) -> RepoResult<Vec<String>> {
        let mut stmt = self.conn.prepare_cached(LIST_KEYS_SQL.as_str())?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }
}

fn ensure_key(key: &str) -> RepoResult<()> {
    if key.trim().is_empty() {
        return Err(RepoError::InvalidKey);
    }
    Ok(())
}
