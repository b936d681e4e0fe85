//! Schema bootstrap for the single `app_data` container.
//!
//! # Responsibility
//! - Create the key/value container on the first open of a database.
//! - Adopt a container that predates version tracking.
//! - Verify the container shape before any caller reads or writes it.
//!
//! # Invariants
//! - There is one schema version; bootstrap is a one-time step, not a chain.
//! - The version is mirrored to `PRAGMA user_version` in the same
//!   transaction that creates the container.
//! - Databases from a newer binary are refused, never downgraded.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// Name of the single key/value container.
pub const APP_DATA_TABLE: &str = "app_data";

/// Schema version written by this binary.
pub const SCHEMA_VERSION: u32 = 1;

const CREATE_APP_DATA_SQL: &str = include_str!("app_data.sql");
const REQUIRED_COLUMNS: &[&str] = &["key", "value", "updated_at"];

/// What bootstrap found (or did) for the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    /// Already versioned and well-formed.
    Present,
    /// Created by this bootstrap.
    Created,
    /// Existed without a version; now versioned.
    Adopted,
}

impl ContainerState {
    fn label(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Created => "created",
            Self::Adopted => "adopted",
        }
    }
}

/// Makes sure `app_data` exists and the database carries [`SCHEMA_VERSION`].
pub fn ensure_app_data(conn: &mut Connection) -> DbResult<ContainerState> {
    let version = stored_version(conn)?;
    if version > SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: version,
            latest_supported: SCHEMA_VERSION,
        });
    }

    let state = if version == SCHEMA_VERSION {
        check_container(conn)?;
        ContainerState::Present
    } else {
        let existed = container_exists(conn)?;
        let tx = conn.transaction()?;
        tx.execute_batch(CREATE_APP_DATA_SQL)?;
        tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        check_container(&tx)?;
        tx.commit()?;
        if existed {
            ContainerState::Adopted
        } else {
            ContainerState::Created
        }
    };

    info!(
        "event=db_schema module=db status=ok container={} from_version={} version={}",
        state.label(),
        version,
        SCHEMA_VERSION
    );
    Ok(state)
}

/// Reads the version stored in `PRAGMA user_version` (0 when never set).
pub fn stored_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?)
}

/// Fails unless `app_data` exists with every column the repository uses.
pub fn check_container(conn: &Connection) -> DbResult<()> {
    let columns = container_columns(conn)?;
    if columns.is_empty() {
        return Err(DbError::MissingContainer(APP_DATA_TABLE));
    }
    match REQUIRED_COLUMNS
        .iter()
        .find(|required| !columns.iter().any(|column| column.as_str() == **required))
    {
        Some(missing) => Err(DbError::MissingContainerColumn {
            table: APP_DATA_TABLE,
            column: *missing,
        }),
        None => Ok(()),
    }
}

fn container_exists(conn: &Connection) -> DbResult<bool> {
    Ok(!container_columns(conn)?.is_empty())
}

fn container_columns(conn: &Connection) -> DbResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({APP_DATA_TABLE});"))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>("name"))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::{check_container, ensure_app_data, ContainerState, SCHEMA_VERSION};
    use crate::db::DbError;
    use rusqlite::Connection;

    #[test]
    fn fresh_database_gets_container_then_reports_present() {
        let mut conn = Connection::open_in_memory().unwrap();

        assert_eq!(ensure_app_data(&mut conn).unwrap(), ContainerState::Created);
        assert_eq!(ensure_app_data(&mut conn).unwrap(), ContainerState::Present);
        assert_eq!(super::stored_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn unversioned_container_is_adopted() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE app_data (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL DEFAULT 0
            );",
        )
        .unwrap();

        assert_eq!(ensure_app_data(&mut conn).unwrap(), ContainerState::Adopted);
    }

    #[test]
    fn malformed_container_is_rejected_and_left_unversioned() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE app_data (key TEXT PRIMARY KEY, value TEXT);")
            .unwrap();

        let err = ensure_app_data(&mut conn).unwrap_err();
        assert!(matches!(
            err,
            DbError::MissingContainerColumn {
                table: "app_data",
                column: "updated_at"
            }
        ));
        assert_eq!(super::stored_version(&conn).unwrap(), 0);
    }

    #[test]
    fn versioned_database_without_container_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "user_version", SCHEMA_VERSION).unwrap();

        assert!(matches!(
            check_container(&conn),
            Err(DbError::MissingContainer("app_data"))
        ));
    }
}
