use prolist_core::db::schema::SCHEMA_VERSION;
use prolist_core::db::{open_db_in_memory, DbError};
use prolist_core::{AppDataRepository, RepoError, SqliteAppDataRepository};
use rusqlite::Connection;

#[test]
fn put_then_get_returns_stored_text() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAppDataRepository::try_new(&conn).unwrap();

    repo.put_entry("professionals", r#"[{"id":"a"}]"#).unwrap();

    assert_eq!(
        repo.get_entry("professionals").unwrap().as_deref(),
        Some(r#"[{"id":"a"}]"#)
    );
    assert!(repo.get_entry("other").unwrap().is_none());
}

#[test]
fn put_overwrites_existing_entry() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAppDataRepository::try_new(&conn).unwrap();

    repo.put_entry("k", "1").unwrap();
    repo.put_entry("k", "2").unwrap();

    assert_eq!(repo.get_entry("k").unwrap().as_deref(), Some("2"));
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM app_data;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn list_keys_is_sorted() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAppDataRepository::try_new(&conn).unwrap();

    repo.put_entry("zeta", "0").unwrap();
    repo.put_entry("alpha", "0").unwrap();

    assert_eq!(repo.list_keys().unwrap(), vec!["alpha", "zeta"]);
}

#[test]
fn blank_key_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteAppDataRepository::try_new(&conn).unwrap();

    assert!(matches!(repo.put_entry("  ", "1"), Err(RepoError::InvalidKey)));
    assert!(matches!(repo.get_entry(""), Err(RepoError::InvalidKey)));
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteAppDataRepository::try_new(&conn);
    match result {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, SCHEMA_VERSION),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_app_data_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.pragma_update(None, "user_version", SCHEMA_VERSION)
        .unwrap();

    let result = SqliteAppDataRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::Db(DbError::MissingContainer("app_data")))
    ));
}
