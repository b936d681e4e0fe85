use super::{KvStore, StoreError, StoreResult};
use crate::db::{open_db, open_db_in_memory};
use crate::repo::app_data_repo::{verify_connection, AppDataRepository, SqliteAppDataRepository};
use async_trait::async_trait;
use log::debug;
use rusqlite::Connection;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// SQLite-backed [`KvStore`].
///
/// One connection is shared by all operations; each operation runs on the
/// blocking pool and holds the connection lock for its whole duration.
/// The schema is verified once, when the store is opened.
#[derive(Debug, Clone)]
pub struct SqliteKvStore {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl SqliteKvStore {
    /// Opens (and bootstraps when needed) a database file.
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let open_path = path.clone();
        let conn = tokio::task::spawn_blocking(move || verified(open_db(open_path)?)).await??;
        Ok(Self::from_connection(conn, Some(path)))
    }

    /// Opens a private in-memory database.
    pub async fn open_in_memory() -> StoreResult<Self> {
        let conn = tokio::task::spawn_blocking(|| verified(open_db_in_memory()?)).await??;
        Ok(Self::from_connection(conn, None))
    }

    fn from_connection(conn: Connection, path: Option<PathBuf>) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            path,
        }
    }

    /// Database file path, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Lists every key currently stored, sorted ascending.
    pub async fn keys(&self) -> StoreResult<Vec<String>> {
        self.with_repo(|repo| Ok(repo.list_keys()?)).await
    }

    async fn with_repo<R, F>(&self, f: F) -> StoreResult<R>
    where
        R: Send + 'static,
        F: FnOnce(&SqliteAppDataRepository<'_>) -> StoreResult<R> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock().map_err(|_| StoreError::Poisoned)?;
            let repo = SqliteAppDataRepository::verified(&guard);
            f(&repo)
        })
        .await?
    }
}

fn verified(conn: Connection) -> StoreResult<Connection> {
    verify_connection(&conn)?;
    Ok(conn)
}

#[async_trait]
impl KvStore for SqliteKvStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Value>> {
        let owned_key = key.to_string();
        let raw = self
            .with_repo(move |repo| Ok(repo.get_entry(&owned_key)?))
            .await?;
        debug!(
            "event=store_get module=store status=ok key={} found={}",
            key,
            raw.is_some()
        );

        raw.map(|text| {
            serde_json::from_str(&text).map_err(|source| StoreError::Corrupt {
                key: key.to_string(),
                source,
            })
        })
        .transpose()
    }

    async fn put(&self, key: &str, value: Value) -> StoreResult<()> {
        let text = serde_json::to_string(&value).map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })?;
        let owned_key = key.to_string();
        let bytes = text.len();
        self.with_repo(move |repo| Ok(repo.put_entry(&owned_key, &text)?))
            .await?;
        debug!("event=store_put module=store status=ok key={key} bytes={bytes}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SqliteKvStore;
    use crate::store::{KvStore, StoreError};
    use serde_json::json;

    #[tokio::test]
    async fn missing_key_reads_as_none() {
        let store = SqliteKvStore::open_in_memory().await.unwrap();
        assert!(store.get("absent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn put_overwrites_previous_value() {
        let store = SqliteKvStore::open_in_memory().await.unwrap();
        store.put("k", json!(1)).await.unwrap();
        store.put("k", json!({"n": 2})).await.unwrap();

        assert_eq!(store.get("k").await.unwrap(), Some(json!({"n": 2})));
        assert_eq!(store.keys().await.unwrap(), vec!["k".to_string()]);
    }

    #[tokio::test]
    async fn empty_key_is_rejected() {
        let store = SqliteKvStore::open_in_memory().await.unwrap();
        let err = store.put(" ", json!(null)).await.unwrap_err();
        assert!(matches!(err, StoreError::Repo(_)));
    }

    #[tokio::test]
    async fn schema_is_checked_at_open_not_per_operation() {
        let store = SqliteKvStore::open_in_memory().await.unwrap();
        store
            .conn
            .lock()
            .unwrap()
            .pragma_update(None, "user_version", 0)
            .unwrap();

        store.put("k", json!(1)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(json!(1)));
    }

    #[tokio::test]
    async fn non_json_payload_is_reported_as_corrupt() {
        let store = SqliteKvStore::open_in_memory().await.unwrap();
        {
            let conn = store.conn.lock().unwrap();
            conn.execute(
                "INSERT INTO app_data (key, value) VALUES ('broken', 'not json');",
                [],
            )
            .unwrap();
        }

        let err = store.get("broken").await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { ref key, .. } if key == "broken"));
    }
}
