//! Asynchronous key/value store adapter.
//!
//! # Responsibility
//! - Expose `get`/`put` of JSON values by key over the embedded database.
//! - Keep blocking SQLite calls off the async executor threads.
//! - Provide one lazily-opened, process-wide store instance.
//!
//! # Invariants
//! - Operations issued against one store handle are serialized.
//! - A missing key reads as `None`, never as an error.

mod shared;
mod sqlite;

pub use shared::shared_store;
pub use sqlite::SqliteKvStore;

use crate::db::DbError;
use crate::repo::app_data_repo::RepoError;
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure while opening, reading or writing the store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store open failed: {0}")]
    Open(#[from] DbError),
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error("stored value for key `{key}` is not valid JSON: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("value for key `{key}` could not be encoded: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("store connection lock is poisoned")]
    Poisoned,
    #[error("store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("shared store already open at `{}`; refusing to open `{}`", .open.display(), .requested.display())]
    AlreadyOpen { open: PathBuf, requested: PathBuf },
}

/// Keyed JSON value store.
///
/// Implementations must tolerate concurrent callers; ordering between
/// callers is whatever order the calls reach the underlying handle.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> StoreResult<Option<Value>>;
    async fn put(&self, key: &str, value: Value) -> StoreResult<()>;
}
