use super::{SqliteKvStore, StoreError, StoreResult};
use log::info;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::OnceCell;

static SHARED_STORE: OnceCell<Arc<SqliteKvStore>> = OnceCell::const_new();

/// Returns the process-wide store, opening it on first use.
///
/// # Invariants
/// - The database is opened at most once per process; concurrent first
///   callers all await the same open.
/// - A failed open is not remembered; the next call tries again.
/// - Once open, requests for a different path are rejected.
pub async fn shared_store(path: impl AsRef<Path>) -> StoreResult<Arc<SqliteKvStore>> {
    let requested = path.as_ref().to_path_buf();
    let open_path = requested.clone();
    let store = SHARED_STORE
        .get_or_try_init(|| async move {
            let store = SqliteKvStore::open(&open_path).await?;
            info!(
                "event=store_init module=store status=ok path={}",
                open_path.display()
            );
            Ok::<_, StoreError>(Arc::new(store))
        })
        .await?;

    match store.path() {
        Some(open) if open == requested.as_path() => Ok(Arc::clone(store)),
        open => Err(StoreError::AlreadyOpen {
            open: open.map(Path::to_path_buf).unwrap_or_default(),
            requested,
        }),
    }
}
