use prolist_core::{shared_store, KvStore, StoreError};
use serde_json::json;
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_callers_share_one_open_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shared.sqlite3");

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let path = path.clone();
            tokio::spawn(async move { shared_store(path).await.unwrap() })
        })
        .collect();

    let mut stores = Vec::new();
    for handle in handles {
        stores.push(handle.await.unwrap());
    }
    assert!(stores.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));

    stores[0].put("k", json!(5)).await.unwrap();
    assert_eq!(stores[7].get("k").await.unwrap(), Some(json!(5)));

    let other = dir.path().join("other.sqlite3");
    let err = shared_store(&other).await.unwrap_err();
    assert!(matches!(err, StoreError::AlreadyOpen { .. }));
}
