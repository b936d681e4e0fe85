//! Reactive persisted value: load once, then write through on every update.
//!
//! # Responsibility
//! - Hold the in-memory value bound to one store key.
//! - Load the stored value asynchronously on activation.
//! - Persist every committed value through an ordered write queue.
//!
//! # Invariants
//! - Setters update memory synchronously; persistence never blocks them.
//! - Writes reach the store in the order they were committed.
//! - `initialized` flips to `true` exactly once, after the load resolves,
//!   whatever its outcome.
//! - A loaded value is applied only if nothing was committed since
//!   construction; a local commit always wins over a late load.
//! - Store failures are logged and never propagated to setters.

use crate::store::KvStore;
use log::{debug, error, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio::sync::{mpsc, oneshot, watch};

/// Failure reported through a [`WriteHandle`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PersistError {
    #[error("value could not be encoded: {0}")]
    Encode(String),
    #[error("store write failed: {0}")]
    Store(String),
    #[error("write queue closed before the value was persisted")]
    WriterClosed,
}

/// Completion signal of one queued write.
///
/// Dropping the handle leaves the write running (fire-and-forget).
#[must_use = "drop the handle explicitly for fire-and-forget writes"]
pub struct WriteHandle {
    done: oneshot::Receiver<Result<(), PersistError>>,
}

impl WriteHandle {
    /// Waits until the write was attempted against the store.
    pub async fn wait(self) -> Result<(), PersistError> {
        self.done.await.unwrap_or(Err(PersistError::WriterClosed))
    }

    fn failed(err: PersistError) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(Err(err));
        Self { done: rx }
    }
}

enum WriteOp {
    Put {
        value: Value,
        done: oneshot::Sender<Result<(), PersistError>>,
    },
    Barrier(oneshot::Sender<()>),
}

struct State<T> {
    value: T,
    revision: u64,
}

struct Shared<T> {
    key: String,
    state: Mutex<State<T>>,
    initialized: watch::Sender<bool>,
}

impl<T> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Value of type `T` kept in memory and mirrored to one store key.
pub struct PersistedValue<T> {
    shared: Arc<Shared<T>>,
    store: Arc<dyn KvStore>,
    initial: T,
    writes: mpsc::UnboundedSender<WriteOp>,
}

impl<T> PersistedValue<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Binds `key` in `store`, starting from `initial` until the load resolves.
    ///
    /// # Panics
    /// - Must be called from within a tokio runtime; the load and writer
    ///   tasks are spawned immediately.
    pub fn new(store: Arc<dyn KvStore>, key: impl Into<String>, initial: T) -> Self {
        let (initialized, _) = watch::channel(false);
        let shared = Arc::new(Shared {
            key: key.into(),
            state: Mutex::new(State {
                value: initial.clone(),
                revision: 0,
            }),
            initialized,
        });
        let (writes, queue) = mpsc::unbounded_channel();

        tokio::spawn(run_writer(
            Arc::clone(&store),
            shared.key.clone(),
            queue,
        ));
        tokio::spawn(run_load(Arc::clone(&store), Arc::clone(&shared)));

        Self {
            shared,
            store,
            initial,
            writes,
        }
    }

    /// Builds a fresh binding for another key over the same store.
    ///
    /// The new instance starts from the initial value and loads again.
    pub fn rekey(&self, key: impl Into<String>) -> Self {
        Self::new(Arc::clone(&self.store), key, self.initial.clone())
    }

    pub fn key(&self) -> &str {
        &self.shared.key
    }

    /// Returns a snapshot of the current in-memory value.
    pub fn get(&self) -> T {
        self.shared.lock().value.clone()
    }

    /// Runs `f` against the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.shared.lock().value)
    }

    pub fn is_initialized(&self) -> bool {
        *self.shared.initialized.borrow()
    }

    /// Resolves once the initial load has finished (successfully or not).
    pub async fn wait_initialized(&self) {
        let mut initialized = self.shared.initialized.subscribe();
        let _ = initialized.wait_for(|done| *done).await;
    }

    /// Replaces the value.
    pub fn set(&self, value: T) -> WriteHandle {
        let mut state = self.shared.lock();
        self.commit(&mut state, value)
    }

    /// Replaces the value with `f(current)`.
    pub fn update(&self, f: impl FnOnce(&T) -> T) -> WriteHandle {
        let mut state = self.shared.lock();
        let next = f(&state.value);
        self.commit(&mut state, next)
    }

    /// Applies a fallible edit to a copy of the value.
    ///
    /// The copy is committed only when `f` returns `Ok`; on `Err` the value
    /// is left untouched and nothing is written.
    pub fn try_modify<R, E>(
        &self,
        f: impl FnOnce(&mut T) -> Result<R, E>,
    ) -> Result<(R, WriteHandle), E> {
        let mut state = self.shared.lock();
        let mut draft = state.value.clone();
        let output = f(&mut draft)?;
        let handle = self.commit(&mut state, draft);
        Ok((output, handle))
    }

    /// Waits until every write committed so far has been attempted.
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        if self.writes.send(WriteOp::Barrier(tx)).is_ok() {
            let _ = rx.await;
        }
    }

    // Enqueues while the state lock is held so queue order matches commit order.
    fn commit(&self, state: &mut State<T>, next: T) -> WriteHandle {
        let encoded = serde_json::to_value(&next);
        state.value = next;
        state.revision += 1;

        let value = match encoded {
            Ok(value) => value,
            Err(err) => {
                error!(
                    "event=persist_write module=persisted status=error key={} error_code=encode_failed error={}",
                    self.shared.key, err
                );
                return WriteHandle::failed(PersistError::Encode(err.to_string()));
            }
        };

        let (done, rx) = oneshot::channel();
        if self.writes.send(WriteOp::Put { value, done }).is_err() {
            warn!(
                "event=persist_write module=persisted status=error key={} error_code=writer_closed",
                self.shared.key
            );
            return WriteHandle::failed(PersistError::WriterClosed);
        }
        debug!(
            "event=persist_write module=persisted status=queued key={} revision={}",
            self.shared.key, state.revision
        );
        WriteHandle { done: rx }
    }
}

async fn run_writer(
    store: Arc<dyn KvStore>,
    key: String,
    mut queue: mpsc::UnboundedReceiver<WriteOp>,
) {
    while let Some(op) = queue.recv().await {
        match op {
            WriteOp::Put { value, done } => {
                let started_at = Instant::now();
                let result = match store.put(&key, value).await {
                    Ok(()) => {
                        debug!(
                            "event=persist_write module=persisted status=ok key={} duration_ms={}",
                            key,
                            started_at.elapsed().as_millis()
                        );
                        Ok(())
                    }
                    Err(err) => {
                        error!(
                            "event=persist_write module=persisted status=error key={} duration_ms={} error_code=store_put_failed error={}",
                            key,
                            started_at.elapsed().as_millis(),
                            err
                        );
                        Err(PersistError::Store(err.to_string()))
                    }
                };
                let _ = done.send(result);
            }
            WriteOp::Barrier(done) => {
                let _ = done.send(());
            }
        }
    }
}

async fn run_load<T>(store: Arc<dyn KvStore>, shared: Arc<Shared<T>>)
where
    T: DeserializeOwned,
{
    let started_at = Instant::now();
    match store.get(&shared.key).await {
        Ok(Some(raw)) => match serde_json::from_value::<T>(raw) {
            Ok(loaded) => {
                let mut state = shared.lock();
                if state.revision == 0 {
                    state.value = loaded;
                    info!(
                        "event=persist_load module=persisted status=ok key={} duration_ms={}",
                        shared.key,
                        started_at.elapsed().as_millis()
                    );
                } else {
                    info!(
                        "event=persist_load module=persisted status=skipped key={} revision={} duration_ms={}",
                        shared.key,
                        state.revision,
                        started_at.elapsed().as_millis()
                    );
                }
            }
            Err(err) => error!(
                "event=persist_load module=persisted status=error key={} error_code=decode_failed error={}",
                shared.key, err
            ),
        },
        Ok(None) => info!(
            "event=persist_load module=persisted status=empty key={} duration_ms={}",
            shared.key,
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=persist_load module=persisted status=error key={} error_code=store_get_failed error={}",
            shared.key, err
        ),
    }

    shared.initialized.send_replace(true);
}
