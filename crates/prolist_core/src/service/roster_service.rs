//! Roster use-case service.
//!
//! # Responsibility
//! - Expose add/edit/delete/import over the persisted roster.
//! - Log every mutation as a metadata-only event.
//!
//! # Invariants
//! - Rejected operations change nothing and write nothing.
//! - Accepted operations are visible immediately; durability is reported
//!   through the returned `WriteHandle`.

use crate::import::parse_import;
use crate::model::professional::{Professional, ProfessionalId};
use crate::persisted::{PersistedValue, WriteHandle};
use crate::roster::{Roster, RosterError};
use crate::store::KvStore;
use log::{info, warn};
use std::path::Path;
use std::sync::Arc;

/// Store key of the roster when none is configured.
pub const DEFAULT_DATASET_KEY: &str = "professionals";

/// Result of an accepted roster mutation.
pub struct Applied<R> {
    /// Operation output (the affected entry, or the imported count).
    pub value: R,
    /// Completion of the write that persists this mutation.
    pub write: WriteHandle,
}

/// Roster facade over a [`PersistedValue`].
pub struct RosterService {
    roster: PersistedValue<Roster>,
}

impl RosterService {
    /// Binds the roster stored under `key`; loading starts immediately.
    pub fn new(store: Arc<dyn KvStore>, key: impl Into<String>) -> Self {
        Self {
            roster: PersistedValue::new(store, key, Roster::new()),
        }
    }

    /// Binds the roster and waits for the initial load.
    pub async fn open(store: Arc<dyn KvStore>, key: impl Into<String>) -> Self {
        let service = Self::new(store, key);
        service.wait_initialized().await;
        service
    }

    pub fn is_initialized(&self) -> bool {
        self.roster.is_initialized()
    }

    pub async fn wait_initialized(&self) {
        self.roster.wait_initialized().await;
    }

    /// Snapshot of all professionals in roster order.
    pub fn professionals(&self) -> Vec<Professional> {
        self.roster.with(|roster| roster.as_slice().to_vec())
    }

    pub fn len(&self) -> usize {
        self.roster.with(Roster::len)
    }

    pub fn is_empty(&self) -> bool {
        self.roster.with(Roster::is_empty)
    }

    pub fn get(&self, id: ProfessionalId) -> Option<Professional> {
        self.roster.with(|roster| roster.get(id).cloned())
    }

    pub fn add(&self, first_name: &str, last_name: &str) -> Result<Applied<Professional>, RosterError> {
        let result = self
            .roster
            .try_modify(|roster| roster.add(first_name, last_name));
        log_outcome("roster_add", &result);
        let (value, write) = result?;
        Ok(Applied { value, write })
    }

    pub fn edit(
        &self,
        id: ProfessionalId,
        first_name: &str,
        last_name: &str,
    ) -> Result<Applied<Professional>, RosterError> {
        let result = self
            .roster
            .try_modify(|roster| roster.edit(id, first_name, last_name));
        log_outcome("roster_edit", &result);
        let (value, write) = result?;
        Ok(Applied { value, write })
    }

    /// Deletes the professional with `id`; `None` when it does not exist.
    ///
    /// Callers confirm intent before invoking.
    pub fn delete(&self, id: ProfessionalId) -> Option<Applied<Professional>> {
        let result = self
            .roster
            .try_modify(|roster| roster.delete(id).ok_or(RosterError::NotFound(id)));
        log_outcome("roster_delete", &result);
        result.ok().map(|(value, write)| Applied { value, write })
    }

    /// Parses `text` and appends every valid record.
    ///
    /// Fails with [`RosterError::NoValidRecords`] when nothing was usable.
    pub fn import_text(&self, text: &str) -> Result<Applied<usize>, RosterError> {
        let entries = parse_import(text);
        if entries.is_empty() {
            warn!("event=roster_import module=roster status=rejected error_code=no_valid_records");
            return Err(RosterError::NoValidRecords);
        }

        let (value, write) = self
            .roster
            .try_modify(|roster| Ok::<_, RosterError>(roster.import_batch(entries)))?;
        info!("event=roster_import module=roster status=ok count={value}");
        Ok(Applied { value, write })
    }

    /// Reads `path` asynchronously and imports its content.
    pub async fn import_file(&self, path: impl AsRef<Path>) -> Result<Applied<usize>, RosterError> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| RosterError::ImportRead {
                path: path.to_path_buf(),
                source,
            })?;
        self.import_text(&text)
    }

    /// Waits until every mutation so far has been written.
    pub async fn flush(&self) {
        self.roster.flush().await;
    }
}

fn log_outcome<W>(event: &str, result: &Result<(Professional, W), RosterError>) {
    match result {
        Ok((professional, _)) => info!(
            "event={} module=roster status=ok id={}",
            event, professional.id
        ),
        Err(err) => warn!(
            "event={} module=roster status=rejected error={}",
            event, err
        ),
    }
}
