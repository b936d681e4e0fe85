//! Core domain logic for the professional roster.
//! This crate is the single source of truth for roster invariants and
//! for how the roster is persisted.

pub mod config;
pub mod db;
pub mod gate;
pub mod import;
pub mod logging;
pub mod model;
pub mod persisted;
pub mod repo;
pub mod roster;
pub mod service;
pub mod store;

pub use config::{AppConfig, ConfigError};
pub use gate::{AccessGate, GateError, DEFAULT_ACCESS_CODE};
pub use import::parse_import;
pub use logging::{default_log_level, init_logging, LoggingError};
pub use model::professional::{NewProfessional, Professional, ProfessionalId, ValidationError};
pub use persisted::{PersistError, PersistedValue, WriteHandle};
pub use repo::app_data_repo::{
    verify_connection, AppDataRepository, RepoError, RepoResult, SqliteAppDataRepository,
};
pub use roster::{Roster, RosterError};
pub use service::roster_service::{Applied, RosterService, DEFAULT_DATASET_KEY};
pub use store::{shared_store, KvStore, SqliteKvStore, StoreError, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
