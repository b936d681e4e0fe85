//! Environment-driven configuration.
//!
//! # Responsibility
//! - Resolve data, database and log locations.
//! - Resolve the dataset key and access code used by front-ends.
//!
//! # Invariants
//! - Blank variables behave as unset and fall back to defaults.
//! - `log_dir` is always absolute, as required by logging init.

use crate::gate::DEFAULT_ACCESS_CODE;
use crate::logging::{default_log_level, parse_level};
use crate::service::roster_service::DEFAULT_DATASET_KEY;
use std::path::PathBuf;

const DB_FILE_NAME: &str = "prolist.sqlite3";
const LOG_DIR_NAME: &str = "logs";
const HOME_DIR_NAME: &str = ".prolist";

/// Errors raised while resolving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unsupported PROLIST_LOG_LEVEL `{0}`; expected trace|debug|info|warn|error")]
    InvalidLogLevel(String),
    #[error("log directory must be absolute, got `{}`", .0.display())]
    RelativeLogDir(PathBuf),
}

/// Resolved application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub home: PathBuf,
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: &'static str,
    pub dataset_key: String,
    pub access_code: String,
}

impl AppConfig {
    /// Loads configuration from process environment variables.
    ///
    /// Environment variables:
    /// - PROLIST_HOME: data directory (default: $HOME/.prolist, else temp dir)
    /// - PROLIST_DB_PATH: database file (default: <home>/prolist.sqlite3)
    /// - PROLIST_LOG_DIR: log directory (default: <home>/logs)
    /// - PROLIST_LOG_LEVEL: trace|debug|info|warn|error (default per build mode)
    /// - PROLIST_DATASET_KEY: store key of the roster (default: professionals)
    /// - PROLIST_ACCESS_CODE: access gate code (default: 2808)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let home = var("PROLIST_HOME").map(PathBuf::from).unwrap_or_else(|| {
            var("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(std::env::temp_dir)
                .join(HOME_DIR_NAME)
        });
        let db_path = var("PROLIST_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(DB_FILE_NAME));
        let log_dir = var("PROLIST_LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(LOG_DIR_NAME));
        if !log_dir.is_absolute() {
            return Err(ConfigError::RelativeLogDir(log_dir));
        }

        let log_level = match var("PROLIST_LOG_LEVEL") {
            Some(raw) => parse_level(&raw).ok_or(ConfigError::InvalidLogLevel(raw))?,
            None => default_log_level(),
        };

        Ok(Self {
            home,
            db_path,
            log_dir,
            log_level,
            dataset_key: var("PROLIST_DATASET_KEY")
                .unwrap_or_else(|| DEFAULT_DATASET_KEY.to_string()),
            access_code: var("PROLIST_ACCESS_CODE")
                .unwrap_or_else(|| DEFAULT_ACCESS_CODE.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ConfigError};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_derive_from_home() {
        let config = AppConfig::from_lookup(lookup(&[("HOME", "/home/ois")])).unwrap();

        assert_eq!(config.home, PathBuf::from("/home/ois/.prolist"));
        assert_eq!(config.db_path, PathBuf::from("/home/ois/.prolist/prolist.sqlite3"));
        assert_eq!(config.log_dir, PathBuf::from("/home/ois/.prolist/logs"));
        assert_eq!(config.dataset_key, "professionals");
        assert_eq!(config.access_code, "2808");
    }

    #[test]
    fn explicit_values_override_defaults_and_blanks_do_not() {
        let config = AppConfig::from_lookup(lookup(&[
            ("PROLIST_HOME", "/srv/prolist"),
            ("PROLIST_DB_PATH", "/data/roster.db"),
            ("PROLIST_LOG_LEVEL", " WARNING "),
            ("PROLIST_DATASET_KEY", "   "),
        ]))
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/data/roster.db"));
        assert_eq!(config.log_dir, PathBuf::from("/srv/prolist/logs"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.dataset_key, "professionals");
    }

    #[test]
    fn invalid_level_and_relative_log_dir_are_rejected() {
        let level = AppConfig::from_lookup(lookup(&[
            ("PROLIST_HOME", "/srv/prolist"),
            ("PROLIST_LOG_LEVEL", "verbose"),
        ]));
        assert!(matches!(level, Err(ConfigError::InvalidLogLevel(raw)) if raw == "verbose"));

        let dir = AppConfig::from_lookup(lookup(&[("PROLIST_HOME", "relative/home")]));
        assert!(matches!(dir, Err(ConfigError::RelativeLogDir(_))));
    }
}
