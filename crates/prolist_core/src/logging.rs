//! Process logging for prolist front-ends.
//!
//! # Responsibility
//! - Start one rolling file logger per process from an `AppConfig`.
//! - Record which database and dataset the session works against.
//! - Route panics into the log as a single sanitized line.
//!
//! # Invariants
//! - Log lines carry ids and counts only, never names of professionals.
//! - Starting again with the same directory and level is a no-op.
//! - A second start with another directory or level is refused, the first
//!   logger stays active.

use crate::config::AppConfig;
use flexi_logger::{
    Cleanup, Criterion, FileSpec, FlexiLoggerError, Logger, LoggerHandle, Naming, WriteMode,
};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

const LOG_BASENAME: &str = "prolist";
const ROTATE_AT_BYTES: u64 = 4 * 1024 * 1024;
const KEEP_ROTATED: usize = 3;
const PANIC_PAYLOAD_LIMIT: usize = 120;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();

struct ActiveLogger {
    level: &'static str,
    dir: PathBuf,
    _handle: LoggerHandle,
}

impl ActiveLogger {
    fn matches(&self, level: &'static str, dir: &Path) -> Result<(), LoggingError> {
        if self.level == level && self.dir == dir {
            return Ok(());
        }
        Err(LoggingError::AlreadyActive {
            level: self.level,
            dir: self.dir.clone(),
        })
    }
}

/// Errors raised while starting the logger.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("logging already active at `{}` with level `{level}`", .dir.display())]
    AlreadyActive { level: &'static str, dir: PathBuf },
    #[error("cannot create log directory `{}`: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("logger backend failed: {0}")]
    Backend(#[from] FlexiLoggerError),
}

/// Starts file logging under `config.log_dir` at `config.log_level`.
///
/// The first successful call writes a `logging_init` line naming the
/// database file and dataset key so later lines can be tied to a session.
pub fn init_logging(config: &AppConfig) -> Result<(), LoggingError> {
    let level = config.log_level;
    let dir = config.log_dir.as_path();

    if let Some(active) = ACTIVE.get() {
        return active.matches(level, dir);
    }

    let active = ACTIVE.get_or_try_init(|| start(level, dir))?;
    active.matches(level, dir)?;

    info!(
        "event=logging_init module=core status=ok version={} level={} db_path={} dataset_key={}",
        env!("CARGO_PKG_VERSION"),
        level,
        config.db_path.display(),
        config.dataset_key
    );
    Ok(())
}

fn start(level: &'static str, dir: &Path) -> Result<ActiveLogger, LoggingError> {
    std::fs::create_dir_all(dir).map_err(|source| LoggingError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let handle = Logger::try_with_str(level)?
        .log_to_file(FileSpec::default().directory(dir).basename(LOG_BASENAME))
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_ROTATED),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()?;

    route_panics_to_log();

    Ok(ActiveLogger {
        level,
        dir: dir.to_path_buf(),
        _handle: handle,
    })
}

/// Level used when `PROLIST_LOG_LEVEL` is unset: `debug` in debug builds,
/// `info` otherwise.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

/// Maps a user-supplied level name onto the levels the logger accepts.
pub(crate) fn parse_level(raw: &str) -> Option<&'static str> {
    let level = match raw.trim().to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "info" => "info",
        "warn" | "warning" => "warn",
        "error" => "error",
        _ => return None,
    };
    Some(level)
}

// Only called from `start`, which the OnceCell runs at most once.
fn route_panics_to_log() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |hook_info| {
        let location = hook_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = hook_info
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| hook_info.payload().downcast_ref::<String>().map(String::as_str))
            .unwrap_or("<non-string payload>");
        error!(
            "event=panic module=core status=error location={} payload={}",
            location,
            one_line(payload, PANIC_PAYLOAD_LIMIT)
        );
        previous(hook_info);
    }));
}

fn one_line(value: &str, limit: usize) -> String {
    let mut chars = value.chars().map(|c| if c == '\n' || c == '\r' { ' ' } else { c });
    let mut line: String = chars.by_ref().take(limit).collect();
    if chars.next().is_some() {
        line.push_str("...");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::{init_logging, one_line, parse_level, LoggingError};
    use crate::config::AppConfig;

    fn config_at(home: &std::path::Path, level: &str) -> AppConfig {
        let home = home.to_string_lossy().into_owned();
        let level = level.to_string();
        AppConfig::from_lookup(move |name| match name {
            "PROLIST_HOME" => Some(home.clone()),
            "PROLIST_LOG_LEVEL" => Some(level.clone()),
            _ => None,
        })
        .expect("config should resolve")
    }

    #[test]
    fn level_names_are_normalized() {
        assert_eq!(parse_level(" WARNING "), Some("warn"));
        assert_eq!(parse_level("Trace"), Some("trace"));
        assert_eq!(parse_level("verbose"), None);
    }

    #[test]
    fn one_line_flattens_and_caps_payload() {
        assert_eq!(one_line("a\nb\rc", 10), "a b c");
        assert_eq!(one_line("abcdef", 3), "abc...");
        assert_eq!(one_line("abc", 3), "abc");
    }

    #[test]
    fn second_start_must_match_the_active_logger() {
        let first = tempfile::tempdir().expect("temp dir");
        let second = tempfile::tempdir().expect("temp dir");
        let config = config_at(first.path(), "info");

        init_logging(&config).expect("first start");
        init_logging(&config_at(first.path(), "INFO")).expect("same settings are a no-op");
        assert!(config.log_dir.is_dir());

        let err = init_logging(&config_at(first.path(), "debug")).unwrap_err();
        assert!(matches!(err, LoggingError::AlreadyActive { level: "info", .. }));

        let err = init_logging(&config_at(second.path(), "info")).unwrap_err();
        match err {
            LoggingError::AlreadyActive { dir, .. } => assert_eq!(dir, config.log_dir),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
