//! Runtime configuration for the core.
//!
//! # Invariants
//! - `db_path = None` selects a throwaway in-memory store.
//! - `sweep_interval` is never zero.
//! - File logging starts only when `log_dir` is set.

use crate::logging::{default_log_level, init_logging, LoggingError};
use std::path::PathBuf;
use std::time::Duration;

const DB_PATH_ENV: &str = "ROTINA_DB_PATH";
const SWEEP_INTERVAL_ENV: &str = "ROTINA_SWEEP_INTERVAL_MINUTES";
const LOG_LEVEL_ENV: &str = "ROTINA_LOG_LEVEL";
const LOG_DIR_ENV: &str = "ROTINA_LOG_DIR";

const SECONDS_PER_MINUTE: u64 = 60;

/// Default period of the completed-task sweep.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * SECONDS_PER_MINUTE);

/// Core wiring options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// SQLite file holding the key-value store.
    pub db_path: Option<PathBuf>,
    /// Period of the background sweep.
    pub sweep_interval: Duration,
    /// Level used by `init_logging`.
    pub log_level: String,
    /// Absolute directory for rolling log files; `None` keeps logging off.
    pub log_dir: Option<String>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Config backed by a database file.
    pub fn with_db_path(path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Builds config from `ROTINA_*` environment variables.
    ///
    /// Blank, unparsable or out-of-range values fall back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Starts file logging with `log_level` when `log_dir` is configured.
    ///
    /// Returns `Ok(false)` when no directory is configured.
    pub fn init_logging(&self) -> Result<bool, LoggingError> {
        match self.log_dir.as_deref() {
            Some(dir) => init_logging(&self.log_level, dir).map(|()| true),
            None => Ok(false),
        }
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = non_blank(lookup(DB_PATH_ENV)) {
            config.db_path = Some(PathBuf::from(path));
        }

        if let Some(interval) = lookup(SWEEP_INTERVAL_ENV)
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|minutes| *minutes > 0)
            .and_then(|minutes| minutes.checked_mul(SECONDS_PER_MINUTE))
        {
            config.sweep_interval = Duration::from_secs(interval);
        }

        if let Some(level) = non_blank(lookup(LOG_LEVEL_ENV)) {
            config.log_level = level.to_ascii_lowercase();
        }

        config.log_dir = non_blank(lookup(LOG_DIR_ENV));

        config
    }
}

fn non_blank(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
