//! Runtime configuration for hosts embedding the route core.
//!
//! # Responsibility
//! - Collect database and logging settings from the environment.
//!
//! # Invariants
//! - Blank values are treated as unset.
//! - `log_level` always holds a value; it falls back to `default_log_level()`.

use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "BUSROUTE_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "BUSROUTE_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "BUSROUTE_LOG_DIR";

/// Host-provided settings for opening the store and starting logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// SQLite file path. `None` means the host has no persistent store.
    pub db_path: Option<PathBuf>,
    /// One of `trace|debug|info|warn|error`; validated by `init_logging`.
    pub log_level: String,
    /// Absolute directory for rolling log files. `None` disables file logging.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Reads `BUSROUTE_DB_PATH`, `BUSROUTE_LOG_LEVEL` and `BUSROUTE_LOG_DIR`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let defaults = Self::default();
        Self {
            db_path: read(ENV_DB_PATH).map(PathBuf::from),
            log_level: read(ENV_LOG_LEVEL).unwrap_or(defaults.log_level),
            log_dir: read(ENV_LOG_DIR).map(PathBuf::from),
        }
    }
}
