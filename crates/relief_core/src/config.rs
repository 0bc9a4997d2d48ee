//! Client configuration resolved from the environment.
//!
//! Variables:
//! - `RELIEF_STORE_URL`: base URL of the remote incident service. When set
//!   it takes precedence over the embedded store.
//! - `RELIEF_DB_PATH`: embedded store database file.
//! - `RELIEF_HTTP_TIMEOUT_SECS`: per-request timeout for the remote service.
//! - `RELIEF_LOG_LEVEL`, `RELIEF_LOG_DIR`: file logging; logging stays off
//!   when no directory is given.

use crate::logging::default_log_level;
use crate::store::http::DEFAULT_TIMEOUT;
use std::path::PathBuf;
use std::time::Duration;

pub const STORE_URL_ENV: &str = "RELIEF_STORE_URL";
pub const DB_PATH_ENV: &str = "RELIEF_DB_PATH";
pub const HTTP_TIMEOUT_ENV: &str = "RELIEF_HTTP_TIMEOUT_SECS";
pub const LOG_LEVEL_ENV: &str = "RELIEF_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "RELIEF_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "relief_store.sqlite3";

/// Which store implementation the client talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreTarget {
    Remote { base_url: String, timeout: Duration },
    Embedded { db_path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub store: StoreTarget,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl ClientConfig {
    /// Resolves configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration from an arbitrary variable source.
    ///
    /// Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let timeout = read(HTTP_TIMEOUT_ENV)
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map_or(DEFAULT_TIMEOUT, Duration::from_secs);

        let store = match read(STORE_URL_ENV) {
            Some(base_url) => StoreTarget::Remote { base_url, timeout },
            None => StoreTarget::Embedded {
                db_path: read(DB_PATH_ENV)
                    .map(PathBuf::from)
                    .unwrap_or_else(default_db_path),
            },
        };

        Self {
            store,
            log_level: read(LOG_LEVEL_ENV).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: read(LOG_DIR_ENV).map(PathBuf::from),
        }
    }
}

/// Embedded store location used when `RELIEF_DB_PATH` is unset.
pub fn default_db_path() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)
}
