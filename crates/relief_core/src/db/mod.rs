//! Embedded incident database: connection bootstrap and schema upgrades.
//!
//! Used by `SqliteIncidentStore` when the client runs without a remote
//! server. Callers get a connection from `open_db*` and never run SQL
//! against a database that has not been brought to `latest_version()`.
//!
//! # Invariants
//! - The applied schema version lives in `PRAGMA user_version`.
//! - A database written by a newer build is refused, never downgraded.
//! - Foreign keys are enforced, so relief updates cannot outlive their
//!   incident.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening, upgrading, or querying the embedded database.
#[derive(Debug)]
pub enum DbError {
    /// SQLite rejected a statement or could not open the file.
    Engine(rusqlite::Error),
    /// A schema upgrade step failed; nothing from that run was committed.
    Migration {
        version: u32,
        source: rusqlite::Error,
    },
    /// The file was written by a newer build.
    SchemaTooNew { found: u32, latest: u32 },
}

impl DbError {
    /// True when retrying against the same file cannot succeed.
    pub fn is_permanent(&self) -> bool {
        !matches!(self, Self::Engine(_))
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Engine(err) => write!(f, "incident database error: {err}"),
            Self::Migration { version, source } => {
                write!(f, "incident database upgrade to v{version} failed: {source}")
            }
            Self::SchemaTooNew { found, latest } => write!(
                f,
                "incident database is at schema v{found}; this build reads up to v{latest}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Engine(err) | Self::Migration { source: err, .. } => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Engine(value)
    }
}
