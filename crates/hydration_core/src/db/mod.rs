//! SQLite storage bootstrap for the hydration key-value store.
//!
//! # Responsibility
//! - Open and configure SQLite connections backing `SqliteKvRepository`.
//! - Apply schema migrations in deterministic order.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - No hydration key is read or written before migrations succeed.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Environment variable overriding the store location for CLI and FFI callers.
pub const DB_PATH_ENV: &str = "HYDRATION_DB_PATH";
const DB_FILE_NAME: &str = "hydration_tracker.sqlite3";

/// Resolves the store path: `HYDRATION_DB_PATH` when set and non-blank,
/// otherwise `hydration_tracker.sqlite3` in the system temp directory.
pub fn default_db_path() -> PathBuf {
    match std::env::var(DB_PATH_ENV) {
        Ok(raw) if !raw.trim().is_empty() => PathBuf::from(raw.trim()),
        _ => std::env::temp_dir().join(DB_FILE_NAME),
    }
}

/// Failure while opening or migrating the local store.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "hydration store schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
