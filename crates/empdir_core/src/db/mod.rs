//! SQLite storage bootstrap, schema registry and connection lifecycle.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the employee directory.
//! - Apply bundled schema migrations in deterministic order.
//! - Own the single cached handle used by one directory session.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - No directory data is read or written before migrations succeed.
//! - At most one live handle exists per `ConnectionManager`.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod manager;
pub mod migrations;
mod open;

pub use manager::ConnectionManager;
pub use open::{open_db, open_db_in_memory, open_with_config};

pub type DbResult<T> = Result<T, DbError>;

/// Connection-level failure: open, bootstrap, close or missing handle.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// A seeded lookup table was emptied after migration.
    EmptyLookupTable(&'static str),
    /// An operation needed a live handle but none was acquired.
    NotConnected,
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
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::EmptyLookupTable(table) => write!(f, "lookup table `{table}` has no rows"),
            Self::NotConnected => write!(f, "no database connection has been acquired"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. }
            | Self::EmptyLookupTable(_)
            | Self::NotConnected => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
