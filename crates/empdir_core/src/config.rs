//! Database connection configuration.
//!
//! # Responsibility
//! - Describe where the directory database lives and how to open it.
//! - Load that description from TOML with an environment override.
//!
//! # Invariants
//! - A blank `path` is never turned into a file location.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Default SQLite busy timeout in milliseconds.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Environment variable that overrides the configured database path.
pub const DB_PATH_ENV: &str = "EMPDIR_DB_PATH";

/// Special path value selecting a private in-memory database.
pub const MEMORY_PATH: &str = ":memory:";

/// Where the directory database is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    File(PathBuf),
    Memory,
}

impl DbLocation {
    /// Maps a configured path string to a location. `:memory:` selects memory.
    pub fn from_path_str(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed == MEMORY_PATH {
            return Some(Self::Memory);
        }
        Some(Self::File(PathBuf::from(trimmed)))
    }
}

/// Connection settings consumed by [`crate::db::ConnectionManager`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub location: DbLocation,
    pub busy_timeout_ms: u64,
}

impl DbConfig {
    /// File-backed configuration with default timeouts.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            location: DbLocation::File(path.into()),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }

    /// In-memory configuration; each acquire opens a fresh database.
    pub fn in_memory() -> Self {
        Self {
            location: DbLocation::Memory,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }

    /// Parses a `[database]` TOML document.
    ///
    /// ```toml
    /// [database]
    /// path = "directory.db"
    /// busy_timeout_ms = 2000
    /// ```
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(raw).map_err(ConfigError::Parse)?;
        let section = file.database;
        let location = DbLocation::from_path_str(&section.path).ok_or(ConfigError::EmptyPath)?;
        Ok(Self {
            location,
            busy_timeout_ms: section.busy_timeout_ms.unwrap_or(DEFAULT_BUSY_TIMEOUT_MS),
        })
    }

    /// Reads and parses a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Applies `EMPDIR_DB_PATH` when it is set and non-blank.
    pub fn with_env_overrides(self) -> Self {
        match std::env::var(DB_PATH_ENV) {
            Ok(value) => self.with_path_override(Some(value.as_str())),
            Err(_) => self,
        }
    }

    /// Replaces the location when `value` names a usable path.
    pub fn with_path_override(mut self, value: Option<&str>) -> Self {
        if let Some(location) = value.and_then(DbLocation::from_path_str) {
            self.location = location;
        }
        self
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    database: DatabaseSection,
}

#[derive(Debug, Deserialize)]
struct DatabaseSection {
    path: String,
    busy_timeout_ms: Option<u64>,
}

/// Failure while loading [`DbConfig`].
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(toml::de::Error),
    EmptyPath,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::EmptyPath => write!(f, "database.path cannot be empty"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::EmptyPath => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, DbConfig, DbLocation, DEFAULT_BUSY_TIMEOUT_MS};
    use std::path::PathBuf;

    #[test]
    fn parses_file_location_and_timeout() {
        let config = DbConfig::from_toml_str(
            "[database]\npath = \"data/directory.db\"\nbusy_timeout_ms = 250\n",
        )
        .expect("config should parse");
        assert_eq!(
            config.location,
            DbLocation::File(PathBuf::from("data/directory.db"))
        );
        assert_eq!(config.busy_timeout_ms, 250);
    }

    #[test]
    fn memory_path_and_default_timeout() {
        let config = DbConfig::from_toml_str("[database]\npath = \":memory:\"\n")
            .expect("config should parse");
        assert_eq!(config.location, DbLocation::Memory);
        assert_eq!(config.busy_timeout_ms, DEFAULT_BUSY_TIMEOUT_MS);
    }

    #[test]
    fn blank_path_is_rejected() {
        let err = DbConfig::from_toml_str("[database]\npath = \"  \"\n").unwrap_err();
        assert!(matches!(err, ConfigError::EmptyPath));
    }

    #[test]
    fn missing_section_is_a_parse_error() {
        let err = DbConfig::from_toml_str("path = \"x.db\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn path_override_ignores_blank_values() {
        let base = DbConfig::in_memory();
        assert_eq!(
            base.clone().with_path_override(Some("")).location,
            DbLocation::Memory
        );
        assert_eq!(
            base.with_path_override(Some("other.db")).location,
            DbLocation::File(PathBuf::from("other.db"))
        );
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = DbConfig::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
