//! Core data-access layer for the employee directory.
//!
//! Owns connection lifecycle, query construction and row mapping; console
//! front-ends call into [`DirectoryService`] with typed field keys.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, DbConfig, DbLocation};
pub use db::{ConnectionManager, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::employee::{
    DraftValidationError, Employee, EmployeeDraft, EmployeeId, PHONE_PLACEHOLDER,
};
pub use model::field::{Comparison, LookupKind, ParseFieldError, SearchField, SortKey};
pub use repo::directory_repo::{
    DirectoryRepository, RepoError, RepoResult, SqliteDirectoryRepository,
};
pub use service::directory_service::{DirectoryService, EmployeeListing, InsertFormOptions};

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
