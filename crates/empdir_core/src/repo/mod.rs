//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for the directory.
//! - Isolate SQLite query details from session orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `EmployeeDraft::validate()` before
//!   persistence.
//! - Driver failures propagate unchanged inside `RepoError::Query`; nothing
//!   is retried here.

pub mod directory_repo;
