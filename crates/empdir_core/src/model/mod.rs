//! Employee directory domain model.
//!
//! # Responsibility
//! - Define records exchanged between the repository and its callers.
//! - Define the closed key sets used to build queries.

pub mod employee;
pub mod field;
