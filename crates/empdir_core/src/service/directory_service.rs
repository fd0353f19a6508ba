//! Directory session service.
//!
//! # Responsibility
//! - Own the connection manager for one console session.
//! - Expose connect/close plus one entry point per repository operation.
//! - Provide scoped sessions that always release the handle.
//!
//! # Invariants
//! - Operations never open a handle implicitly; they require `connect()`
//!   or run inside `with_session`.
//! - The schema is checked once per acquired handle; `connect()` keeps no
//!   handle whose schema check failed.
//! - `with_session` releases on success and on failure.

use crate::config::DbConfig;
use crate::db::ConnectionManager;
use crate::model::employee::{Employee, EmployeeDraft, EmployeeId};
use crate::model::field::{SearchField, SortKey};
use crate::repo::directory_repo::{DirectoryRepository, RepoResult, SqliteDirectoryRepository};
use log::warn;

/// Lookup names offered while entering a new employee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertFormOptions {
    pub cities: Vec<String>,
    pub departments: Vec<String>,
    pub ranks: Vec<String>,
}

/// Total employee count together with one ordered listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeListing {
    pub total: i64,
    pub employees: Vec<Employee>,
}

/// Use-case wrapper driving one connection through directory operations.
pub struct DirectoryService {
    manager: ConnectionManager,
}

impl DirectoryService {
    pub fn new(config: DbConfig) -> Self {
        Self::from_manager(ConnectionManager::new(config))
    }

    pub fn from_manager(manager: ConnectionManager) -> Self {
        Self { manager }
    }

    /// Acquires the session handle and checks its schema; a no-op when
    /// already connected.
    pub fn connect(&mut self) -> RepoResult<()> {
        if self.manager.is_connected() {
            return Ok(());
        }
        let checked = SqliteDirectoryRepository::try_new(self.manager.acquire()?).map(|_| ());
        if let Err(err) = checked {
            if let Err(release_err) = self.manager.release() {
                warn!(
                    "event=session_release module=service status=error error={} masked_by={}",
                    release_err, err
                );
            }
            return Err(err);
        }
        Ok(())
    }

    /// Releases the session handle; a no-op when not connected.
    pub fn close(&mut self) -> RepoResult<()> {
        self.manager.release()?;
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.manager.is_connected()
    }

    /// Connects, runs `op` against the repository, then always releases.
    ///
    /// When both `op` and the release fail, the operation error is returned
    /// and the release error is logged.
    pub fn with_session<T, F>(&mut self, op: F) -> RepoResult<T>
    where
        F: FnOnce(&dyn DirectoryRepository) -> RepoResult<T>,
    {
        let outcome = match self.manager.acquire() {
            Ok(conn) => SqliteDirectoryRepository::try_new(conn).and_then(|repo| op(&repo)),
            Err(err) => Err(err.into()),
        };
        let released = self.manager.release();

        match (outcome, released) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(err)) => Err(err.into()),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(release_err)) => {
                warn!(
                    "event=session_release module=service status=error error={} masked_by={}",
                    release_err, err
                );
                Err(err)
            }
        }
    }

    pub fn insert_employee(&self, draft: &EmployeeDraft) -> RepoResult<usize> {
        self.repo()?.insert_employee(draft)
    }

    pub fn count_employees(&self) -> RepoResult<i64> {
        self.repo()?.count_employees()
    }

    pub fn count_by_field(&self, field: SearchField, value: &str) -> RepoResult<i64> {
        self.repo()?.count_by_field(field, value)
    }

    pub fn list_employees(&self, sort: SortKey) -> RepoResult<Vec<Employee>> {
        self.repo()?.list_employees(sort)
    }

    pub fn search_by_field(&self, field: SearchField, value: &str) -> RepoResult<Vec<Employee>> {
        self.repo()?.search_by_field(field, value)
    }

    pub fn find_employee(&self, id: EmployeeId) -> RepoResult<Option<Employee>> {
        self.repo()?.find_employee(id)
    }

    pub fn list_city_names(&self) -> RepoResult<Vec<String>> {
        self.repo()?.list_city_names()
    }

    pub fn list_department_names(&self) -> RepoResult<Vec<String>> {
        self.repo()?.list_department_names()
    }

    pub fn list_rank_names(&self) -> RepoResult<Vec<String>> {
        self.repo()?.list_rank_names()
    }

    pub fn lookup_minimum_pay_for_rank(&self, rank: &str) -> RepoResult<i64> {
        self.repo()?.lookup_minimum_pay_for_rank(rank)
    }

    /// Loads all three lookup lists used by the insert form.
    pub fn insert_form_options(&self) -> RepoResult<InsertFormOptions> {
        let repo = self.repo()?;
        Ok(InsertFormOptions {
            cities: repo.list_city_names()?,
            departments: repo.list_department_names()?,
            ranks: repo.list_rank_names()?,
        })
    }

    /// Counts all employees and lists them in `sort` order.
    pub fn list_with_total(&self, sort: SortKey) -> RepoResult<EmployeeListing> {
        let repo = self.repo()?;
        Ok(EmployeeListing {
            total: repo.count_employees()?,
            employees: repo.list_employees(sort)?,
        })
    }

    fn repo(&self) -> RepoResult<SqliteDirectoryRepository<'_>> {
        let conn = self.manager.current()?;
        Ok(SqliteDirectoryRepository::with_checked_schema(conn))
    }
}
