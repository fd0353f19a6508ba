//! Directory repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Translate directory use-cases into SQL over `employee_view` and the
//!   lookup tables.
//! - Map result rows into [`Employee`] records and name lists.
//!
//! # Invariants
//! - Every caller-supplied value is a bound parameter; only `'static` column
//!   names and clauses are formatted into SQL text.
//! - Statements and row cursors are scoped to the call that opened them.
//! - Reads return fully materialized vectors.
//! - Inserts reject unknown city/department/rank names before writing.

use crate::db::DbError;
use crate::model::employee::{
    DraftValidationError, Employee, EmployeeDraft, EmployeeId, PHONE_PLACEHOLDER,
};
use crate::model::field::{Comparison, LookupKind, ParseFieldError, SearchField, SortKey};
use log::{debug, error, info};
use rusqlite::types::{FromSql, Value};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

const EMPLOYEE_SELECT_SQL: &str = "SELECT
    emp_id,
    emp_name,
    ssn,
    hire_date,
    city_name,
    tel,
    department_name,
    rank_name,
    basic_pay,
    allowance,
    pay
FROM employee_view";

const INSERT_EMPLOYEE_SQL: &str = "INSERT INTO employee (
    emp_name,
    ssn,
    hire_date,
    city_id,
    tel,
    department_id,
    rank_id,
    basic_pay,
    allowance
) VALUES (
    ?1,
    ?2,
    ?3,
    (SELECT city_id FROM city WHERE city_name = ?4),
    ?5,
    (SELECT department_id FROM department WHERE department_name = ?6),
    (SELECT rank_id FROM rank WHERE rank_name = ?7),
    ?8,
    ?9
);";

const REQUIRED_RELATIONS: [&str; 5] = ["city", "department", "rank", "employee", "employee_view"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for directory persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Opening, closing or reaching the handle failed.
    Connection(DbError),
    /// Statement execution failed; carries the driver error.
    Query(rusqlite::Error),
    /// Field or sort key outside the accepted set.
    InvalidField(ParseFieldError),
    /// Value cannot be compared against the field, e.g. a non-numeric identifier.
    InvalidFieldValue { field: SearchField, value: String },
    /// City/department/rank name absent from its lookup table.
    UnknownLookupName { kind: LookupKind, name: String },
    Validation(DraftValidationError),
    /// Row column was NULL or mistyped where a value was required.
    Mapping(String),
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connection(err) => write!(f, "connection error: {err}"),
            Self::Query(err) => write!(f, "query error: {err}"),
            Self::InvalidField(err) => write!(f, "{err}"),
            Self::InvalidFieldValue { field, value } => {
                write!(f, "value `{value}` is not valid for field {field}")
            }
            Self::UnknownLookupName { kind, name } => write!(f, "unknown {kind} name `{name}`"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Mapping(message) => write!(f, "invalid employee row: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "connection is missing required table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Connection(err) => Some(err),
            Self::Query(err) => Some(err),
            Self::InvalidField(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::InvalidFieldValue { .. }
            | Self::UnknownLookupName { .. }
            | Self::Mapping(_)
            | Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Connection(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Query(value)
    }
}

impl From<ParseFieldError> for RepoError {
    fn from(value: ParseFieldError) -> Self {
        Self::InvalidField(value)
    }
}

impl From<DraftValidationError> for RepoError {
    fn from(value: DraftValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Repository interface for employee directory operations.
pub trait DirectoryRepository {
    /// Inserts one employee and returns the number of rows written.
    fn insert_employee(&self, draft: &EmployeeDraft) -> RepoResult<usize>;
    fn count_employees(&self) -> RepoResult<i64>;
    fn count_by_field(&self, field: SearchField, value: &str) -> RepoResult<i64>;
    fn list_employees(&self, sort: SortKey) -> RepoResult<Vec<Employee>>;
    fn search_by_field(&self, field: SearchField, value: &str) -> RepoResult<Vec<Employee>>;
    fn find_employee(&self, id: EmployeeId) -> RepoResult<Option<Employee>>;
    fn list_city_names(&self) -> RepoResult<Vec<String>>;
    fn list_department_names(&self) -> RepoResult<Vec<String>>;
    fn list_rank_names(&self) -> RepoResult<Vec<String>>;
    fn lookup_minimum_pay_for_rank(&self, rank: &str) -> RepoResult<i64>;
}

/// SQLite-backed directory repository borrowing an acquired handle.
pub struct SqliteDirectoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDirectoryRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `MissingRequiredTable` when a lookup table, `employee` or
    ///   `employee_view` is absent.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        for relation in REQUIRED_RELATIONS {
            if !relation_exists(conn, relation)? {
                return Err(RepoError::MissingRequiredTable(relation));
            }
        }
        Ok(Self { conn })
    }

    /// Wraps a handle that already passed [`Self::try_new`].
    pub(crate) fn with_checked_schema(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn lookup_exists(&self, kind: LookupKind, name: &str) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            &format!(
                "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = ?1);",
                kind.table(),
                kind.name_column()
            ),
            [name],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn ensure_lookup(&self, kind: LookupKind, name: &str) -> RepoResult<()> {
        if self.lookup_exists(kind, name)? {
            return Ok(());
        }
        Err(RepoError::UnknownLookupName {
            kind,
            name: name.to_string(),
        })
    }

    fn list_lookup_names(&self, kind: LookupKind) -> RepoResult<Vec<String>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {column} FROM {table} ORDER BY rowid ASC;",
            column = kind.name_column(),
            table = kind.table()
        ))?;
        let mut rows = stmt.query([])?;
        let mut names = Vec::new();
        while let Some(row) = rows.next()? {
            names.push(required(row, kind.name_column())?);
        }
        Ok(names)
    }

    fn query_employees(&self, sql: &str, bind: &[Value]) -> RepoResult<Vec<Employee>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(rusqlite::params_from_iter(bind.iter()))?;
        let mut employees = Vec::new();
        while let Some(row) = rows.next()? {
            employees.push(parse_employee_row(row)?);
        }
        Ok(employees)
    }
}

impl DirectoryRepository for SqliteDirectoryRepository<'_> {
    fn insert_employee(&self, draft: &EmployeeDraft) -> RepoResult<usize> {
        let started_at = Instant::now();
        draft.validate()?;

        let city = draft.city.trim();
        let department = draft.department.trim();
        let rank = draft.rank.trim();
        self.ensure_lookup(LookupKind::City, city)?;
        self.ensure_lookup(LookupKind::Department, department)?;
        self.ensure_lookup(LookupKind::Rank, rank)?;

        let result = self.conn.execute(
            INSERT_EMPLOYEE_SQL,
            params![
                draft.name.trim(),
                draft.ssn.trim(),
                draft.hire_date.trim(),
                city,
                draft.normalized_phone(),
                department,
                rank,
                draft.basic_pay,
                draft.allowance,
            ],
        );

        match result {
            Ok(changed) => {
                info!(
                    "event=employee_insert module=repo status=ok rows={} emp_id={} duration_ms={}",
                    changed,
                    self.conn.last_insert_rowid(),
                    started_at.elapsed().as_millis()
                );
                Ok(changed)
            }
            Err(err) => {
                error!(
                    "event=employee_insert module=repo status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err.into())
            }
        }
    }

    fn count_employees(&self) -> RepoResult<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM employee;", [], |row| row.get(0))?;
        Ok(count)
    }

    fn count_by_field(&self, field: SearchField, value: &str) -> RepoResult<i64> {
        let bound = bind_search_value(field, value)?;
        let count: i64 = self.conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM employee_view WHERE {} = ?1;",
                field.column()
            ),
            [bound],
            |row| row.get(0),
        )?;
        debug!("event=employee_count module=repo status=ok field={field} count={count}");
        Ok(count)
    }

    fn list_employees(&self, sort: SortKey) -> RepoResult<Vec<Employee>> {
        let employees = self.query_employees(
            &format!("{EMPLOYEE_SELECT_SQL} ORDER BY {};", sort.order_by()),
            &[],
        )?;
        debug!(
            "event=employee_list module=repo status=ok sort={sort} rows={}",
            employees.len()
        );
        Ok(employees)
    }

    fn search_by_field(&self, field: SearchField, value: &str) -> RepoResult<Vec<Employee>> {
        let bound = bind_search_value(field, value)?;
        let employees = self.query_employees(
            &format!(
                "{EMPLOYEE_SELECT_SQL} WHERE {} = ?1 ORDER BY emp_id ASC;",
                field.column()
            ),
            &[bound],
        )?;
        debug!(
            "event=employee_search module=repo status=ok field={field} rows={}",
            employees.len()
        );
        Ok(employees)
    }

    fn find_employee(&self, id: EmployeeId) -> RepoResult<Option<Employee>> {
        let mut employees = self.query_employees(
            &format!("{EMPLOYEE_SELECT_SQL} WHERE emp_id = ?1;"),
            &[Value::Integer(id)],
        )?;
        Ok(employees.pop())
    }

    fn list_city_names(&self) -> RepoResult<Vec<String>> {
        self.list_lookup_names(LookupKind::City)
    }

    fn list_department_names(&self) -> RepoResult<Vec<String>> {
        self.list_lookup_names(LookupKind::Department)
    }

    fn list_rank_names(&self) -> RepoResult<Vec<String>> {
        self.list_lookup_names(LookupKind::Rank)
    }

    fn lookup_minimum_pay_for_rank(&self, rank: &str) -> RepoResult<i64> {
        let mut stmt = self
            .conn
            .prepare("SELECT min_basic_pay FROM rank WHERE rank_name = ?1;")?;
        let mut rows = stmt.query([rank.trim()])?;
        if let Some(row) = rows.next()? {
            return required(row, "min_basic_pay");
        }

        Err(RepoError::UnknownLookupName {
            kind: LookupKind::Rank,
            name: rank.to_string(),
        })
    }
}

/// Converts a raw search value into the parameter its field compares with.
fn bind_search_value(field: SearchField, value: &str) -> RepoResult<Value> {
    match field.comparison() {
        Comparison::Numeric => value
            .trim()
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| RepoError::InvalidFieldValue {
                field,
                value: value.to_string(),
            }),
        Comparison::Text => Ok(Value::Text(value.trim().to_string())),
    }
}

fn parse_employee_row(row: &Row<'_>) -> RepoResult<Employee> {
    let phone = optional::<String>(row, "tel")?
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| PHONE_PLACEHOLDER.to_string());

    Ok(Employee {
        id: required(row, "emp_id")?,
        name: required(row, "emp_name")?,
        ssn: required(row, "ssn")?,
        hire_date: required(row, "hire_date")?,
        city: required(row, "city_name")?,
        phone,
        department: required(row, "department_name")?,
        rank: required(row, "rank_name")?,
        basic_pay: required(row, "basic_pay")?,
        allowance: required(row, "allowance")?,
        pay: required(row, "pay")?,
    })
}

fn required<T: FromSql>(row: &Row<'_>, column: &'static str) -> RepoResult<T> {
    optional(row, column)?
        .ok_or_else(|| RepoError::Mapping(format!("unexpected NULL in column `{column}`")))
}

fn optional<T: FromSql>(row: &Row<'_>, column: &'static str) -> RepoResult<Option<T>> {
    row.get::<_, Option<T>>(column).map_err(|err| match err {
        rusqlite::Error::InvalidColumnType(_, _, kind) => {
            RepoError::Mapping(format!("unexpected {kind} value in column `{column}`"))
        }
        rusqlite::Error::FromSqlConversionFailure(_, _, source) => {
            RepoError::Mapping(format!("cannot convert column `{column}`: {source}"))
        }
        rusqlite::Error::IntegralValueOutOfRange(_, value) => {
            RepoError::Mapping(format!("value {value} out of range in column `{column}`"))
        }
        other => RepoError::Query(other),
    })
}

fn relation_exists(conn: &Connection, name: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type IN ('table', 'view') AND name = ?1
        );",
        [name],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
