//! Employee domain model.
//!
//! # Responsibility
//! - Define the joined employee record returned by directory reads.
//! - Define the draft record accepted by inserts, with shape validation.
//!
//! # Invariants
//! - `Employee::id` is assigned by the database sequence, never by callers.
//! - `Employee::pay` is computed by `employee_view`, never by this crate.
//! - `hire_date` stays text (`YYYY-MM-DD`); drafts must name a real calendar day.
//! - An accepted draft's `basic_pay * 12 + allowance` fits in `i64`.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Database-assigned employee identifier.
pub type EmployeeId = i64;

/// Months of basic pay counted in the computed yearly pay.
pub const PAY_MONTHS: i64 = 12;

/// Shown instead of a missing phone number.
pub const PHONE_PLACEHOLDER: &str = "(none)";

static SSN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{6}-\d{7}$").expect("ssn pattern is valid"));
static HIRE_DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("hire date pattern is valid"));

/// Employee row as exposed by `employee_view`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub ssn: String,
    pub hire_date: String,
    pub city: String,
    /// Never empty; [`PHONE_PLACEHOLDER`] when no number is stored.
    pub phone: String,
    pub department: String,
    pub rank: String,
    pub basic_pay: i64,
    pub allowance: i64,
    /// `basic_pay * 12 + allowance`, computed by the database view.
    pub pay: i64,
}

impl Employee {
    /// Returns whether a phone number is stored for this employee.
    pub fn has_phone(&self) -> bool {
        self.phone != PHONE_PLACEHOLDER
    }
}

/// Field values supplied before the database assigns an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeDraft {
    pub name: String,
    pub ssn: String,
    pub hire_date: String,
    pub city: String,
    pub phone: Option<String>,
    pub department: String,
    pub rank: String,
    pub basic_pay: i64,
    pub allowance: i64,
}

impl EmployeeDraft {
    /// Returns the phone value to persist; blank input becomes `None`.
    pub fn normalized_phone(&self) -> Option<&str> {
        self.phone
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    /// Checks field shapes before any SQL is issued.
    ///
    /// Lookup names are only checked for blankness here; existence is a
    /// repository concern.
    pub fn validate(&self) -> Result<(), DraftValidationError> {
        if self.name.trim().is_empty() {
            return Err(DraftValidationError::BlankField("name"));
        }
        if !SSN_PATTERN.is_match(self.ssn.trim()) {
            return Err(DraftValidationError::MalformedSsn(self.ssn.clone()));
        }
        if !HIRE_DATE_PATTERN.is_match(self.hire_date.trim()) {
            return Err(DraftValidationError::MalformedHireDate(
                self.hire_date.clone(),
            ));
        }
        if NaiveDate::parse_from_str(self.hire_date.trim(), "%Y-%m-%d").is_err() {
            return Err(DraftValidationError::ImpossibleHireDate(
                self.hire_date.clone(),
            ));
        }
        for (field, value) in [
            ("city", &self.city),
            ("department", &self.department),
            ("rank", &self.rank),
        ] {
            if value.trim().is_empty() {
                return Err(DraftValidationError::BlankField(field));
            }
        }
        if self.basic_pay < 0 {
            return Err(DraftValidationError::NegativeAmount {
                field: "basic_pay",
                value: self.basic_pay,
            });
        }
        if self.allowance < 0 {
            return Err(DraftValidationError::NegativeAmount {
                field: "allowance",
                value: self.allowance,
            });
        }
        if self.yearly_pay().is_none() {
            return Err(DraftValidationError::PayOverflow {
                basic_pay: self.basic_pay,
                allowance: self.allowance,
            });
        }
        Ok(())
    }

    /// `basic_pay * 12 + allowance`, or `None` when it overflows `i64`.
    pub fn yearly_pay(&self) -> Option<i64> {
        self.basic_pay
            .checked_mul(PAY_MONTHS)
            .and_then(|base| base.checked_add(self.allowance))
    }
}

/// Shape violation found by [`EmployeeDraft::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftValidationError {
    BlankField(&'static str),
    MalformedSsn(String),
    MalformedHireDate(String),
    /// Well-formed but not a calendar day, e.g. `2019-02-30`.
    ImpossibleHireDate(String),
    NegativeAmount { field: &'static str, value: i64 },
    PayOverflow { basic_pay: i64, allowance: i64 },
}

impl Display for DraftValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "{field} cannot be blank"),
            Self::MalformedSsn(value) => {
                write!(f, "ssn `{value}` must look like yymmdd-nnnnnnn")
            }
            Self::MalformedHireDate(value) => {
                write!(f, "hire date `{value}` must look like yyyy-mm-dd")
            }
            Self::ImpossibleHireDate(value) => {
                write!(f, "hire date `{value}` is not a calendar day")
            }
            Self::NegativeAmount { field, value } => {
                write!(f, "{field} cannot be negative, got {value}")
            }
            Self::PayOverflow {
                basic_pay,
                allowance,
            } => write!(
                f,
                "yearly pay for basic_pay {basic_pay} and allowance {allowance} is out of range"
            ),
        }
    }
}

impl Error for DraftValidationError {}
