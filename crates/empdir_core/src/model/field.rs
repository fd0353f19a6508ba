//! Closed key sets that drive query construction.
//!
//! # Responsibility
//! - Map search keys to a view column and a comparison mode.
//! - Map sort keys to a fixed `ORDER BY` clause.
//! - Parse caller-supplied key names, rejecting anything outside the set.
//!
//! # Invariants
//! - Column names and clauses are `'static` literals; caller text never
//!   reaches SQL except as a bound parameter.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// How a search value is bound against its column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Value is parsed as an integer and compared numerically.
    Numeric,
    /// Value is bound as text and compared for equality.
    Text,
}

/// Employee attribute a count or search filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchField {
    Identifier,
    Name,
    Department,
    Rank,
}

impl SearchField {
    pub const ALL: [SearchField; 4] = [
        SearchField::Identifier,
        SearchField::Name,
        SearchField::Department,
        SearchField::Rank,
    ];

    /// Column of `employee_view` this key filters on.
    pub fn column(self) -> &'static str {
        match self {
            Self::Identifier => "emp_id",
            Self::Name => "emp_name",
            Self::Department => "department_name",
            Self::Rank => "rank_name",
        }
    }

    pub fn comparison(self) -> Comparison {
        match self {
            Self::Identifier => Comparison::Numeric,
            Self::Name | Self::Department | Self::Rank => Comparison::Text,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Identifier => "identifier",
            Self::Name => "name",
            Self::Department => "department",
            Self::Rank => "rank",
        }
    }
}

impl Display for SearchField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchField {
    type Err = ParseFieldError;

    /// Accepts canonical names and the legacy column names, ignoring case.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "identifier" | "id" | "emp_id" => Ok(Self::Identifier),
            "name" | "emp_name" => Ok(Self::Name),
            "department" | "buseo_name" => Ok(Self::Department),
            "rank" | "jikwi_name" => Ok(Self::Rank),
            _ => Err(ParseFieldError::search(value)),
        }
    }
}

/// Ordering applied to a full employee listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Identifier,
    Name,
    Department,
    Rank,
    PayDescending,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [
        SortKey::Identifier,
        SortKey::Name,
        SortKey::Department,
        SortKey::Rank,
        SortKey::PayDescending,
    ];

    /// `ORDER BY` body; `emp_id` breaks ties so output is deterministic.
    pub fn order_by(self) -> &'static str {
        match self {
            Self::Identifier => "emp_id ASC",
            Self::Name => "emp_name ASC, emp_id ASC",
            Self::Department => "department_name ASC, emp_id ASC",
            Self::Rank => "rank_name ASC, emp_id ASC",
            Self::PayDescending => "pay DESC, emp_id ASC",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Identifier => "identifier",
            Self::Name => "name",
            Self::Department => "department",
            Self::Rank => "rank",
            Self::PayDescending => "pay_desc",
        }
    }
}

impl Display for SortKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ParseFieldError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "identifier" | "id" | "emp_id" => Ok(Self::Identifier),
            "name" | "emp_name" => Ok(Self::Name),
            "department" | "buseo_name" => Ok(Self::Department),
            "rank" | "jikwi_name" => Ok(Self::Rank),
            "pay_desc" | "pay desc" | "pay-descending" => Ok(Self::PayDescending),
            _ => Err(ParseFieldError::sort(value)),
        }
    }
}

/// Lookup table an employee references by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKind {
    City,
    Department,
    Rank,
}

impl LookupKind {
    pub fn table(self) -> &'static str {
        match self {
            Self::City => "city",
            Self::Department => "department",
            Self::Rank => "rank",
        }
    }

    pub fn name_column(self) -> &'static str {
        match self {
            Self::City => "city_name",
            Self::Department => "department_name",
            Self::Rank => "rank_name",
        }
    }
}

impl Display for LookupKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table())
    }
}

/// Key name outside the accepted set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFieldError {
    /// `"search field"` or `"sort key"`.
    pub expected: &'static str,
    pub value: String,
}

impl ParseFieldError {
    fn search(value: &str) -> Self {
        Self {
            expected: "search field",
            value: value.to_string(),
        }
    }

    fn sort(value: &str) -> Self {
        Self {
            expected: "sort key",
            value: value.to_string(),
        }
    }
}

impl Display for ParseFieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown {} `{}`", self.expected, self.value)
    }
}

impl Error for ParseFieldError {}

#[cfg(test)]
mod tests {
    use super::{Comparison, SearchField, SortKey};

    #[test]
    fn only_identifier_compares_numerically() {
        for field in SearchField::ALL {
            let expected = if field == SearchField::Identifier {
                Comparison::Numeric
            } else {
                Comparison::Text
            };
            assert_eq!(field.comparison(), expected, "{field}");
        }
    }

    #[test]
    fn canonical_names_round_trip_through_from_str() {
        for field in SearchField::ALL {
            assert_eq!(field.as_str().parse::<SearchField>().unwrap(), field);
        }
        for key in SortKey::ALL {
            assert_eq!(key.as_str().parse::<SortKey>().unwrap(), key);
        }
    }

    #[test]
    fn legacy_column_names_are_accepted() {
        assert_eq!("EMP_ID".parse::<SearchField>().unwrap(), SearchField::Identifier);
        assert_eq!("BUSEO_NAME".parse::<SearchField>().unwrap(), SearchField::Department);
        assert_eq!("PAY DESC".parse::<SortKey>().unwrap(), SortKey::PayDescending);
    }

    #[test]
    fn pay_is_not_a_search_field() {
        let err = "pay".parse::<SearchField>().unwrap_err();
        assert_eq!(err.expected, "search field");
        assert_eq!(err.value, "pay");
    }
}
