//! Canonical query-string form of the employee list's filter, sort and
//! pagination state.
//!
//! The encoded string is what the list endpoint receives and what a host
//! keeps in its navigable URL, so a decoded state must reproduce the exact
//! request that produced the page on screen.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::error::{QueryError, SalaryBound};

pub const DEFAULT_MIN_SALARY: f64 = 0.0;
pub const DEFAULT_MAX_SALARY: f64 = 50_000.0;
pub const DEFAULT_OFFSET: u64 = 0;
pub const DEFAULT_LIMIT: u32 = 30;

const MIN_SALARY_PARAM: &str = "minSalary";
const MAX_SALARY_PARAM: &str = "maxSalary";
const OFFSET_PARAM: &str = "offset";
const LIMIT_PARAM: &str = "limit";
const SORT_PARAM: &str = "sort";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Id,
    Login,
    Name,
    Salary,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Login => "login",
            Self::Name => "name",
            Self::Salary => "salary",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "id" => Some(Self::Id),
            "login" => Some(Self::Login),
            "name" => Some(Self::Name),
            "salary" => Some(Self::Salary),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn sign(&self) -> char {
        match self {
            Self::Ascending => '+',
            Self::Descending => '-',
        }
    }
}

/// Single-key sort. The list endpoint honors one key only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortKey {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn ascending(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Descending,
        }
    }

    /// Parses `+field`, `-field` or a bare `field`. Only the first
    /// comma-separated key is read; any further keys are dropped.
    ///
    /// A leading space is treated as `+`, which is what an unescaped plus
    /// sign turns into once the query string has been form-decoded.
    pub fn parse(raw: &str) -> Option<Self> {
        let first = raw.split(',').next()?;
        let first = first.trim_end();
        let (direction, field) = if let Some(rest) = first.strip_prefix('-') {
            (SortDirection::Descending, rest)
        } else if let Some(rest) = first.strip_prefix('+').or_else(|| first.strip_prefix(' ')) {
            (SortDirection::Ascending, rest)
        } else {
            (SortDirection::Ascending, first)
        };
        SortField::parse(field.trim()).map(|field| Self { field, direction })
    }
}

impl Default for SortKey {
    fn default() -> Self {
        Self::ascending(SortField::Id)
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.direction.sign(), self.field.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QueryState {
    pub min_salary: f64,
    pub max_salary: f64,
    pub offset: u64,
    pub limit: u32,
    pub sort: SortKey,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            min_salary: DEFAULT_MIN_SALARY,
            max_salary: DEFAULT_MAX_SALARY,
            offset: DEFAULT_OFFSET,
            limit: DEFAULT_LIMIT,
            sort: SortKey::default(),
        }
    }
}

impl QueryState {
    pub fn validate(&self) -> Result<(), QueryError> {
        for (bound, value) in [
            (SalaryBound::Min, self.min_salary),
            (SalaryBound::Max, self.max_salary),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(QueryError::InvalidSalary { bound, value });
            }
        }
        if self.min_salary > self.max_salary {
            return Err(QueryError::InvertedSalaryRange {
                min: self.min_salary,
                max: self.max_salary,
            });
        }
        if self.limit == 0 {
            return Err(QueryError::ZeroLimit);
        }
        Ok(())
    }

    pub fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    pub fn next_page(mut self) -> Self {
        self.offset = self.offset.saturating_add(u64::from(self.limit));
        self
    }

    pub fn previous_page(mut self) -> Self {
        self.offset = self.offset.saturating_sub(u64::from(self.limit));
        self
    }
}

pub fn encode(state: &QueryState) -> String {
    form_urlencoded::Serializer::new(String::new())
        .append_pair(MIN_SALARY_PARAM, &state.min_salary.to_string())
        .append_pair(MAX_SALARY_PARAM, &state.max_salary.to_string())
        .append_pair(OFFSET_PARAM, &state.offset.to_string())
        .append_pair(LIMIT_PARAM, &state.limit.to_string())
        .append_pair(SORT_PARAM, &state.sort.to_string())
        .finish()
}

/// Missing, empty or unreadable parameters take their defaults; a state that
/// parses but breaks an invariant is an error.
pub fn decode(raw: &str) -> Result<QueryState, QueryError> {
    let raw = raw.strip_prefix('?').unwrap_or(raw);
    let mut state = QueryState::default();

    for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
        match key.as_ref() {
            MIN_SALARY_PARAM => {
                if let Some(v) = parse_amount(&value) {
                    state.min_salary = v;
                }
            }
            MAX_SALARY_PARAM => {
                if let Some(v) = parse_amount(&value) {
                    state.max_salary = v;
                }
            }
            OFFSET_PARAM => {
                if let Ok(v) = value.trim().parse() {
                    state.offset = v;
                }
            }
            LIMIT_PARAM => {
                if let Ok(v) = value.trim().parse() {
                    state.limit = v;
                }
            }
            SORT_PARAM => {
                if let Some(sort) = SortKey::parse(&value) {
                    state.sort = sort;
                }
            }
            _ => {}
        }
    }

    state.validate()?;
    Ok(state)
}

fn parse_amount(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

#[cfg(test)]
#[path = "tests/query_tests.rs"]
mod tests;
