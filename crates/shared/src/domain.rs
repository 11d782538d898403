use std::fmt;

use serde::{Deserialize, Serialize};

/// Server-assigned employee identifier. Opaque to the client and never
/// rewritten after creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(pub String);

impl EmployeeId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EmployeeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub id: EmployeeId,
    pub login: String,
    pub name: String,
    pub salary: f64,
}

impl EmployeeRecord {
    pub fn new(
        id: impl Into<String>,
        login: impl Into<String>,
        name: impl Into<String>,
        salary: f64,
    ) -> Self {
        Self {
            id: EmployeeId(id.into()),
            login: login.into(),
            name: name.into(),
            salary,
        }
    }
}
