use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SalaryBound {
    Min,
    Max,
}

impl std::fmt::Display for SalaryBound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Min => f.write_str("minSalary"),
            Self::Max => f.write_str("maxSalary"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("{bound} must be a finite, non-negative amount (got {value})")]
    InvalidSalary { bound: SalaryBound, value: f64 },
    #[error("minSalary {min} exceeds maxSalary {max}")]
    InvertedSalaryRange { min: f64, max: f64 },
    #[error("limit must be greater than zero")]
    ZeroLimit,
}
