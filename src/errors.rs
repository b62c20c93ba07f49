use chrono::{DateTime, Utc};
use serde::Serialize;

/// Errors the analytics engine can surface to a caller.
///
/// Only malformed input shape is a hard failure; statistical degeneracies
/// (empty series, zero denominators, missing history) resolve to documented
/// neutral values inside the component that detects them and never reach
/// this type.
#[derive(Debug, thiserror::Error, Serialize)]
pub enum AnalyticsError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid date range: start {start} must be before end {end}")]
    InvalidDateRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Invalid period type: {0}")]
    InvalidPeriodType(String),

    #[error("Year {0} is outside the supported calendar range")]
    InvalidYear(i32),

    #[error("Configuration error: {0}")]
    Config(
        #[from]
        #[serde(skip)]
        config::ConfigError,
    ),
}

impl AnalyticsError {
    pub fn validation(err: impl std::fmt::Display) -> Self {
        Self::Validation(err.to_string())
    }
}
