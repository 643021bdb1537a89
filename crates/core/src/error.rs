//! Analytics error model.

use chrono::NaiveDate;
use thiserror::Error;

/// Result type used across the analytics layer.
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

/// Analytics-level error.
///
/// Every variant aborts the single report invocation that raised it. Zero
/// denominators in ratios are not errors: callers special-case them to 0.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalyticsError {
    /// A date series was requested with `start` after `end`.
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// A reducer was evaluated over a group with no usable members.
    ///
    /// Grouping guarantees at least one member per group, so this is a logic
    /// fault rather than a data fault.
    #[error("empty group: {0}")]
    EmptyGroup(String),

    /// A report parameter cannot produce a defined result.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// An identifier was invalid (e.g. blank).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl AnalyticsError {
    pub fn invalid_range(start: NaiveDate, end: NaiveDate) -> Self {
        Self::InvalidRange { start, end }
    }

    pub fn empty_group(msg: impl Into<String>) -> Self {
        Self::EmptyGroup(msg.into())
    }

    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_range_reports_offending_dates() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let err = AnalyticsError::invalid_range(start, end);
        assert_eq!(
            err.to_string(),
            "invalid date range: start 2024-03-02 is after end 2024-03-01"
        );
    }
}
