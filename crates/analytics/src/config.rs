//! Report parameters.
//!
//! Lookback windows and category filters are configuration, not constants.

use serde::{Deserialize, Serialize};

use warehouse_core::{AnalyticsError, AnalyticsResult};

/// Tunables shared by the report catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Trailing days for the recent-issuance filter.
    pub recent_issuance_days: u32,
    /// Days before today covered by the daily activity census.
    pub census_days: u32,
    /// Days ahead of today checked for expiring stock.
    pub expiry_horizon_days: u32,
    /// Rows in the issuance moving average (current row included).
    pub moving_average_rows: usize,
    /// Delivery category whose repeated issuances are flagged.
    pub controlled_category: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            recent_issuance_days: 30,
            census_days: 30,
            expiry_horizon_days: 90,
            moving_average_rows: 7,
            controlled_category: "Pharmaceuticals".to_string(),
        }
    }
}

impl ReportConfig {
    /// Build from `WAREHOUSE_*` environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            recent_issuance_days: parse_or(
                &lookup,
                "WAREHOUSE_RECENT_ISSUANCE_DAYS",
                defaults.recent_issuance_days,
            ),
            census_days: parse_or(&lookup, "WAREHOUSE_CENSUS_DAYS", defaults.census_days),
            expiry_horizon_days: parse_or(
                &lookup,
                "WAREHOUSE_EXPIRY_HORIZON_DAYS",
                defaults.expiry_horizon_days,
            ),
            moving_average_rows: parse_or(
                &lookup,
                "WAREHOUSE_MOVING_AVERAGE_ROWS",
                defaults.moving_average_rows,
            ),
            controlled_category: lookup("WAREHOUSE_CONTROLLED_CATEGORY")
                .filter(|c| !c.trim().is_empty())
                .unwrap_or(defaults.controlled_category),
        }
    }

    pub fn validate(&self) -> AnalyticsResult<()> {
        if self.moving_average_rows == 0 {
            return Err(AnalyticsError::invalid_parameter(
                "moving_average_rows must be at least 1",
            ));
        }
        Ok(())
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> T
where
    T: core::str::FromStr + core::fmt::Display + Copy,
{
    match lookup(name) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(var = name, value = %raw, %default, "unparsable setting; using default");
            default
        }),
    }
}
