//! `warehouse-analytics` — inventory reporting over delivery and issuance streams.
//!
//! Layers, leaves first:
//! - [`join`]: key matching with inner / left-outer / semi / anti semantics
//! - [`aggregate`]: grouped count / sum / avg with per-reducer absent policy
//! - [`window`]: partitioned running and sliding statistics, rank, row number
//! - [`date_series`]: contiguous daily calendars
//! - [`reports`]: the named report catalog
//!
//! Everything here is synchronous and side-effect free apart from `tracing`
//! events. Inputs are never mutated.

pub mod aggregate;
pub mod config;
pub mod date_series;
pub mod join;
pub mod reports;
pub mod window;

pub use aggregate::{aggregate, group_by, Aggregate, Group, OnAbsent, Reducer, StableSum};
pub use config::ReportConfig;
pub use date_series::{date_series, DateSeries};
pub use join::{anti_join, join, semi_join, JoinMode, Joined};
pub use reports::{ReportCatalog, ReportKind, ReportRows, ReportRun};
pub use window::{window, FloatKey, Frame, WindowExpr, WindowFn, WindowValue, Windowed};
