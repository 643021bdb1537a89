//! `warehouse-core` — foundation building blocks shared by the analytics crates.
//!
//! This crate contains **pure** primitives (no IO, no storage): the error model,
//! typed identifiers and the injectable clock used as the reporting "now".

pub mod clock;
pub mod error;
pub mod id;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{AnalyticsError, AnalyticsResult};
pub use id::{IssueId, ItemCode, LpoNumber};
