//! Inventory record streams (read side).
//!
//! This crate defines the two append-only collections the analytics engine
//! consumes and the boundary through which they are handed over. It contains
//! no reporting logic.

pub mod record;
pub mod store;

pub use record::{Delivery, Issuance};
pub use store::{InMemoryRecordStore, RecordStore, Snapshot};
