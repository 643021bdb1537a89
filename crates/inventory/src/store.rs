//! Record store boundary.
//!
//! Storage and ingestion live outside the engine. The engine only needs a
//! stable, re-iterable view of both collections for the duration of one report.

use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::record::{Delivery, Issuance};

/// Point-in-time copy of both record collections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub deliveries: Vec<Delivery>,
    #[serde(default)]
    pub issuances: Vec<Issuance>,
}

impl Snapshot {
    pub fn new(deliveries: Vec<Delivery>, issuances: Vec<Issuance>) -> Self {
        Self {
            deliveries,
            issuances,
        }
    }
}

/// Provider of the delivery and issuance collections.
///
/// Implementations must return a copy that later appends cannot disturb.
pub trait RecordStore: Send + Sync {
    fn snapshot(&self) -> Snapshot;
}

impl<S> RecordStore for std::sync::Arc<S>
where
    S: RecordStore + ?Sized,
{
    fn snapshot(&self) -> Snapshot {
        (**self).snapshot()
    }
}

/// In-memory append-only store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    inner: RwLock<Snapshot>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            inner: RwLock::new(snapshot),
        }
    }

    pub fn append_delivery(&self, delivery: Delivery) {
        if let Ok(mut s) = self.inner.write() {
            s.deliveries.push(delivery);
        }
    }

    pub fn append_issuance(&self, issuance: Issuance) {
        if let Ok(mut s) = self.inner.write() {
            s.issuances.push(issuance);
        }
    }
}

impl RecordStore for InMemoryRecordStore {
    fn snapshot(&self) -> Snapshot {
        match self.inner.read() {
            Ok(s) => {
                tracing::debug!(
                    deliveries = s.deliveries.len(),
                    issuances = s.issuances.len(),
                    "record snapshot taken"
                );
                s.clone()
            }
            Err(_) => {
                tracing::warn!("record store lock poisoned; returning empty snapshot");
                Snapshot::default()
            }
        }
    }
}
