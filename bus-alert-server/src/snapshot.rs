//! Latest arrivals per stop.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::{ArrivalRecord, StopId};

/// One stop's most recent successful poll, sorted by minutes.
pub type Snapshot = Arc<[ArrivalRecord]>;

/// Thread-safe store of the latest snapshot per stop.
///
/// Snapshots are replaced wholesale, never edited in place, so a reader
/// holding a `Snapshot` always sees one complete cycle's result. A stop
/// that has never been polled successfully has no entry at all, which is
/// distinct from an entry with zero arrivals.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    inner: Arc<RwLock<HashMap<StopId, Snapshot>>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot for a stop, returning the stored value.
    pub async fn update(&self, stop_id: StopId, records: Vec<ArrivalRecord>) -> Snapshot {
        let snapshot: Snapshot = records.into();
        let mut guard = self.inner.write().await;
        guard.insert(stop_id, Arc::clone(&snapshot));
        snapshot
    }

    /// The latest snapshot for a stop, or `None` if it was never polled.
    pub async fn get(&self, stop_id: &StopId) -> Option<Snapshot> {
        let guard = self.inner.read().await;
        guard.get(stop_id).cloned()
    }

    /// Forget a stop's snapshot.
    pub async fn remove(&self, stop_id: &StopId) -> Option<Snapshot> {
        let mut guard = self.inner.write().await;
        guard.remove(stop_id)
    }

    /// Number of stops with a snapshot.
    pub async fn len(&self) -> usize {
        let guard = self.inner.read().await;
        guard.len()
    }

    pub async fn is_empty(&self) -> bool {
        let guard = self.inner.read().await;
        guard.is_empty()
    }
}
