//! The upstream raw record store, seen from the importer's side.
//!
//! How the store fetches or refreshes its data is its own business. The
//! importer only needs a readiness signal and a read-only snapshot, both
//! delivered through one `watch` channel: `None` until data is first
//! available, then the latest published [`RawSnapshot`].

use crate::raw::RawSnapshot;
use std::sync::Arc;
use tokio::sync::watch;

/// Source of raw item and recipe records.
pub trait RawRecordStore: Send + Sync + 'static {
    /// Subscribe to published snapshots. A closed channel means the store
    /// will never publish again.
    fn subscribe(&self) -> watch::Receiver<Option<Arc<RawSnapshot>>>;
}

/// A store whose snapshots are pushed in by the caller.
#[derive(Debug)]
pub struct MemoryStore {
    tx: watch::Sender<Option<Arc<RawSnapshot>>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// An empty store that has not published anything yet.
    pub fn new() -> Self {
        Self {
            tx: watch::Sender::new(None),
        }
    }

    pub fn with_snapshot(snapshot: RawSnapshot) -> Self {
        let store = Self::new();
        store.publish(snapshot);
        store
    }

    /// Publish a new snapshot, waking every subscriber.
    pub fn publish(&self, snapshot: RawSnapshot) -> Arc<RawSnapshot> {
        let snapshot = Arc::new(snapshot);
        self.tx.send_replace(Some(Arc::clone(&snapshot)));
        snapshot
    }

    /// The most recently published snapshot.
    pub fn current(&self) -> Option<Arc<RawSnapshot>> {
        self.tx.borrow().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.tx.borrow().is_some()
    }
}

impl RawRecordStore for MemoryStore {
    fn subscribe(&self) -> watch::Receiver<Option<Arc<RawSnapshot>>> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::raw_item;

    #[test]
    fn new_store_is_not_ready() {
        let store = MemoryStore::new();
        assert!(!store.is_ready());
        assert!(store.current().is_none());
        assert!(store.subscribe().borrow().is_none());
    }

    #[test]
    fn publish_replaces_current_snapshot() {
        let store = MemoryStore::with_snapshot(RawSnapshot::from_items(vec![raw_item("A")]));
        assert!(store.is_ready());

        let second = store.publish(RawSnapshot::from_items(vec![raw_item("B"), raw_item("C")]));
        let current = store.current().unwrap();
        assert!(Arc::ptr_eq(&current, &second));
        assert_eq!(current.items.len(), 2);
    }

    #[tokio::test]
    async fn subscribers_see_later_publications() {
        let store = MemoryStore::new();
        let mut rx = store.subscribe();
        store.publish(RawSnapshot::default());
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_some());
    }
}
