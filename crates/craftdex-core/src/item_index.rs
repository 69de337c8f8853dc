//! Canonical item listing and id lookup with atomic publication.
//!
//! A complete [`ItemSnapshot`] is built off to the side and published with
//! a single pointer swap, so a reader sees
//! either the previous listing or the new one, never a mix. The readiness
//! latch flips on the first publication and stays up until an explicit
//! [`ItemIndex::clear`].

use crate::id::{ItemId, canonical_cmp};
use crate::item::Item;
use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;

/// One published generation of the item index.
#[derive(Debug, Default)]
pub struct ItemSnapshot {
    items: Arc<[Arc<Item>]>,
    by_id: HashMap<ItemId, Arc<Item>>,
}

impl ItemSnapshot {
    /// Sort into canonical order and index by id. When ids repeat, the
    /// first occurrence in input order is kept.
    pub(crate) fn build(mut items: Vec<Item>) -> Self {
        items.sort_by(|a, b| canonical_cmp(a.id().as_str(), b.id().as_str()));

        let mut by_id = HashMap::with_capacity(items.len());
        let mut listing = Vec::with_capacity(items.len());
        for item in items {
            if by_id.contains_key(item.id()) {
                tracing::debug!(item_id = %item.id(), "dropping repeated identifier");
                continue;
            }
            let item = Arc::new(item);
            by_id.insert(item.id().clone(), Arc::clone(&item));
            listing.push(item);
        }

        Self {
            items: listing.into(),
            by_id,
        }
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Item>> {
        self.by_id.get(id)
    }

    pub fn items(&self) -> &Arc<[Arc<Item>]> {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Single-writer, multi-reader item index.
pub struct ItemIndex {
    snap: ArcSwap<ItemSnapshot>,
    ready: watch::Sender<bool>,
}

impl Default for ItemIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ItemIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemIndex")
            .field("len", &self.len())
            .field("ready", &self.ready())
            .finish()
    }
}

impl ItemIndex {
    pub fn new() -> Self {
        Self {
            snap: ArcSwap::from_pointee(ItemSnapshot::default()),
            ready: watch::Sender::new(false),
        }
    }

    /// Replace the listing and raise the readiness latch. Only the import
    /// coordinator publishes.
    pub(crate) fn publish(&self, snapshot: ItemSnapshot) {
        self.snap.store(Arc::new(snapshot));
        self.ready.send_replace(true);
    }

    /// Swap in an empty listing and lower the latch. Only the import
    /// coordinator resets an index.
    pub(crate) fn clear(&self) {
        self.snap.store(Arc::new(ItemSnapshot::default()));
        self.ready.send_replace(false);
    }

    /// Look up an item by identifier. `None` means the id is unknown.
    pub fn get(&self, id: &str) -> Option<Arc<Item>> {
        self.snap.load().by_id.get(id).cloned()
    }

    /// The canonical listing of the current generation.
    pub fn all(&self) -> Arc<[Arc<Item>]> {
        Arc::clone(&self.snap.load().items)
    }

    /// The current generation, for readers that need `get` and `all` to
    /// agree with each other.
    pub fn snapshot(&self) -> Arc<ItemSnapshot> {
        self.snap.load_full()
    }

    pub fn ready(&self) -> bool {
        *self.ready.borrow()
    }

    /// Resolve once the readiness latch is up.
    pub async fn wait_ready(&self) {
        let mut rx = self.ready.subscribe();
        // The sender lives as long as `self`, so this cannot close early.
        let _ = rx.wait_for(|ready| *ready).await;
    }

    pub fn len(&self) -> usize {
        self.snap.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
