use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use sector_core::NamespacePath;
use tokio::sync::mpsc;

use crate::{ItemId, Subscription, SyncEngine, SyncError, SyncItem};

/// In-process sync engine.
///
/// Every clone shares the same namespaces, so several clients created from
/// clones of one engine behave like peers on one replicated graph. Each
/// subscriber gets an unbounded channel; history is replayed into it at
/// subscribe time and later writes are fanned out to every live subscriber.
#[derive(Clone, Default)]
pub struct MemorySyncEngine {
    inner: Arc<Mutex<MemorySyncInner>>,
}

#[derive(Default)]
struct MemorySyncInner {
    /// Prepended to generated ids so replicas never mint the same id
    id_prefix: String,

    /// Monotonic counter for generated item ids
    next_id: u64,

    /// Items and subscribers per namespace
    namespaces: HashMap<NamespacePath, Namespace>,
}

#[derive(Default)]
struct Namespace {
    /// Items in write order. Retracted items keep their slot with no value.
    items: Vec<SyncItem>,

    subscribers: Vec<mpsc::UnboundedSender<SyncItem>>,
}

impl Namespace {
    /// Send to every subscriber, forgetting the ones whose receiver is gone.
    fn publish(&mut self, item: &SyncItem) {
        self.subscribers.retain(|tx| tx.send(item.clone()).is_ok());
    }
}

impl MemorySyncEngine {
    /// Create an empty engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty engine whose generated ids start with `prefix`.
    ///
    /// Replicas that exchange items must use distinct prefixes.
    pub fn with_id_prefix(prefix: impl Into<String>) -> Self {
        let inner = MemorySyncInner { id_prefix: prefix.into(), ..MemorySyncInner::default() };
        Self { inner: Arc::new(Mutex::new(inner)) }
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemorySyncInner>, SyncError> {
        self.inner.lock().map_err(|_| SyncError::Poisoned)
    }

    /// Replace an item's value with a tombstone and publish the tombstone.
    ///
    /// Returns `false` if no item with that id exists in the namespace.
    pub fn retract(&self, path: &NamespacePath, id: &ItemId) -> Result<bool, SyncError> {
        let mut inner = self.lock()?;
        let Some(namespace) = inner.namespaces.get_mut(path) else {
            return Ok(false);
        };
        let Some(slot) = namespace.items.iter_mut().find(|item| &item.id == id) else {
            return Ok(false);
        };

        slot.value = None;
        let tombstone = slot.clone();
        namespace.publish(&tombstone);

        tracing::debug!(path = %path, id = %id, "item retracted");
        Ok(true)
    }

    /// Publish the whole history of a namespace again.
    ///
    /// Models a peer reconnecting and replaying what it has. Returns the
    /// number of items re-sent to each subscriber.
    pub fn redeliver(&self, path: &NamespacePath) -> Result<usize, SyncError> {
        let mut inner = self.lock()?;
        let Some(namespace) = inner.namespaces.get_mut(path) else {
            return Ok(0);
        };

        let history = namespace.items.clone();
        for item in &history {
            namespace.publish(item);
        }
        Ok(history.len())
    }

    /// Store an item that was written elsewhere, keeping its id.
    ///
    /// New ids are stored and published. A tombstone for a live item
    /// retracts it. Anything else is already known and changes nothing.
    /// Returns whether subscribers were notified.
    pub fn ingest(&self, path: &NamespacePath, item: SyncItem) -> Result<bool, SyncError> {
        let mut inner = self.lock()?;
        let namespace = inner.namespaces.entry(path.clone()).or_default();

        if let Some(slot) = namespace.items.iter_mut().find(|known| known.id == item.id) {
            if slot.value.is_none() || item.value.is_some() {
                return Ok(false);
            }
            slot.value = None;
            let tombstone = slot.clone();
            namespace.publish(&tombstone);
            return Ok(true);
        }

        namespace.items.push(item.clone());
        namespace.publish(&item);
        Ok(true)
    }

    /// Every namespace that has been written to or subscribed.
    pub fn paths(&self) -> Result<Vec<NamespacePath>, SyncError> {
        let inner = self.lock()?;
        Ok(inner.namespaces.keys().cloned().collect())
    }

    /// Items of a namespace in write order, tombstones included.
    pub fn items(&self, path: &NamespacePath) -> Result<Vec<SyncItem>, SyncError> {
        let inner = self.lock()?;
        Ok(inner.namespaces.get(path).map(|namespace| namespace.items.clone()).unwrap_or_default())
    }

    /// Number of items written to a namespace, tombstones included.
    pub fn item_count(&self, path: &NamespacePath) -> Result<usize, SyncError> {
        let inner = self.lock()?;
        Ok(inner.namespaces.get(path).map_or(0, |namespace| namespace.items.len()))
    }

    /// Number of live subscribers on a namespace.
    pub fn subscriber_count(&self, path: &NamespacePath) -> Result<usize, SyncError> {
        let inner = self.lock()?;
        Ok(inner.namespaces.get(path).map_or(0, |namespace| {
            namespace.subscribers.iter().filter(|tx| !tx.is_closed()).count()
        }))
    }

    /// Ids of every item in a namespace, in write order.
    pub fn item_ids(&self, path: &NamespacePath) -> Result<Vec<ItemId>, SyncError> {
        let inner = self.lock()?;
        Ok(inner
            .namespaces
            .get(path)
            .map(|namespace| namespace.items.iter().map(|item| item.id.clone()).collect())
            .unwrap_or_default())
    }
}

impl SyncEngine for MemorySyncEngine {
    fn subscribe(&self, path: &NamespacePath) -> Result<Subscription, SyncError> {
        let mut inner = self.lock()?;
        let namespace = inner.namespaces.entry(path.clone()).or_default();

        let (tx, rx) = mpsc::unbounded_channel();
        for item in &namespace.items {
            // Receiver is still in hand, so the send cannot fail.
            let _ = tx.send(item.clone());
        }
        namespace.subscribers.push(tx);

        tracing::debug!(path = %path, backlog = namespace.items.len(), "subscribed");
        Ok(Subscription::new(rx))
    }

    fn append(&self, path: &NamespacePath, value: Vec<u8>) -> Result<ItemId, SyncError> {
        let mut inner = self.lock()?;
        let id = ItemId::new(format!("{}{:016x}", inner.id_prefix, inner.next_id));
        inner.next_id += 1;

        let namespace = inner.namespaces.entry(path.clone()).or_default();
        let item = SyncItem { id: id.clone(), value: Some(value) };
        namespace.items.push(item.clone());
        namespace.publish(&item);

        Ok(id)
    }
}
