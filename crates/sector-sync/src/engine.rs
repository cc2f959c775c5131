//! Engine trait and delivery types.

use std::fmt;

use sector_core::NamespacePath;
use tokio::sync::mpsc;

use crate::SyncError;

/// Engine-generated identifier of one item in a namespace.
///
/// Unique within a namespace. The client's exactly-once display guarantee is
/// keyed on this id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(String);

impl ItemId {
    /// Wrap an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// One delivery from a subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncItem {
    /// Item id.
    pub id: ItemId,
    /// Stored value, `None` for a tombstone or an unresolved reference.
    pub value: Option<Vec<u8>>,
}

/// Replicated append-only store keyed by namespace path.
///
/// Implementations share state between clones, like a handle to a running
/// engine.
pub trait SyncEngine: Clone + Send + Sync + 'static {
    /// Subscribe to a namespace.
    ///
    /// The subscription first yields every item already present, then items
    /// appended afterwards. The same id may be delivered more than once.
    fn subscribe(&self, path: &NamespacePath) -> Result<Subscription, SyncError>;

    /// Append a value under a new engine-generated id.
    ///
    /// The returned id acknowledges that the engine accepted the write; it
    /// says nothing about whether peers have seen it.
    fn append(&self, path: &NamespacePath, value: Vec<u8>) -> Result<ItemId, SyncError>;
}

/// Live feed of a single namespace.
#[derive(Debug)]
pub struct Subscription {
    receiver: mpsc::UnboundedReceiver<SyncItem>,
}

impl Subscription {
    /// Wrap a channel receiver. Engines hold the matching sender.
    pub fn new(receiver: mpsc::UnboundedReceiver<SyncItem>) -> Self {
        Self { receiver }
    }

    /// Wait for the next item. `None` once the engine is gone.
    pub async fn recv(&mut self) -> Option<SyncItem> {
        self.receiver.recv().await
    }

    /// Next item if one is ready.
    ///
    /// # Errors
    ///
    /// `Closed` if the engine dropped the sender and nothing is buffered.
    pub fn try_recv(&mut self) -> Result<Option<SyncItem>, SyncError> {
        match self.receiver.try_recv() {
            Ok(item) => Ok(Some(item)),
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => Err(SyncError::Closed),
        }
    }

    /// Every item that is ready right now.
    ///
    /// # Errors
    ///
    /// `Closed` only if the channel is closed and nothing was buffered.
    pub fn drain(&mut self) -> Result<Vec<SyncItem>, SyncError> {
        let mut items = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(item) => items.push(item),
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) if items.is_empty() => {
                    return Err(SyncError::Closed);
                },
                Err(mpsc::error::TryRecvError::Disconnected) => break,
            }
        }
        Ok(items)
    }
}
