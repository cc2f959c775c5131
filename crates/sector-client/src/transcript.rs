//! Ordered transcript.
//!
//! Accepted messages live in a `BTreeMap` keyed by `(timestamp, arrival)`.
//! Arrival-ordered transcripts use a zero timestamp for every key, which
//! collapses the ordering to arrival sequence alone. Insertion reports the
//! display position so a view can splice one line instead of redrawing.

use std::collections::BTreeMap;

use sector_core::{MessageRecord, TranscriptOrder};
use sector_sync::ItemId;

/// One displayed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    /// Engine item id.
    pub id: ItemId,
    /// Validated record.
    pub record: MessageRecord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct TranscriptKey {
    timestamp: u64,
    arrival: u64,
}

/// Accepted messages in display order.
#[derive(Debug, Clone)]
pub struct Transcript {
    order: TranscriptOrder,
    entries: BTreeMap<TranscriptKey, TranscriptEntry>,
    next_arrival: u64,
}

impl Transcript {
    /// Empty transcript with the given ordering.
    pub fn new(order: TranscriptOrder) -> Self {
        Self { order, entries: BTreeMap::new(), next_arrival: 0 }
    }

    /// Ordering in effect.
    pub fn order(&self) -> TranscriptOrder {
        self.order
    }

    /// Insert an entry and return its display position.
    ///
    /// Chronological transcripts place the entry after every entry with a
    /// smaller or equal timestamp; equal timestamps keep arrival order.
    pub fn insert(&mut self, id: ItemId, record: MessageRecord) -> usize {
        let timestamp = match self.order {
            TranscriptOrder::Arrival => 0,
            TranscriptOrder::Chronological => record.timestamp,
        };
        let key = TranscriptKey { timestamp, arrival: self.next_arrival };
        self.next_arrival += 1;

        let position = self.entries.range(..key).count();
        self.entries.insert(key, TranscriptEntry { id, record });
        position
    }

    /// Entries in display order.
    pub fn iter(&self) -> impl Iterator<Item = &TranscriptEntry> {
        self.entries.values()
    }

    /// Records in display order.
    pub fn records(&self) -> impl Iterator<Item = &MessageRecord> {
        self.entries.values().map(|entry| &entry.record)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing has been accepted yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
