//! Client events and actions.

use std::fmt;

use sector_core::{MessageRecord, NamespacePath};
use sector_sync::ItemId;

/// Events the caller feeds into the client.
///
/// The caller is responsible for:
/// - Forwarding every item the subscription yields, backlog included
/// - Forwarding submitted input lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// Sync engine delivered an item for the bound namespace.
    ItemDelivered {
        /// Engine item id.
        id: ItemId,
        /// Stored value, `None` for a tombstone.
        value: Option<Vec<u8>>,
    },

    /// User submitted an input line.
    SendMessage {
        /// Raw input, trimmed by the client.
        text: String,
    },
}

/// A message accepted into the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredMessage {
    /// Engine item id.
    pub id: ItemId,
    /// Validated record.
    pub record: MessageRecord,
    /// Index at which the message now sits in the transcript.
    pub position: usize,
}

/// Why an inbound item was not displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Item has no value.
    Tombstone,
    /// Id was already accepted.
    Duplicate,
    /// Sealed payload did not open with the session key.
    DecryptionFailure,
    /// Payload is not a complete record.
    MalformedRecord,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Tombstone => "tombstone",
            Self::Duplicate => "duplicate",
            Self::DecryptionFailure => "decryption failure",
            Self::MalformedRecord => "malformed record",
        })
    }
}

/// Actions the client produces for the caller to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientAction {
    /// Write a value into the sync engine.
    Append {
        /// Namespace to write into.
        path: NamespacePath,
        /// Encoded (and possibly sealed) record.
        value: Vec<u8>,
    },

    /// Show a message.
    Deliver(DeliveredMessage),

    /// An inbound item was silently discarded.
    Dropped {
        /// Engine item id.
        id: ItemId,
        /// Reason for the drop.
        reason: DropReason,
    },
}
