//! Fuzz target for the inbound pipeline
//!
//! Feeds arbitrary delivery sequences (duplicates, tombstones, garbage and
//! valid records under a small id space) into a Client.
//!
//! # Invariants
//!
//! - Each item id is delivered at most once
//! - Sector transcripts stay sorted by timestamp
//! - NEVER panic

#![no_main]

use std::collections::HashSet;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sector_client::{Client, ClientAction, ClientEvent};
use sector_core::{
    ChatProfile, MessageRecord, NamespacePath, SessionContext, SessionKey,
    env::test_utils::MockEnv,
};
use sector_sync::ItemId;

#[derive(Debug, Arbitrary)]
enum Delivery {
    Tombstone { id: u8 },
    Garbage { id: u8, bytes: Vec<u8> },
    Record { id: u8, user: String, text: String, timestamp: u64 },
}

#[derive(Debug, Arbitrary)]
struct Input {
    sector: bool,
    deliveries: Vec<Delivery>,
}

fuzz_target!(|input: Input| {
    let profile = if input.sector { ChatProfile::Sector } else { ChatProfile::Restricted };
    let path = match profile {
        ChatProfile::Sector => NamespacePath::sector("alpha", "k9"),
        ChatProfile::Restricted => NamespacePath::restricted("5678"),
    };
    let session = SessionContext::new("ghost", "alpha", SessionKey::new("k9"), path, profile);
    let mut client = Client::new(MockEnv::new(), session);
    let mut delivered = HashSet::new();

    for delivery in input.deliveries {
        let (id, value) = match delivery {
            Delivery::Tombstone { id } => (id, None),
            Delivery::Garbage { id, bytes } => (id, Some(bytes)),
            Delivery::Record { id, user, text, timestamp } => {
                let Ok(encoded) = MessageRecord::new(user, text, timestamp).encode() else {
                    continue;
                };
                (id, Some(encoded))
            }
        };

        let event = ClientEvent::ItemDelivered { id: ItemId::new(id.to_string()), value };
        for action in client.handle(event).expect("inbound items never error") {
            if let ClientAction::Deliver(message) = action {
                assert!(delivered.insert(message.id.clone()), "{} delivered twice", message.id);
            }
        }
    }

    if profile == ChatProfile::Sector {
        let timestamps: Vec<u64> = client.transcript().records().map(|r| r.timestamp).collect();
        assert!(timestamps.windows(2).all(|w| w[0] <= w[1]));
    }
});
