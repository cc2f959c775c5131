//! Property-based tests for the inbound pipeline.
//!
//! 1. **Exactly-once**: any delivery schedule with repeats renders each id once
//! 2. **Order**: the sector transcript is sorted by timestamp whatever the
//!    arrival order
//! 3. **Isolation**: peers on different keys never see each other's messages

use proptest::prelude::*;
use sector_client::{Client, ClientAction, ClientEvent};
use sector_core::{
    ChatProfile, MessageRecord, NamespacePath, SessionContext, SessionKey,
    env::test_utils::MockEnv,
};
use sector_sync::{ItemId, MemorySyncEngine, SyncEngine};

fn sector_session(user: &str, key: &str) -> SessionContext {
    SessionContext::new(
        user,
        "alpha",
        SessionKey::new(key),
        NamespacePath::sector("alpha", key),
        ChatProfile::Sector,
    )
}

fn restricted_session(user: &str, key: &str) -> SessionContext {
    SessionContext::new(
        user,
        "5678",
        SessionKey::new(key),
        NamespacePath::restricted("5678"),
        ChatProfile::Restricted,
    )
}

/// Feed every ready subscription item into the client.
fn pump(client: &mut Client<MockEnv>, sub: &mut sector_sync::Subscription) -> Vec<ClientAction> {
    let mut actions = Vec::new();
    for item in sub.drain().unwrap() {
        actions.extend(
            client.handle(ClientEvent::ItemDelivered { id: item.id, value: item.value }).unwrap(),
        );
    }
    actions
}

/// Execute append actions against the engine.
fn flush(engine: &MemorySyncEngine, actions: Vec<ClientAction>) {
    for action in actions {
        if let ClientAction::Append { path, value } = action {
            engine.append(&path, value).unwrap();
        }
    }
}

proptest! {
    #[test]
    fn prop_each_id_rendered_at_most_once(schedule in prop::collection::vec(0usize..6, 1..40)) {
        let mut client = Client::new(MockEnv::new(), sector_session("viewer", "k"));

        for index in schedule {
            let value = MessageRecord::new("peer", format!("m{index}"), 100 + index as u64)
                .encode()
                .unwrap();
            let id = ItemId::new(format!("id-{index}"));
            client.handle(ClientEvent::ItemDelivered { id, value: Some(value) }).unwrap();
        }

        let mut ids: Vec<_> = client.transcript().iter().map(|e| e.id.clone()).collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        prop_assert_eq!(ids.len(), total);
        prop_assert_eq!(client.rendered_count(), total);
    }

    #[test]
    fn prop_sector_transcript_is_sorted(timestamps in prop::collection::vec(1u64..1_000, 1..30)) {
        let mut client = Client::new(MockEnv::new(), sector_session("viewer", "k"));

        for (index, timestamp) in timestamps.iter().enumerate() {
            let value = MessageRecord::new("peer", "x", *timestamp).encode().unwrap();
            let id = ItemId::new(format!("{index}"));
            client.handle(ClientEvent::ItemDelivered { id, value: Some(value) }).unwrap();
        }

        let shown: Vec<u64> = client.transcript().records().map(|r| r.timestamp).collect();
        let mut expected = timestamps.clone();
        expected.sort_unstable();
        prop_assert_eq!(shown, expected);
    }
}

#[test]
fn timestamps_30_10_20_render_as_10_20_30() {
    let mut client = Client::new(MockEnv::new(), sector_session("viewer", "k"));

    for (id, timestamp) in [("a", 30), ("b", 10), ("c", 20)] {
        let value = MessageRecord::new("peer", id, timestamp).encode().unwrap();
        client
            .handle(ClientEvent::ItemDelivered { id: ItemId::from(id), value: Some(value) })
            .unwrap();
    }

    let order: Vec<u64> = client.transcript().records().map(|r| r.timestamp).collect();
    assert_eq!(order, [10, 20, 30]);
}

#[test]
fn peers_share_a_restricted_room() {
    let engine = MemorySyncEngine::new();
    let path = NamespacePath::restricted("5678");

    let env = MockEnv::new();
    let mut rasya = Client::new(env.clone(), restricted_session("rasya", "123"));
    let mut peer = Client::new(env, restricted_session("PENGGUNA1", "123"));
    let mut rasya_sub = engine.subscribe(&path).unwrap();
    let mut peer_sub = engine.subscribe(&path).unwrap();

    flush(&engine, rasya.handle(ClientEvent::SendMessage { text: "hello".into() }).unwrap());
    flush(&engine, peer.handle(ClientEvent::SendMessage { text: "hi back".into() }).unwrap());

    pump(&mut rasya, &mut rasya_sub);
    pump(&mut peer, &mut peer_sub);

    let seen: Vec<_> = peer.transcript().records().map(|r| r.text.clone()).collect();
    assert_eq!(seen, ["hello", "hi back"]);
    assert_eq!(rasya.transcript().len(), 2);
}

#[test]
fn wrong_key_peer_renders_nothing() {
    let engine = MemorySyncEngine::new();
    let path = NamespacePath::restricted("5678");

    let mut rasya = Client::new(MockEnv::new(), restricted_session("rasya", "123"));
    let mut outsider = Client::new(MockEnv::new(), restricted_session("eve", "guess"));
    let mut outsider_sub = engine.subscribe(&path).unwrap();

    flush(&engine, rasya.handle(ClientEvent::SendMessage { text: "classified".into() }).unwrap());
    let actions = pump(&mut outsider, &mut outsider_sub);

    assert_eq!(actions.len(), 1);
    assert!(matches!(actions[0], ClientAction::Dropped { .. }));
    assert!(outsider.transcript().is_empty());
}

#[test]
fn redelivered_history_is_not_shown_twice() {
    let engine = MemorySyncEngine::new();
    let path = NamespacePath::sector("alpha", "k");
    let mut client = Client::new(MockEnv::new(), sector_session("viewer", "k"));
    let mut sub = engine.subscribe(&path).unwrap();

    flush(&engine, client.handle(ClientEvent::SendMessage { text: "once".into() }).unwrap());
    pump(&mut client, &mut sub);

    engine.redeliver(&path).unwrap();
    let actions = pump(&mut client, &mut sub);

    assert!(matches!(actions.as_slice(), [ClientAction::Dropped { .. }]));
    assert_eq!(client.transcript().len(), 1);
}

#[test]
fn different_sector_keys_are_isolated() {
    let engine = MemorySyncEngine::new();
    let mut left = Client::new(MockEnv::new(), sector_session("left", "one"));
    let mut right = Client::new(MockEnv::new(), sector_session("right", "two"));
    let mut right_sub = engine.subscribe(right.session().path()).unwrap();

    flush(&engine, left.handle(ClientEvent::SendMessage { text: "psst".into() }).unwrap());

    assert!(pump(&mut right, &mut right_sub).is_empty());
}
