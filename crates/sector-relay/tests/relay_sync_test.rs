//! Replicas talking through a real relay over loopback TCP.

use std::time::Duration;

use sector_core::NamespacePath;
use sector_relay::RelayServer;
use sector_sync::{EngineHandle, MemorySyncEngine, Subscription, SyncEngine, SyncItem, connect};
use tokio::time::{sleep, timeout};

const WAIT: Duration = Duration::from_secs(5);

/// Start a relay on an ephemeral port. Returns its address and its store.
async fn start_relay() -> (String, MemorySyncEngine) {
    let relay = RelayServer::bind("127.0.0.1:0").await.unwrap();
    let addr = relay.local_addr().unwrap().to_string();
    let store = relay.store().clone();
    tokio::spawn(relay.run());
    (addr, store)
}

fn replica(addr: &str) -> EngineHandle {
    let engine = connect(&[addr.to_string()]).unwrap();
    assert!(engine.is_networked());
    engine
}

async fn next_item(sub: &mut Subscription) -> SyncItem {
    timeout(WAIT, sub.recv()).await.expect("no item within deadline").expect("engine gone")
}

async fn wait_for_items(store: &MemorySyncEngine, path: &NamespacePath, count: usize) {
    timeout(WAIT, async {
        while store.item_count(path).unwrap() < count {
            sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("relay never stored the items");
}

#[tokio::test]
async fn peers_on_one_relay_see_each_other() {
    let (addr, _store) = start_relay().await;
    let path = NamespacePath::sector("alpha", "k9");
    let alice = replica(&addr);
    let bob = replica(&addr);
    let mut alice_sub = alice.subscribe(&path).unwrap();
    let mut bob_sub = bob.subscribe(&path).unwrap();

    let from_alice = alice.append(&path, b"hi bob".to_vec()).unwrap();
    assert_eq!(next_item(&mut alice_sub).await.id, from_alice);

    let seen = next_item(&mut bob_sub).await;
    assert_eq!(seen.id, from_alice);
    assert_eq!(seen.value.as_deref(), Some(&b"hi bob"[..]));

    let from_bob = bob.append(&path, b"hi alice".to_vec()).unwrap();
    assert_eq!(next_item(&mut bob_sub).await.id, from_bob);
    assert_eq!(next_item(&mut alice_sub).await.id, from_bob);
}

#[tokio::test]
async fn late_joiner_receives_history() {
    let (addr, store) = start_relay().await;
    let path = NamespacePath::restricted("5678");

    let early = replica(&addr);
    let _early_sub = early.subscribe(&path).unwrap();
    let first = early.append(&path, b"sealed-1".to_vec()).unwrap();
    wait_for_items(&store, &path, 1).await;

    let late = replica(&addr);
    let mut late_sub = late.subscribe(&path).unwrap();

    assert_eq!(next_item(&mut late_sub).await.id, first);
}

#[tokio::test]
async fn namespaces_stay_apart_on_the_relay() {
    let (addr, store) = start_relay().await;
    let ours = NamespacePath::sector("alpha", "k9");
    let theirs = NamespacePath::sector("alpha", "other");

    let writer = replica(&addr);
    let _writer_sub = writer.subscribe(&ours).unwrap();
    let reader = replica(&addr);
    let mut reader_sub = reader.subscribe(&theirs).unwrap();

    writer.append(&ours, b"private".to_vec()).unwrap();
    wait_for_items(&store, &ours, 1).await;
    sleep(Duration::from_millis(200)).await;

    assert!(reader_sub.drain().unwrap().is_empty());
    assert_eq!(store.item_count(&theirs).unwrap(), 0);
}

#[tokio::test]
async fn writes_made_offline_reach_the_relay_later() {
    // Reserve a port, then free it so the replica starts with no relay.
    let addr = {
        let reserved = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        reserved.local_addr().unwrap().to_string()
    };
    let path = NamespacePath::sector("night", "owl");

    let offline = replica(&addr);
    let _offline_sub = offline.subscribe(&path).unwrap();
    let written = offline.append(&path, b"queued".to_vec()).unwrap();
    sleep(Duration::from_millis(100)).await;

    let relay = RelayServer::bind(&addr).await.unwrap();
    let store = relay.store().clone();
    tokio::spawn(relay.run());
    wait_for_items(&store, &path, 1).await;

    let reader = replica(&addr);
    let mut reader_sub = reader.subscribe(&path).unwrap();
    assert_eq!(next_item(&mut reader_sub).await.id, written);
}
