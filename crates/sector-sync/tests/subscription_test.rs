//! Subscription behaviour across engine handles.

use sector_core::NamespacePath;
use sector_sync::{MemorySyncEngine, SyncEngine, SyncError};

#[tokio::test]
async fn recv_waits_for_live_append() {
    let engine = MemorySyncEngine::new();
    let path = NamespacePath::sector("alpha", "k9");
    let mut sub = engine.subscribe(&path).unwrap();

    let writer = engine.clone();
    let id = writer.append(&path, b"late".to_vec()).unwrap();

    let item = sub.recv().await.unwrap();
    assert_eq!(item.id, id);
    assert_eq!(item.value.as_deref(), Some(&b"late"[..]));
}

#[tokio::test]
async fn late_subscriber_sees_same_history() {
    let engine = MemorySyncEngine::new();
    let path = NamespacePath::restricted("5678");
    for text in ["a", "b", "c"] {
        engine.append(&path, text.as_bytes().to_vec()).unwrap();
    }

    let mut early = engine.subscribe(&path).unwrap();
    let mut late = engine.clone().subscribe(&path).unwrap();

    assert_eq!(early.drain().unwrap(), late.drain().unwrap());
    assert_eq!(engine.item_ids(&path).unwrap().len(), 3);
}

#[test]
fn empty_subscription_is_not_closed() {
    let engine = MemorySyncEngine::new();
    let mut sub = engine.subscribe(&NamespacePath::restricted("5678")).unwrap();

    assert_eq!(sub.try_recv(), Ok(None));
}

#[test]
fn dropping_every_engine_handle_closes_subscription() {
    let engine = MemorySyncEngine::new();
    let mut sub = engine.subscribe(&NamespacePath::restricted("5678")).unwrap();

    drop(engine);

    assert_eq!(sub.try_recv(), Err(SyncError::Closed));
}
