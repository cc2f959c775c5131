//! Relay-backed sync engine.
//!
//! [`RelaySyncEngine`] keeps a local replica in a [`MemorySyncEngine`] and
//! mirrors it through every configured relay. Local writes land in the
//! replica at once and are pushed to each relay. Items a relay forwards are
//! ingested into the replica, which notifies local subscribers.
//!
//! Relays are redialled with backoff. On every (re)connect the link sends the
//! full subscription set and every item the replica holds, so writes made
//! while offline reach the relay later. Connectivity is never surfaced to
//! the caller; it shows up only in the log.

mod frame;
mod link;

use std::{
    collections::BTreeSet,
    fmt::{self, Write as _},
    sync::{Arc, Mutex},
};

pub use frame::{FrameError, MAX_FRAME_SIZE, RelayFrame, read_frame, write_frame};
use sector_core::NamespacePath;
use tokio::sync::mpsc;

use crate::{ItemId, MemorySyncEngine, Subscription, SyncEngine, SyncError};

/// Dialable relay address, `host:port`.
///
/// Accepts a bare `host:port` or a `tcp://` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayAddr(String);

impl RelayAddr {
    /// Validate a configured relay.
    pub fn parse(raw: &str) -> Result<Self, SyncError> {
        let invalid =
            |reason: &'static str| SyncError::InvalidRelay { addr: raw.to_string(), reason };

        let rest = match raw.trim().split_once("://") {
            None => raw.trim(),
            Some(("tcp", rest)) => rest,
            Some(_) => return Err(invalid("only tcp:// relays are supported")),
        };
        let rest = rest.trim_end_matches('/');

        let (host, port) = rest.rsplit_once(':').ok_or_else(|| invalid("missing port"))?;
        if host.is_empty() {
            return Err(invalid("missing host"));
        }
        if !port.parse::<u16>().is_ok_and(|port| port != 0) {
            return Err(invalid("port must be 1-65535"));
        }
        Ok(Self(rest.to_string()))
    }

    /// Address as passed to the socket layer.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RelayAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sync engine replicating through one or more relays.
#[derive(Clone)]
pub struct RelaySyncEngine {
    replica: MemorySyncEngine,
    links: Arc<[mpsc::UnboundedSender<RelayFrame>]>,
    subscribed: Arc<Mutex<BTreeSet<NamespacePath>>>,
}

impl RelaySyncEngine {
    /// Spawn one link task per relay on the current Tokio runtime.
    ///
    /// Returns at once. Links dial in the background and stop when the last
    /// clone of the engine is dropped.
    pub fn start(relays: Vec<RelayAddr>) -> Result<Self, SyncError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| SyncError::NoRuntime)?;
        let replica = MemorySyncEngine::with_id_prefix(replica_prefix()?);
        let subscribed = Arc::new(Mutex::new(BTreeSet::new()));

        let links = relays
            .into_iter()
            .map(|addr| {
                let (tx, rx) = mpsc::unbounded_channel();
                tracing::info!(relay = %addr, "relay link starting");
                runtime.spawn(link::run(addr, replica.clone(), Arc::clone(&subscribed), rx));
                tx
            })
            .collect();

        Ok(Self { replica, links, subscribed })
    }

    /// Local replica.
    pub fn replica(&self) -> &MemorySyncEngine {
        &self.replica
    }

    fn broadcast(&self, frame: &RelayFrame) {
        for link in self.links.iter() {
            if link.send(frame.clone()).is_err() {
                tracing::debug!("relay link has stopped");
            }
        }
    }
}

impl SyncEngine for RelaySyncEngine {
    fn subscribe(&self, path: &NamespacePath) -> Result<Subscription, SyncError> {
        let subscription = self.replica.subscribe(path)?;
        let fresh = self.subscribed.lock().map_err(|_| SyncError::Poisoned)?.insert(path.clone());
        if fresh {
            self.broadcast(&RelayFrame::Subscribe { path: path.to_string() });
        }
        Ok(subscription)
    }

    fn append(&self, path: &NamespacePath, value: Vec<u8>) -> Result<ItemId, SyncError> {
        let id = self.replica.append(path, value.clone())?;
        self.broadcast(&RelayFrame::Put {
            path: path.to_string(),
            id: id.to_string(),
            value: Some(value),
        });
        Ok(id)
    }
}

/// Random id prefix for this replica, e.g. `3fa9c1e07b22-`.
fn replica_prefix() -> Result<String, SyncError> {
    let mut bytes = [0u8; 6];
    getrandom::fill(&mut bytes).map_err(|_| SyncError::Entropy)?;
    let mut prefix = String::with_capacity(2 * bytes.len() + 1);
    for byte in bytes {
        let _ = write!(prefix, "{byte:02x}");
    }
    prefix.push('-');
    Ok(prefix)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::{net::TcpListener, time::timeout};

    use super::*;
    use crate::SyncItem;

    const WAIT: Duration = Duration::from_secs(5);

    #[test]
    fn parses_bare_and_tcp_addresses() {
        assert_eq!(RelayAddr::parse("127.0.0.1:8765").unwrap().as_str(), "127.0.0.1:8765");
        let url = RelayAddr::parse(" tcp://relay.lan:8765/ ").unwrap();
        assert_eq!(url.as_str(), "relay.lan:8765");
        assert_eq!(RelayAddr::parse("[::1]:9000").unwrap().as_str(), "[::1]:9000");
    }

    #[test]
    fn rejects_unusable_addresses() {
        for raw in ["wss://relay.lan/gun", "relay.lan", ":8765", "relay.lan:0", "relay.lan:http"] {
            assert!(
                matches!(RelayAddr::parse(raw), Err(SyncError::InvalidRelay { .. })),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn start_needs_a_runtime() {
        let addr = RelayAddr::parse("127.0.0.1:9").unwrap();
        assert!(matches!(RelaySyncEngine::start(vec![addr]), Err(SyncError::NoRuntime)));
    }

    #[tokio::test]
    async fn offline_writes_are_visible_locally() {
        // Nothing listens on the discard port; the link keeps redialling.
        let addr = RelayAddr::parse("127.0.0.1:9").unwrap();
        let engine = RelaySyncEngine::start(vec![addr]).unwrap();
        let path = NamespacePath::sector("alpha", "k9");
        let mut sub = engine.subscribe(&path).unwrap();

        let id = engine.append(&path, b"hello".to_vec()).unwrap();

        assert_eq!(sub.drain().unwrap(), vec![SyncItem { id, value: Some(b"hello".to_vec()) }]);
    }

    #[tokio::test]
    async fn link_mirrors_both_directions() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = RelayAddr::parse(&listener.local_addr().unwrap().to_string()).unwrap();
        let path = NamespacePath::sector("alpha", "k9");

        let engine = RelaySyncEngine::start(vec![addr]).unwrap();
        let mut sub = engine.subscribe(&path).unwrap();
        let ours = engine.append(&path, b"ours".to_vec()).unwrap();

        let (mut relay, _) = timeout(WAIT, listener.accept()).await.unwrap().unwrap();

        let mut saw_subscribe = false;
        let mut saw_put = false;
        while !(saw_subscribe && saw_put) {
            match timeout(WAIT, read_frame(&mut relay)).await.unwrap().unwrap() {
                RelayFrame::Subscribe { path: p } => saw_subscribe |= p == path.as_str(),
                RelayFrame::Put { id, .. } => saw_put |= id == ours.as_str(),
            }
        }

        let theirs = RelayFrame::Put {
            path: path.to_string(),
            id: "peer-0000000000000000".into(),
            value: Some(b"theirs".to_vec()),
        };
        write_frame(&mut relay, &theirs).await.unwrap();

        let mut delivered = Vec::new();
        while delivered.len() < 2 {
            delivered.push(timeout(WAIT, sub.recv()).await.unwrap().unwrap());
        }
        assert_eq!(delivered[0].id, ours);
        assert_eq!(delivered[1].id, ItemId::from("peer-0000000000000000"));
    }
}
