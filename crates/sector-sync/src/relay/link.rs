//! One relay connection, redialled until the engine is dropped.

use std::{
    collections::BTreeSet,
    io,
    sync::{Arc, Mutex},
    time::Duration,
};

use sector_core::NamespacePath;
use tokio::{
    net::{TcpStream, tcp::OwnedReadHalf},
    sync::mpsc,
};

use super::{FrameError, RelayAddr, RelayFrame, read_frame, write_frame};
use crate::{ItemId, MemorySyncEngine, SyncItem};

const INITIAL_BACKOFF: Duration = Duration::from_millis(250);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// How a connected session ended.
enum SessionEnd {
    /// Every engine handle is gone; stop for good.
    EngineDropped,
    /// Relay hung up cleanly.
    RelayClosed,
}

pub(super) async fn run(
    addr: RelayAddr,
    replica: MemorySyncEngine,
    subscribed: Arc<Mutex<BTreeSet<NamespacePath>>>,
    mut outbound: mpsc::UnboundedReceiver<RelayFrame>,
) {
    let mut backoff = INITIAL_BACKOFF;

    loop {
        match TcpStream::connect(addr.as_str()).await {
            Ok(stream) => {
                tracing::info!(relay = %addr, "relay connected");
                backoff = INITIAL_BACKOFF;

                match session(stream, &replica, &subscribed, &mut outbound).await {
                    Ok(SessionEnd::EngineDropped) => return,
                    Ok(SessionEnd::RelayClosed) => {
                        tracing::warn!(relay = %addr, "relay closed the connection");
                    },
                    Err(e) => tracing::warn!(relay = %addr, error = %e, "relay connection lost"),
                }
            },
            Err(e) => tracing::debug!(relay = %addr, error = %e, "relay unreachable"),
        }

        if !wait_to_redial(&mut outbound, backoff).await {
            return;
        }
        backoff = (backoff * 2).min(MAX_BACKOFF);
    }
}

/// Sleep out the backoff. `false` if the engine was dropped meanwhile.
///
/// Frames queued while offline are discarded: the resync on connect
/// re-sends everything they carried.
async fn wait_to_redial(
    outbound: &mut mpsc::UnboundedReceiver<RelayFrame>,
    backoff: Duration,
) -> bool {
    let sleep = tokio::time::sleep(backoff);
    tokio::pin!(sleep);

    loop {
        tokio::select! {
            () = &mut sleep => return true,
            frame = outbound.recv() => {
                if frame.is_none() {
                    return false;
                }
            },
        }
    }
}

async fn session(
    stream: TcpStream,
    replica: &MemorySyncEngine,
    subscribed: &Mutex<BTreeSet<NamespacePath>>,
    outbound: &mut mpsc::UnboundedReceiver<RelayFrame>,
) -> Result<SessionEnd, FrameError> {
    let (reader, mut writer) = stream.into_split();

    for frame in resync_frames(replica, subscribed) {
        write_frame(&mut writer, &frame).await?;
    }

    let mut inbound = tokio::spawn(pump_inbound(reader, replica.clone()));

    let end = loop {
        tokio::select! {
            frame = outbound.recv() => match frame {
                Some(frame) => {
                    if let Err(e) = write_frame(&mut writer, &frame).await {
                        break Err(e);
                    }
                },
                None => break Ok(SessionEnd::EngineDropped),
            },
            joined = &mut inbound => break match joined {
                Ok(FrameError::Io(e)) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    Ok(SessionEnd::RelayClosed)
                },
                Ok(e) => Err(e),
                Err(e) => Err(FrameError::Io(io::Error::other(e))),
            },
        }
    };

    inbound.abort();
    end
}

/// Ingest forwarded items until the connection fails.
async fn pump_inbound(mut reader: OwnedReadHalf, replica: MemorySyncEngine) -> FrameError {
    loop {
        match read_frame(&mut reader).await {
            Ok(frame) => apply(&replica, frame),
            Err(e) => return e,
        }
    }
}

fn apply(replica: &MemorySyncEngine, frame: RelayFrame) {
    match frame {
        RelayFrame::Put { path: raw, id, value } => {
            let Some(path) = NamespacePath::parse(&raw) else {
                tracing::debug!(path = %raw, "item for a foreign namespace ignored");
                return;
            };
            if let Err(e) = replica.ingest(&path, SyncItem { id: ItemId::new(id), value }) {
                tracing::warn!(path = %path, error = %e, "replica rejected relayed item");
            }
        },
        RelayFrame::Subscribe { path } => {
            tracing::debug!(path = %path, "subscribe from relay ignored");
        },
    }
}

/// Subscriptions first, then every item the replica holds.
fn resync_frames(
    replica: &MemorySyncEngine,
    subscribed: &Mutex<BTreeSet<NamespacePath>>,
) -> Vec<RelayFrame> {
    let mut frames = Vec::new();

    match subscribed.lock() {
        Ok(paths) => frames.extend(
            paths.iter().map(|path| RelayFrame::Subscribe { path: path.to_string() }),
        ),
        Err(_) => tracing::warn!("subscription set poisoned, resync skips subscriptions"),
    }

    let paths = replica.paths().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "replica unavailable, resync skips items");
        Vec::new()
    });
    for path in paths {
        for item in replica.items(&path).unwrap_or_default() {
            frames.push(RelayFrame::Put {
                path: path.to_string(),
                id: item.id.to_string(),
                value: item.value,
            });
        }
    }

    frames
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SyncEngine;

    #[test]
    fn resync_sends_subscriptions_then_items() {
        let replica = MemorySyncEngine::with_id_prefix("me-");
        let path = NamespacePath::restricted("5678");
        let id = replica.append(&path, b"sealed".to_vec()).unwrap();
        let subscribed = Mutex::new(BTreeSet::from([path.clone()]));

        let frames = resync_frames(&replica, &subscribed);

        assert_eq!(frames, vec![
            RelayFrame::Subscribe { path: path.to_string() },
            RelayFrame::Put {
                path: path.to_string(),
                id: id.to_string(),
                value: Some(b"sealed".to_vec()),
            },
        ]);
    }

    #[test]
    fn foreign_namespaces_are_not_ingested() {
        let replica = MemorySyncEngine::new();
        apply(&replica, RelayFrame::Put {
            path: "elsewhere/room".into(),
            id: "x".into(),
            value: Some(b"hi".to_vec()),
        });
        assert!(replica.paths().unwrap().is_empty());
    }

    #[tokio::test]
    async fn dropped_engine_stops_the_backoff() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        drop(tx);
        assert!(!wait_to_redial(&mut rx, Duration::from_secs(60)).await);
    }
}
