//! Relay node for sector chat.
//!
//! A relay stores every item it is sent, per namespace, and forwards items to
//! each connection that subscribed to that namespace: first the stored
//! history, then items as they arrive. It never opens or validates payloads;
//! restricted-room records reach it sealed.
//!
//! Storage is a [`MemorySyncEngine`], so a relay forgets everything on
//! restart. Replicas re-send what they hold when they reconnect, which
//! repopulates it.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

use std::{collections::HashMap, io, net::SocketAddr};

use sector_core::NamespacePath;
use sector_sync::{
    ItemId, MemorySyncEngine, Subscription, SyncEngine, SyncError, SyncItem,
    relay::{FrameError, RelayFrame, read_frame, write_frame},
};
use thiserror::Error;
use tokio::{
    net::{TcpListener, TcpStream},
    sync::mpsc,
    task::JoinHandle,
};

/// Namespaces one connection may subscribe to.
pub const MAX_SUBSCRIPTIONS_PER_PEER: usize = 64;

/// Relay errors.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Listener error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Store error.
    #[error("store error: {0}")]
    Store(#[from] SyncError),

    /// Peer sent something that is not a frame.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),
}

/// Relay listening on a TCP socket.
pub struct RelayServer {
    listener: TcpListener,
    store: MemorySyncEngine,
}

impl RelayServer {
    /// Bind to `addr` with an empty store.
    pub async fn bind(addr: &str) -> Result<Self, RelayError> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener, store: MemorySyncEngine::new() })
    }

    /// Local address the relay is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, RelayError> {
        Ok(self.listener.local_addr()?)
    }

    /// Items held by the relay.
    pub fn store(&self) -> &MemorySyncEngine {
        &self.store
    }

    /// Accept connections forever. Only startup errors are returned.
    pub async fn run(self) -> Result<(), RelayError> {
        tracing::info!(addr = %self.local_addr()?, "relay listening");

        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    tracing::info!(%peer, "peer connected");
                    tokio::spawn(serve_peer(stream, peer, self.store.clone()));
                },
                Err(e) => tracing::warn!(error = %e, "accept failed"),
            }
        }
    }
}

async fn serve_peer(stream: TcpStream, peer: SocketAddr, store: MemorySyncEngine) {
    let (mut reader, mut writer) = stream.into_split();
    let (outbound, mut queued) = mpsc::unbounded_channel::<RelayFrame>();

    let writer_task = tokio::spawn(async move {
        while let Some(frame) = queued.recv().await {
            write_frame(&mut writer, &frame).await?;
        }
        Ok::<_, FrameError>(())
    });

    let mut forwarders: HashMap<NamespacePath, JoinHandle<()>> = HashMap::new();
    let error = loop {
        let frame = match read_frame(&mut reader).await {
            Ok(frame) => frame,
            Err(e) => break RelayError::from(e),
        };
        if let Err(e) = handle_frame(frame, &store, &outbound, &mut forwarders) {
            break e;
        }
    };

    for forwarder in forwarders.into_values() {
        forwarder.abort();
    }
    writer_task.abort();

    match error {
        RelayError::Frame(FrameError::Io(e)) if e.kind() == io::ErrorKind::UnexpectedEof => {
            tracing::info!(%peer, "peer disconnected");
        },
        e => tracing::warn!(%peer, error = %e, "peer dropped"),
    }
}

fn handle_frame(
    frame: RelayFrame,
    store: &MemorySyncEngine,
    outbound: &mpsc::UnboundedSender<RelayFrame>,
    forwarders: &mut HashMap<NamespacePath, JoinHandle<()>>,
) -> Result<(), RelayError> {
    match frame {
        RelayFrame::Subscribe { path: raw } => {
            let Some(path) = NamespacePath::parse(&raw) else {
                tracing::debug!(path = %raw, "subscribe outside the chat graph ignored");
                return Ok(());
            };
            if forwarders.contains_key(&path) {
                return Ok(());
            }
            if forwarders.len() >= MAX_SUBSCRIPTIONS_PER_PEER {
                tracing::warn!(path = %path, "subscription limit reached");
                return Ok(());
            }

            let subscription = store.subscribe(&path)?;
            tracing::debug!(path = %path, "peer subscribed");
            let forwarder = tokio::spawn(forward(path.clone(), subscription, outbound.clone()));
            forwarders.insert(path, forwarder);
        },
        RelayFrame::Put { path: raw, id, value } => {
            let Some(path) = NamespacePath::parse(&raw) else {
                tracing::debug!(path = %raw, "item outside the chat graph ignored");
                return Ok(());
            };
            store.ingest(&path, SyncItem { id: ItemId::new(id), value })?;
        },
    }
    Ok(())
}

/// Stream one namespace to one connection.
async fn forward(
    path: NamespacePath,
    mut subscription: Subscription,
    outbound: mpsc::UnboundedSender<RelayFrame>,
) {
    while let Some(item) = subscription.recv().await {
        let frame =
            RelayFrame::Put { path: path.to_string(), id: item.id.to_string(), value: item.value };
        if outbound.send(frame).is_err() {
            break;
        }
    }
}
