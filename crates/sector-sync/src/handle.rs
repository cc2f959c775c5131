//! Engine selection.

use sector_core::NamespacePath;

use crate::{
    ItemId, MemorySyncEngine, RelayAddr, RelaySyncEngine, Subscription, SyncEngine, SyncError,
};

/// Engine chosen by [`connect`].
#[derive(Clone)]
pub enum EngineHandle {
    /// No relays configured; only this process sees the namespaces.
    Memory(MemorySyncEngine),
    /// Replicated through relays.
    Relay(RelaySyncEngine),
}

impl EngineHandle {
    /// Whether writes leave this process.
    pub fn is_networked(&self) -> bool {
        matches!(self, Self::Relay(_))
    }
}

/// Open an engine for the given relays.
///
/// An empty list yields an in-process [`MemorySyncEngine`]. Otherwise every
/// address is validated up front and a [`RelaySyncEngine`] starts dialling
/// them on the current Tokio runtime.
pub fn connect(relays: &[String]) -> Result<EngineHandle, SyncError> {
    if relays.is_empty() {
        tracing::info!("no relays configured, namespaces stay in this process");
        return Ok(EngineHandle::Memory(MemorySyncEngine::new()));
    }

    let addrs = relays.iter().map(|raw| RelayAddr::parse(raw)).collect::<Result<Vec<_>, _>>()?;
    Ok(EngineHandle::Relay(RelaySyncEngine::start(addrs)?))
}

impl SyncEngine for EngineHandle {
    fn subscribe(&self, path: &NamespacePath) -> Result<Subscription, SyncError> {
        match self {
            Self::Memory(engine) => engine.subscribe(path),
            Self::Relay(engine) => engine.subscribe(path),
        }
    }

    fn append(&self, path: &NamespacePath, value: Vec<u8>) -> Result<ItemId, SyncError> {
        match self {
            Self::Memory(engine) => engine.append(path, value),
            Self::Relay(engine) => engine.append(path, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_relays_means_in_process() {
        let engine = connect(&[]).unwrap();
        assert!(matches!(engine, EngineHandle::Memory(_)));
        assert!(!engine.is_networked());
    }

    #[test]
    fn bad_relay_is_rejected_before_dialling() {
        let relays = vec!["127.0.0.1:9".to_string(), "ws://relay".to_string()];
        assert!(matches!(connect(&relays), Err(SyncError::InvalidRelay { .. })));
    }

    #[tokio::test]
    async fn relays_mean_networked() {
        let engine = connect(&["127.0.0.1:9".to_string()]).unwrap();
        assert!(engine.is_networked());
    }
}
