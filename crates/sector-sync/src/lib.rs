//! Sync-engine contract for sector chat.
//!
//! A sync engine replicates append-only namespaces between peers. The chat
//! front-end needs exactly two things from it:
//!
//! - [`SyncEngine::subscribe`]: every item already in a namespace, then every
//!   item added later, each delivered at least once
//! - [`SyncEngine::append`]: add a value under a fresh engine-generated id
//!
//! Nothing here orders items across peers. Ordering is a display concern
//! handled by the client's transcript.
//!
//! [`connect`] picks the engine from the configured relays:
//!
//! - none: [`MemorySyncEngine`], shared only inside this process (also what
//!   the simulation harness runs on)
//! - one or more: [`RelaySyncEngine`], a local replica mirrored through
//!   every relay over TCP

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod engine;
mod error;
mod handle;
mod memory;
pub mod relay;

pub use engine::{ItemId, Subscription, SyncEngine, SyncItem};
pub use error::SyncError;
pub use handle::{EngineHandle, connect};
pub use memory::MemorySyncEngine;
pub use relay::{RelayAddr, RelaySyncEngine};
