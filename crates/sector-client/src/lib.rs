//! Client
//!
//! Action-based session client for sector chat. Owns the per-session state
//! (rendered ids, transcript) and runs both message pipelines.
//!
//! # Architecture
//!
//! Sans-IO: the caller feeds [`ClientEvent`]s and executes the returned
//! [`ClientAction`]s. The client never talks to the sync engine itself, so
//! the same code runs under the terminal driver and the simulation harness.
//!
//! ```text
//!   SyncItem ──► ItemDelivered ──► dedup ─► open/validate ─► Transcript ──► Deliver
//!                                    │            │
//!                                    └────────────┴──► Dropped
//!
//!   input ─────► SendMessage ─────► build record ─► seal? ─────────────► Append
//! ```
//!
//! # Components
//!
//! - [`Client`]: session state machine
//! - [`Transcript`]: ordered index of accepted messages
//! - [`ClientEvent`] / [`ClientAction`]: the event/action vocabulary

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod client;
mod error;
mod event;
mod transcript;

pub use client::Client;
pub use error::ClientError;
pub use event::{ClientAction, ClientEvent, DeliveredMessage, DropReason};
pub use sector_core::env::Environment;
pub use transcript::{Transcript, TranscriptEntry};
