//! Sync engine errors.

use thiserror::Error;

/// Errors from a sync engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Engine state lock was poisoned by a panicking holder.
    #[error("sync engine state poisoned")]
    Poisoned,

    /// Subscription channel has no sender left.
    #[error("subscription closed")]
    Closed,

    /// Relay address cannot be dialled.
    #[error("invalid relay '{addr}': {reason}")]
    InvalidRelay {
        /// Address as configured.
        addr: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// Relay links need a Tokio runtime to run on.
    #[error("relay links need a running Tokio runtime")]
    NoRuntime,

    /// OS randomness for the replica id was unavailable.
    #[error("no entropy for replica id")]
    Entropy,
}
