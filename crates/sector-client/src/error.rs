//! Client errors.
//!
//! Inbound problems are not errors: a payload that fails to open or decode
//! is reported as [`crate::ClientAction::Dropped`]. Errors are reserved for
//! the client's own output.

use sector_core::RecordError;
use thiserror::Error;

/// Errors from the session client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Outgoing record could not be built or encoded.
    #[error("record error: {0}")]
    Record(#[from] RecordError),
}
