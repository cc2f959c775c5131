//! Error types for sector chat core.
//!
//! Strongly-typed errors for the credential gate and message records. Gate
//! errors carry the exact status text shown to the user; record errors are
//! only ever logged, since a malformed record is silently dropped.

use thiserror::Error;

/// Why a restricted-room login was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialReason {
    /// Room id does not match the configured room.
    InvalidRoom,
    /// (username, key) is not on the allow-list.
    InvalidIdentity,
}

impl DenialReason {
    /// Alert text shown on the login screen.
    pub fn message(self) -> &'static str {
        match self {
            Self::InvalidRoom => "ACCESS DENIED: RESTRICTED SECTOR ID. (INVALID ROOM)",
            Self::InvalidIdentity => "ACCESS DENIED: INVALID IDENTITY TAG OR DECRYPTION KEY.",
        }
    }
}

/// Errors returned by the credential gate. No state changes on either.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GateError {
    /// Credentials were checked and refused.
    #[error("{}", .0.message())]
    AccessDenied(DenialReason),

    /// A required field was empty after trimming.
    #[error("ERROR: ALL FIELDS MANDATORY")]
    ValidationError {
        /// First empty field.
        field: &'static str,
    },
}

/// Errors from encoding, decoding, or validating a message record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// CBOR encoding failed.
    #[error("record encode failed: {reason}")]
    Encode {
        /// Encoder error.
        reason: String,
    },

    /// Bytes are not a CBOR record.
    #[error("record decode failed: {reason}")]
    Decode {
        /// Decoder error.
        reason: String,
    },

    /// A required field is missing or empty.
    #[error("malformed record: missing {field}")]
    Malformed {
        /// Name of the offending field.
        field: &'static str,
    },
}
