//! Errors for sealed payload handling.

use thiserror::Error;

/// Errors produced while opening a sealed payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CipherError {
    /// The envelope could not be parsed (truncated, unknown version).
    #[error("malformed sealed payload: {reason}")]
    Malformed {
        /// What was wrong with the envelope.
        reason: String,
    },

    /// Authentication failed: wrong passphrase or tampered ciphertext.
    #[error("decryption failed: {reason}")]
    DecryptionFailed {
        /// Failure detail.
        reason: String,
    },
}
