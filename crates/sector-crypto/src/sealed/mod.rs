//! Sealed payloads keyed by a shared passphrase.
//!
//! - [`derivation`]: per-payload key derivation from passphrase and salt
//! - [`encryption`]: AEAD sealing and the on-wire envelope

mod derivation;
mod encryption;
mod error;

pub use derivation::{PayloadKey, SALT_SIZE, derive_payload_key};
pub use encryption::{NONCE_SIZE, SEAL_RANDOM_SIZE, SealedPayload, open, seal};
pub use error::CipherError;
