//! Sector Cryptographic Primitives
//!
//! Passphrase-keyed sealing for chat payloads. Pure functions with
//! deterministic outputs. Callers provide random bytes for deterministic
//! testing.
//!
//! # Key Lifecycle
//!
//! Every room member holds the same shared passphrase. Each sealed payload
//! carries its own random salt, from which a one-time payload key is derived.
//! The payload key is used for exactly one AEAD operation and is zeroized when
//! dropped.
//!
//! ```text
//! Shared Passphrase + Random Salt
//!        │
//!        ▼
//! HKDF-SHA256 → Payload Key (per payload)
//!        │
//!        ▼
//! XChaCha20-Poly1305 → Sealed Payload
//! ```
//!
//! # Security
//!
//! Authenticity:
//! - XChaCha20-Poly1305 AEAD provides tamper-proof encryption
//! - Wrong passphrase -> wrong payload key -> tag mismatch -> reject payload
//!
//! Limits:
//! - HKDF is not a password hashing function. A low-entropy passphrase can be
//!   brute-forced offline by anyone who observes a sealed payload.
//! - There is no key exchange or rotation; the passphrase is the only secret.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod sealed;

pub use sealed::{
    CipherError, NONCE_SIZE, PayloadKey, SALT_SIZE, SEAL_RANDOM_SIZE, SealedPayload,
    derive_payload_key, open, seal,
};
