//! Payload key derivation using HKDF

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroize;

/// Label used for payload key derivation
const PAYLOAD_KEY_LABEL: &[u8] = b"sectorPayloadV1";

/// Size of the per-payload salt (16 bytes)
pub const SALT_SIZE: usize = 16;

/// A one-time key for a single sealed payload.
///
/// Key material is zeroized on drop.
pub struct PayloadKey {
    key: [u8; 32],
}

impl PayloadKey {
    /// 32-byte symmetric key for XChaCha20-Poly1305 AEAD.
    pub fn key(&self) -> &[u8; 32] {
        &self.key
    }
}

impl Drop for PayloadKey {
    fn drop(&mut self) {
        self.key.zeroize();
    }
}

impl std::fmt::Debug for PayloadKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PayloadKey(..)")
    }
}

/// Derive the payload key for a passphrase and salt.
///
/// Deterministic: the same passphrase and salt always produce the same key,
/// which is what lets every holder of the passphrase open the payload.
pub fn derive_payload_key(passphrase: &[u8], salt: &[u8; SALT_SIZE]) -> PayloadKey {
    let hkdf = Hkdf::<Sha256>::new(Some(salt.as_slice()), passphrase);

    let mut key = [0u8; 32];
    let Ok(()) = hkdf.expand(PAYLOAD_KEY_LABEL, &mut key) else {
        unreachable!("32 bytes is a valid HKDF-SHA256 output length");
    };

    PayloadKey { key }
}
