//! Payload sealing using `XChaCha20-Poly1305`
//!
//! All functions are pure - random bytes must be provided by the caller.
//! This enables deterministic testing and keeps the client Sans-IO.

use chacha20poly1305::{
    XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit},
};

use super::{
    derivation::{SALT_SIZE, derive_payload_key},
    error::CipherError,
};

/// Size of the `XChaCha20` nonce (24 bytes)
pub const NONCE_SIZE: usize = 24;

/// Random bytes consumed by one [`seal`] call: salt followed by nonce.
pub const SEAL_RANDOM_SIZE: usize = SALT_SIZE + NONCE_SIZE;

/// Poly1305 tag size (16 bytes)
const POLY1305_TAG_SIZE: usize = 16;

/// Envelope format version
const ENVELOPE_VERSION: u8 = 1;

/// Envelope header: version (1) + salt (16) + nonce (24)
const HEADER_SIZE: usize = 1 + SALT_SIZE + NONCE_SIZE;

/// A sealed payload with everything a passphrase holder needs to open it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedPayload {
    /// Salt for payload key derivation
    pub salt: [u8; SALT_SIZE],
    /// The 24-byte `XChaCha20` nonce
    pub nonce: [u8; NONCE_SIZE],
    /// The ciphertext including 16-byte Poly1305 tag
    pub ciphertext: Vec<u8>,
}

impl SealedPayload {
    /// Plaintext length (ciphertext length minus authentication tag).
    pub fn plaintext_len(&self) -> usize {
        self.ciphertext.len().saturating_sub(POLY1305_TAG_SIZE)
    }

    /// Encode as `version || salt || nonce || ciphertext`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_SIZE + self.ciphertext.len());
        out.push(ENVELOPE_VERSION);
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Parse an envelope produced by [`SealedPayload::to_bytes`].
    ///
    /// # Errors
    ///
    /// - `Malformed`: truncated envelope, unknown version, or missing tag
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CipherError> {
        let Some((&version, rest)) = bytes.split_first() else {
            return Err(CipherError::Malformed { reason: "empty envelope".to_string() });
        };

        if version != ENVELOPE_VERSION {
            return Err(CipherError::Malformed {
                reason: format!("unsupported envelope version {version}"),
            });
        }

        if rest.len() < SALT_SIZE + NONCE_SIZE + POLY1305_TAG_SIZE {
            return Err(CipherError::Malformed {
                reason: format!("envelope too short: {} bytes", bytes.len()),
            });
        }

        let (salt_bytes, rest) = rest.split_at(SALT_SIZE);
        let (nonce_bytes, ciphertext) = rest.split_at(NONCE_SIZE);

        let mut salt = [0u8; SALT_SIZE];
        salt.copy_from_slice(salt_bytes);
        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(nonce_bytes);

        Ok(Self { salt, nonce, ciphertext: ciphertext.to_vec() })
    }
}

/// Seal a payload under a shared passphrase.
///
/// `random` supplies the salt (first [`SALT_SIZE`] bytes) and the nonce (last
/// [`NONCE_SIZE`] bytes). Caller MUST provide cryptographically secure random
/// bytes in production.
pub fn seal(plaintext: &[u8], passphrase: &[u8], random: [u8; SEAL_RANDOM_SIZE]) -> SealedPayload {
    let mut salt = [0u8; SALT_SIZE];
    salt.copy_from_slice(&random[..SALT_SIZE]);
    let mut nonce = [0u8; NONCE_SIZE];
    nonce.copy_from_slice(&random[SALT_SIZE..]);

    let payload_key = derive_payload_key(passphrase, &salt);
    let cipher = XChaCha20Poly1305::new(payload_key.key().into());

    let Ok(ciphertext) = cipher.encrypt(XNonce::from_slice(&nonce), plaintext) else {
        unreachable!("XChaCha20-Poly1305 encryption cannot fail with valid inputs");
    };

    SealedPayload { salt, nonce, ciphertext }
}

/// Open a sealed payload with a shared passphrase.
///
/// # Errors
///
/// - `DecryptionFailed`: wrong passphrase or tampered ciphertext
pub fn open(sealed: &SealedPayload, passphrase: &[u8]) -> Result<Vec<u8>, CipherError> {
    let payload_key = derive_payload_key(passphrase, &sealed.salt);
    let cipher = XChaCha20Poly1305::new(payload_key.key().into());

    cipher.decrypt(XNonce::from_slice(&sealed.nonce), sealed.ciphertext.as_slice()).map_err(|_| {
        CipherError::DecryptionFailed { reason: "authentication failed".to_string() }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn random(fill: u8) -> [u8; SEAL_RANDOM_SIZE] {
        let mut bytes = [0u8; SEAL_RANDOM_SIZE];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = fill.wrapping_add(i as u8);
        }
        bytes
    }

    #[test]
    fn seal_open_roundtrip() {
        let sealed = seal(b"Hello, sector!", b"123", random(0));
        let opened = open(&sealed, b"123").unwrap();
        assert_eq!(opened, b"Hello, sector!");
    }

    #[test]
    fn seal_open_empty_payload() {
        let sealed = seal(b"", b"123", random(1));
        assert_eq!(open(&sealed, b"123").unwrap(), b"");
    }

    #[test]
    fn wrong_passphrase_fails() {
        let sealed = seal(b"secret message", b"123", random(2));
        let result = open(&sealed, b"1234");

        assert!(matches!(
            result,
            Err(CipherError::DecryptionFailed { reason }) if reason.contains("authentication")
        ));
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let mut sealed = seal(b"original message", b"123", random(3));
        sealed.ciphertext[0] ^= 0xFF;
        assert!(open(&sealed, b"123").is_err());
    }

    #[test]
    fn tampered_salt_fails() {
        let mut sealed = seal(b"original message", b"123", random(4));
        sealed.salt[0] ^= 0x01;
        assert!(open(&sealed, b"123").is_err());
    }

    #[test]
    fn ciphertext_is_plaintext_plus_tag() {
        let sealed = seal(b"test message", b"k", random(5));
        assert_eq!(sealed.ciphertext.len(), b"test message".len() + POLY1305_TAG_SIZE);
        assert_eq!(sealed.plaintext_len(), b"test message".len());
    }

    #[test]
    fn different_random_produces_different_ciphertexts() {
        let a = seal(b"test", b"k", random(0));
        let b = seal(b"test", b"k", random(9));
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn envelope_bytes_roundtrip() {
        let sealed = seal(b"payload", b"k", random(6));
        let parsed = SealedPayload::from_bytes(&sealed.to_bytes()).unwrap();
        assert_eq!(parsed, sealed);
        assert_eq!(open(&parsed, b"k").unwrap(), b"payload");
    }

    #[test]
    fn envelope_layout() {
        let sealed = seal(b"x", b"k", random(0));
        let bytes = sealed.to_bytes();

        assert_eq!(bytes[0], ENVELOPE_VERSION);
        assert_eq!(&bytes[1..=SALT_SIZE], &sealed.salt);
        assert_eq!(&bytes[1 + SALT_SIZE..HEADER_SIZE], &sealed.nonce);
        assert_eq!(&bytes[HEADER_SIZE..], sealed.ciphertext.as_slice());
    }

    #[test]
    fn empty_envelope_is_malformed() {
        assert!(matches!(SealedPayload::from_bytes(&[]), Err(CipherError::Malformed { .. })));
    }

    #[test]
    fn unknown_version_is_malformed() {
        let mut bytes = seal(b"x", b"k", random(0)).to_bytes();
        bytes[0] = 9;
        assert!(matches!(
            SealedPayload::from_bytes(&bytes),
            Err(CipherError::Malformed { reason }) if reason.contains("version")
        ));
    }

    #[test]
    fn truncated_envelope_is_malformed() {
        let bytes = seal(b"x", b"k", random(0)).to_bytes();
        let truncated = &bytes[..HEADER_SIZE + 4];
        assert!(matches!(SealedPayload::from_bytes(truncated), Err(CipherError::Malformed { .. })));
    }
}
