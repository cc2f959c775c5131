//! Fuzz target for sealed payload parsing and opening
//!
//! # Invariants
//!
//! - Arbitrary envelopes parse or fail with an error
//! - Opening with any passphrase fails cleanly unless the tag verifies
//! - A payload sealed under a passphrase always opens under it
//! - NEVER panic

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sector_crypto::{SEAL_RANDOM_SIZE, SealedPayload, open, seal};

#[derive(Debug, Arbitrary)]
enum Input {
    Envelope { bytes: Vec<u8>, passphrase: Vec<u8> },
    RoundTrip { plaintext: Vec<u8>, passphrase: Vec<u8>, random: [u8; SEAL_RANDOM_SIZE] },
    Tamper { plaintext: Vec<u8>, random: [u8; SEAL_RANDOM_SIZE], flip: u16 },
}

fuzz_target!(|input: Input| {
    match input {
        Input::Envelope { bytes, passphrase } => {
            if let Ok(sealed) = SealedPayload::from_bytes(&bytes) {
                let _ = open(&sealed, &passphrase);
            }
        }

        Input::RoundTrip { plaintext, passphrase, random } => {
            let sealed = seal(&plaintext, &passphrase, random);
            let parsed =
                SealedPayload::from_bytes(&sealed.to_bytes()).expect("own envelope parses");
            assert_eq!(open(&parsed, &passphrase).expect("same passphrase opens"), plaintext);
        }

        Input::Tamper { plaintext, random, flip } => {
            let mut bytes = seal(&plaintext, b"key", random).to_bytes();
            let index = usize::from(flip) % bytes.len();
            bytes[index] ^= 0x01;
            if let Ok(sealed) = SealedPayload::from_bytes(&bytes) {
                assert!(open(&sealed, b"key").is_err(), "tampered byte {index} still opened");
            }
        }
    }
});
