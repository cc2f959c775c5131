//! Fuzz target for hostile CBOR in message records
//!
//! # Strategy
//!
//! - Deeply nested: arrays/maps nested to arbitrary depth (stack overflow)
//! - Huge lengths: CBOR claiming massive byte/string/array lengths (memory)
//! - Type confusion: record fields carrying the wrong CBOR type
//! - Duplicate keys: maps repeating a record field
//!
//! # Invariants
//!
//! - Decoding completes quickly and never allocates the claimed length
//! - Every hostile input is rejected with an error
//! - NEVER panic

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sector_core::MessageRecord;

#[derive(Debug, Clone, Arbitrary)]
enum CborAttack {
    DeeplyNested { depth: u8, map: bool },
    HugeLength { claimed_len_exponent: u8 },
    TypeConfusion { field: Field, bytes: Vec<u8> },
    DuplicateKeys { count: u8 },
}

#[derive(Debug, Clone, Copy, Arbitrary)]
enum Field {
    User,
    Text,
    Timestamp,
}

impl Field {
    fn name(self) -> &'static [u8] {
        match self {
            Self::User => b"user",
            Self::Text => b"text",
            Self::Timestamp => b"timestamp",
        }
    }
}

fuzz_target!(|attack: CborAttack| {
    match attack {
        CborAttack::DeeplyNested { depth, map } => {
            let depth = usize::from(depth % 50);
            let mut bytes = Vec::new();
            for _ in 0..depth {
                if map {
                    bytes.extend_from_slice(&[0xA1, 0x61, b'a']);
                } else {
                    bytes.push(0x81);
                }
            }
            bytes.push(0x01);
            assert!(MessageRecord::decode(&bytes).is_err());
        }

        CborAttack::HugeLength { claimed_len_exponent } => {
            let exponent = u32::from(claimed_len_exponent % 21);
            let claimed = if exponent < 20 { 1u32 << exponent } else { u32::MAX };

            for major in [0x5A, 0x7A, 0x9A] {
                let mut bytes = vec![major];
                bytes.extend_from_slice(&claimed.to_be_bytes());
                assert!(MessageRecord::decode(&bytes).is_err());
            }

            // A map whose text field claims the huge length.
            let mut bytes = vec![0xA1, 0x64];
            bytes.extend_from_slice(b"text");
            bytes.push(0x7A);
            bytes.extend_from_slice(&claimed.to_be_bytes());
            assert!(MessageRecord::decode(&bytes).is_err());
        }

        CborAttack::TypeConfusion { field, bytes } => {
            let name = field.name();
            let mut cbor = vec![0xA1, 0x60 | name.len() as u8];
            cbor.extend_from_slice(name);
            cbor.extend_from_slice(&bytes);
            let _ = MessageRecord::decode(&cbor);
        }

        CborAttack::DuplicateKeys { count } => {
            let count = (count % 10).max(2);
            let mut bytes = vec![0xA0 | count];
            for _ in 0..count {
                bytes.push(0x64);
                bytes.extend_from_slice(b"user");
                bytes.extend_from_slice(&[0x61, b'x']);
            }
            let _ = MessageRecord::decode(&bytes);
        }
    }
});
