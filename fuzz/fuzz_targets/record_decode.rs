//! Fuzz target for MessageRecord::decode
//!
//! Peers control every byte of a plain payload. Decoding must reject
//! garbage with an error, never a panic, and whatever decodes must survive
//! validation and re-encoding.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sector_core::MessageRecord;

fuzz_target!(|data: &[u8]| {
    if let Ok(record) = MessageRecord::decode(data) {
        let _ = record.validate();
        let _ = record.encode();
    }
});
