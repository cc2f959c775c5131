//! Message records.
//!
//! A record is what one participant writes into a namespace: who said it,
//! what they said, and when (their wall clock). Records travel as CBOR,
//! optionally sealed.

use serde::{Deserialize, Serialize};

use crate::error::RecordError;

/// A chat message as written to the sync engine.
///
/// # Invariants
///
/// - `user` and `text` are non-empty
/// - `timestamp` is non-zero (milliseconds since the Unix epoch)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Display identity of the author.
    pub user: String,
    /// Message body.
    pub text: String,
    /// Author's wall clock at send time, in milliseconds.
    pub timestamp: u64,
}

/// Wire shape with every field optional, so that missing fields surface as
/// [`RecordError::Malformed`] rather than a decode error.
#[derive(Deserialize)]
struct RawRecord {
    #[serde(default)]
    user: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    timestamp: Option<u64>,
}

impl MessageRecord {
    /// Create a record.
    pub fn new(user: impl Into<String>, text: impl Into<String>, timestamp: u64) -> Self {
        Self { user: user.into(), text: text.into(), timestamp }
    }

    /// Check the record invariants.
    ///
    /// # Errors
    ///
    /// Returns `Malformed` naming the first empty field.
    pub fn validate(&self) -> Result<(), RecordError> {
        if self.text.is_empty() {
            return Err(RecordError::Malformed { field: "text" });
        }
        if self.user.is_empty() {
            return Err(RecordError::Malformed { field: "user" });
        }
        if self.timestamp == 0 {
            return Err(RecordError::Malformed { field: "timestamp" });
        }
        Ok(())
    }

    /// Encode as CBOR.
    pub fn encode(&self) -> Result<Vec<u8>, RecordError> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf)
            .map_err(|e| RecordError::Encode { reason: e.to_string() })?;
        Ok(buf)
    }

    /// Decode from CBOR and validate.
    ///
    /// # Errors
    ///
    /// - `Decode`: bytes are not a CBOR map of the expected shape
    /// - `Malformed`: a required field is missing or empty
    pub fn decode(bytes: &[u8]) -> Result<Self, RecordError> {
        let raw: RawRecord = ciborium::from_reader(bytes)
            .map_err(|e| RecordError::Decode { reason: e.to_string() })?;

        let record = Self {
            user: raw.user.unwrap_or_default(),
            text: raw.text.unwrap_or_default(),
            timestamp: raw.timestamp.unwrap_or_default(),
        };
        record.validate()?;
        Ok(record)
    }
}
