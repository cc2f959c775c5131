//! Chat profiles.
//!
//! A profile bundles the policy choices that distinguish the two supported
//! room flavours. Everything downstream (gate, pipelines, rendering) reads
//! its behaviour from the profile instead of branching on ad-hoc flags.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How payloads are protected before they reach the sync engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadProtection {
    /// Records are sealed with the session key.
    Sealed,
    /// Records are written as plain CBOR.
    Plain,
}

/// How the transcript orders accepted messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptOrder {
    /// Display in the order the sync engine delivered them.
    Arrival,
    /// Display by record timestamp, ties in arrival order.
    Chronological,
}

/// Room flavour selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatProfile {
    /// Fixed room id plus an allow-list of (username, key) pairs. Payloads
    /// are sealed, so the key is the real boundary.
    #[default]
    Restricted,
    /// Any non-empty (username, sector, key) triple. Sector and key together
    /// pick an isolated namespace; payloads are plain.
    Sector,
}

impl ChatProfile {
    /// Payload protection applied by the outbound pipeline.
    pub fn protection(self) -> PayloadProtection {
        match self {
            Self::Restricted => PayloadProtection::Sealed,
            Self::Sector => PayloadProtection::Plain,
        }
    }

    /// Ordering used by the transcript.
    pub fn order(self) -> TranscriptOrder {
        match self {
            Self::Restricted => TranscriptOrder::Arrival,
            Self::Sector => TranscriptOrder::Chronological,
        }
    }

    /// Simulated verification delay between admission and session start.
    pub fn login_delay(self) -> Duration {
        match self {
            Self::Restricted => Duration::from_secs(2),
            Self::Sector => Duration::from_secs(1),
        }
    }

    /// Label for the room field on the login form.
    pub fn room_label(self) -> &'static str {
        match self {
            Self::Restricted => "ROOM ID",
            Self::Sector => "SECTOR",
        }
    }
}

impl std::fmt::Display for ChatProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Restricted => f.write_str("restricted"),
            Self::Sector => f.write_str("sector"),
        }
    }
}

impl std::str::FromStr for ChatProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "restricted" => Ok(Self::Restricted),
            "sector" => Ok(Self::Sector),
            other => Err(format!("unknown profile '{other}' (expected restricted or sector)")),
        }
    }
}
