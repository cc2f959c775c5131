//! Namespace paths in the shared sync graph.
//!
//! A namespace path is the key under which a group's messages live. It is a
//! pure function of user input: two clients land in the same mailbox iff
//! they derive the same path.
//!
//! # Restricted rooms
//!
//! `military-terminal-chat/<room>`. The path is discoverable by anyone who
//! knows the room id; confidentiality comes from sealing payloads with the
//! shared key.
//!
//! # Sectors
//!
//! `terminal-chat-v2/<sector>_<key>`. Both fields are part of the topology,
//! compared case-sensitively with no normalization. Distinct (sector, key)
//! pairs never collide as long as neither field contains the separator.

/// Root segment for restricted rooms.
pub const RESTRICTED_ROOT: &str = "military-terminal-chat";

/// Root segment for sectors.
pub const SECTOR_ROOT: &str = "terminal-chat-v2";

/// Separator between sector and key in a sector path.
pub const SECTOR_SEPARATOR: char = '_';

/// Separator between graph segments.
const SEGMENT_SEPARATOR: char = '/';

/// Key of a shared mailbox in the sync engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NamespacePath(String);

impl NamespacePath {
    /// Path for a restricted room.
    pub fn restricted(room: &str) -> Self {
        Self(format!("{RESTRICTED_ROOT}{SEGMENT_SEPARATOR}{room}"))
    }

    /// Path for a sector, derived from sector and key.
    pub fn sector(sector: &str, key: &str) -> Self {
        Self(format!("{SECTOR_ROOT}{SEGMENT_SEPARATOR}{sector}{SECTOR_SEPARATOR}{key}"))
    }

    /// Path received from a relay or a peer.
    ///
    /// Accepts only the two known roots followed by a non-empty mailbox
    /// segment. `None` for anything else, so a relay cannot make a client
    /// create namespaces outside the chat graph.
    pub fn parse(raw: &str) -> Option<Self> {
        let (root, mailbox) = raw.split_once(SEGMENT_SEPARATOR)?;
        let known = root == RESTRICTED_ROOT || root == SECTOR_ROOT;
        (known && !mailbox.is_empty()).then(|| Self(raw.to_string()))
    }

    /// Full path string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Root segment followed by the mailbox segment.
    ///
    /// Graph engines resolve the path by chaining one lookup per segment.
    /// Only the first separator splits: a room or sector containing `/` stays
    /// a single mailbox segment.
    pub fn segments(&self) -> (&str, &str) {
        self.0.split_once(SEGMENT_SEPARATOR).unwrap_or((self.0.as_str(), ""))
    }
}

impl std::fmt::Display for NamespacePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
