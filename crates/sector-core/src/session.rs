//! Session context.
//!
//! A [`SessionContext`] is created by the credential gate on admission and
//! handed to whoever runs the session. It is a plain value: there is no
//! process-wide session state, and dropping the context ends the session.

use zeroize::Zeroizing;

use crate::{ChatProfile, NamespacePath};

/// Shared passphrase held for the lifetime of a session.
///
/// Zeroized on drop and redacted from `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionKey(Zeroizing<String>);

impl SessionKey {
    /// Wrap a passphrase.
    pub fn new(key: impl Into<String>) -> Self {
        Self(Zeroizing::new(key.into()))
    }

    /// Passphrase bytes for sealing and opening payloads.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Passphrase as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionKey(..)")
    }
}

/// Everything a running session needs to know about itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    username: String,
    room: String,
    key: SessionKey,
    path: NamespacePath,
    profile: ChatProfile,
}

impl SessionContext {
    /// Build a session context.
    ///
    /// Normally produced by [`crate::Gate::admit`]; constructing one directly
    /// skips the gate entirely, the same way calling the initializer by hand
    /// would.
    pub fn new(
        username: impl Into<String>,
        room: impl Into<String>,
        key: SessionKey,
        path: NamespacePath,
        profile: ChatProfile,
    ) -> Self {
        Self { username: username.into(), room: room.into(), key, path, profile }
    }

    /// Viewer's display identity.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Room id or sector name, as shown in the header.
    pub fn room(&self) -> &str {
        &self.room
    }

    /// Shared passphrase.
    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    /// Namespace bound by this session.
    pub fn path(&self) -> &NamespacePath {
        &self.path
    }

    /// Profile the session runs under.
    pub fn profile(&self) -> ChatProfile {
        self.profile
    }
}
