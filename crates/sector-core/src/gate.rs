//! Credential gate.
//!
//! Pure policy over an injected [`CredentialVerifier`]: the gate decides
//! which checks apply for the profile, the verifier decides whether an
//! identity is known. Neither is a real authentication backend; anyone who
//! builds a [`SessionContext`] by hand bypasses the gate.
//!
//! # Restricted profile
//!
//! 1. Room must equal the configured room id, else `InvalidRoom`.
//! 2. The verifier must accept (username, key, room), else `InvalidIdentity`.
//!
//! # Sector profile
//!
//! Username, sector and key must all be non-empty after trimming. Any such
//! triple is admitted.

use std::{sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use crate::{
    Accent, AccentMap, ChatProfile, DenialReason, GateError, NamespacePath, SessionContext,
    SessionKey,
};

/// Capability that knows which identities may enter a room.
pub trait CredentialVerifier: Send + Sync {
    /// True if `identity` holding `secret` may enter `room`.
    fn verify(&self, identity: &str, secret: &str, room: &str) -> bool;
}

/// One allow-listed identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedUser {
    /// Exact username.
    pub username: String,
    /// Shared key this user logs in with.
    pub key: String,
    /// Optional display accent.
    #[serde(default)]
    pub accent: Option<Accent>,
}

impl AllowedUser {
    /// Create an entry without an accent.
    pub fn new(username: impl Into<String>, key: impl Into<String>) -> Self {
        Self { username: username.into(), key: key.into(), accent: None }
    }

    /// Attach an accent.
    #[must_use]
    pub fn with_accent(mut self, accent: Accent) -> Self {
        self.accent = Some(accent);
        self
    }
}

/// Static allow-list for one restricted room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowList {
    /// Room id this list guards.
    pub room: String,
    /// Admitted identities.
    #[serde(default)]
    pub users: Vec<AllowedUser>,
}

impl AllowList {
    /// Create an allow-list for a room.
    pub fn new(room: impl Into<String>, users: Vec<AllowedUser>) -> Self {
        Self { room: room.into(), users }
    }

    /// Default room `5678` with the two stock identities.
    pub fn builtin() -> Self {
        Self::new("5678", vec![
            AllowedUser::new("rasya", "123").with_accent(Accent::Cyan),
            AllowedUser::new("PENGGUNA1", "1234").with_accent(Accent::Magenta),
        ])
    }

    /// Accents of every allow-listed user that has one.
    pub fn accents(&self) -> AccentMap {
        self.users
            .iter()
            .filter_map(|user| user.accent.map(|accent| (user.username.clone(), accent)))
            .collect()
    }
}

impl CredentialVerifier for AllowList {
    fn verify(&self, identity: &str, secret: &str, room: &str) -> bool {
        if !bool::from(room.as_bytes().ct_eq(self.room.as_bytes())) {
            return false;
        }

        // Scan every entry so timing does not reveal which one matched.
        self.users.iter().fold(false, |found, user| {
            let matches = user.username.as_bytes().ct_eq(identity.as_bytes())
                & user.key.as_bytes().ct_eq(secret.as_bytes());
            found | bool::from(matches)
        })
    }
}

/// Raw login form input, trimmed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Claimed display identity.
    pub username: String,
    /// Room id (restricted) or sector name.
    pub room: String,
    /// Shared key.
    pub key: String,
}

impl Credentials {
    /// Build from form fields, trimming surrounding whitespace.
    pub fn from_form(username: &str, room: &str, key: &str) -> Self {
        Self {
            username: username.trim().to_string(),
            room: room.trim().to_string(),
            key: key.trim().to_string(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("room", &self.room)
            .finish_non_exhaustive()
    }
}

/// Successful gate outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    /// Session to start once the delay elapses.
    pub session: SessionContext,
    /// Simulated verification delay.
    pub delay: Duration,
}

/// Credential gate for one profile.
#[derive(Clone)]
pub struct Gate {
    policy: Policy,
}

#[derive(Clone)]
enum Policy {
    Restricted { room: String, verifier: Arc<dyn CredentialVerifier> },
    Sector,
}

impl Gate {
    /// Restricted gate guarded by an allow-list.
    pub fn restricted(allow_list: AllowList) -> Self {
        let room = allow_list.room.clone();
        Self::with_verifier(room, Arc::new(allow_list))
    }

    /// Restricted gate for `room` using any verifier.
    pub fn with_verifier(room: impl Into<String>, verifier: Arc<dyn CredentialVerifier>) -> Self {
        Self { policy: Policy::Restricted { room: room.into(), verifier } }
    }

    /// Open sector gate: only non-empty fields are required.
    pub fn sector() -> Self {
        Self { policy: Policy::Sector }
    }

    /// Profile this gate admits into.
    pub fn profile(&self) -> ChatProfile {
        match self.policy {
            Policy::Restricted { .. } => ChatProfile::Restricted,
            Policy::Sector => ChatProfile::Sector,
        }
    }

    /// Check credentials and derive the session.
    ///
    /// # Errors
    ///
    /// - `AccessDenied`: restricted room mismatch or unknown identity
    /// - `ValidationError`: sector field empty after trimming
    pub fn admit(&self, credentials: &Credentials) -> Result<Admission, GateError> {
        let profile = self.profile();
        let path = match &self.policy {
            Policy::Restricted { room, verifier } => {
                if credentials.room != *room {
                    tracing::info!(room = %credentials.room, "login refused: invalid room");
                    return Err(GateError::AccessDenied(DenialReason::InvalidRoom));
                }
                if !verifier.verify(&credentials.username, &credentials.key, &credentials.room) {
                    tracing::info!(user = %credentials.username, "login refused: invalid identity");
                    return Err(GateError::AccessDenied(DenialReason::InvalidIdentity));
                }
                NamespacePath::restricted(&credentials.room)
            },
            Policy::Sector => {
                let fields = [
                    ("username", &credentials.username),
                    ("sector", &credentials.room),
                    ("key", &credentials.key),
                ];
                if let Some((field, _)) = fields.iter().find(|(_, value)| value.is_empty()) {
                    return Err(GateError::ValidationError { field: *field });
                }
                NamespacePath::sector(&credentials.room, &credentials.key)
            },
        };

        let session = SessionContext::new(
            credentials.username.clone(),
            credentials.room.clone(),
            SessionKey::new(credentials.key.clone()),
            path,
            profile,
        );

        Ok(Admission { session, delay: profile.login_delay() })
    }
}

impl std::fmt::Debug for Gate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.policy {
            Policy::Restricted { room, .. } => {
                f.debug_struct("Gate").field("profile", &"restricted").field("room", room).finish()
            },
            Policy::Sector => f.debug_struct("Gate").field("profile", &"sector").finish(),
        }
    }
}
