//! What each participant has on screen.
//!
//! Only ids and timestamps are kept. Text and styling play no part in the
//! transcript invariants.

use sector_app::{App, ChatLine};
use sector_core::{ChatProfile, NamespacePath};
use sector_sync::ItemId;

/// Snapshot of every participant.
#[derive(Debug, Clone, Default)]
pub struct SystemSnapshot {
    /// One entry per participant.
    pub clients: Vec<ClientSnapshot>,
}

impl SystemSnapshot {
    /// No participants.
    pub fn empty() -> Self {
        Self::default()
    }

    /// One participant.
    pub fn single(client: ClientSnapshot) -> Self {
        Self { clients: vec![client] }
    }

    /// Several participants, usually sharing one engine.
    pub fn from_clients(clients: Vec<ClientSnapshot>) -> Self {
        Self { clients }
    }
}

/// Snapshot of one participant's observable state.
#[derive(Debug, Clone)]
pub struct ClientSnapshot {
    /// Participant identifier, chosen by the test.
    pub id: u64,
    /// Profile the participant runs.
    pub profile: ChatProfile,
    /// Namespace the participant is bound to. `None` before the chat opens.
    pub path: Option<NamespacePath>,
    /// Transcript lines in display order.
    pub lines: Vec<LineSnapshot>,
}

impl ClientSnapshot {
    /// Create a snapshot with no binding and no lines.
    pub fn new(id: u64, profile: ChatProfile) -> Self {
        Self { id, profile, path: None, lines: Vec::new() }
    }

    /// Extract the observable state of an App.
    ///
    /// The App does not know its namespace path, so the caller supplies the
    /// one its driver bound.
    pub fn from_app(id: u64, app: &App, path: Option<NamespacePath>) -> Self {
        let lines = app
            .chat()
            .map(|chat| chat.lines.iter().map(LineSnapshot::from).collect())
            .unwrap_or_default();
        Self { id, profile: app.profile(), path, lines }
    }

    /// Set the bound namespace.
    #[must_use]
    pub fn with_path(mut self, path: NamespacePath) -> Self {
        self.path = Some(path);
        self
    }

    /// Append a transcript line.
    #[must_use]
    pub fn with_line(mut self, line: LineSnapshot) -> Self {
        self.lines.push(line);
        self
    }

    /// Item ids in display order.
    pub fn ids(&self) -> Vec<&ItemId> {
        self.lines.iter().map(|line| &line.id).collect()
    }
}

/// One transcript line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSnapshot {
    /// Engine item id.
    pub id: ItemId,
    /// Author's timestamp in milliseconds.
    pub timestamp: u64,
}

impl LineSnapshot {
    /// Line with the given id and timestamp.
    pub fn new(id: impl Into<String>, timestamp: u64) -> Self {
        Self { id: ItemId::new(id), timestamp }
    }
}

impl From<&ChatLine> for LineSnapshot {
    fn from(line: &ChatLine) -> Self {
        Self { id: line.id.clone(), timestamp: line.timestamp }
    }
}
