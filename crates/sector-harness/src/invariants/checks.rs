//! Transcript checks: one render per id, timestamp order, convergence.

use std::collections::{HashMap, HashSet};

use sector_core::{ChatProfile, NamespacePath};

use super::{ClientSnapshot, Invariant, InvariantResult, SystemSnapshot, Violation};

/// No item is displayed twice.
///
/// Re-delivery of history and duplicate notifications from the sync engine
/// must collapse to a single transcript line per item id.
pub struct UniqueMessageIds;

impl Invariant for UniqueMessageIds {
    fn name(&self) -> &'static str {
        "unique_message_ids"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for client in &state.clients {
            let mut seen = HashSet::new();
            for line in &client.lines {
                if !seen.insert(&line.id) {
                    return Err(Violation {
                        invariant: self.name(),
                        message: format!("client {}: item {} displayed twice", client.id, line.id),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Sector transcripts are sorted by author timestamp.
///
/// Restricted transcripts keep arrival order and are not checked.
pub struct ChronologicalTranscript;

impl Invariant for ChronologicalTranscript {
    fn name(&self) -> &'static str {
        "chronological_transcript"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        for client in state.clients.iter().filter(|c| c.profile == ChatProfile::Sector) {
            for window in client.lines.windows(2) {
                if window[1].timestamp < window[0].timestamp {
                    return Err(Violation {
                        invariant: self.name(),
                        message: format!(
                            "client {}: item {} at {} shown after item {} at {}",
                            client.id,
                            window[1].id,
                            window[1].timestamp,
                            window[0].id,
                            window[0].timestamp
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Participants bound to the same namespace show the same transcript.
///
/// Only meaningful once every subscription is drained. Participants in a
/// restricted room with different keys see different subsets, so only the
/// sector profile (where the path covers the key) is compared.
pub struct TranscriptConvergence;

impl Invariant for TranscriptConvergence {
    fn name(&self) -> &'static str {
        "transcript_convergence"
    }

    fn check(&self, state: &SystemSnapshot) -> InvariantResult {
        let mut by_path: HashMap<&NamespacePath, Vec<&ClientSnapshot>> = HashMap::new();
        for client in state.clients.iter().filter(|c| c.profile == ChatProfile::Sector) {
            if let Some(path) = &client.path {
                by_path.entry(path).or_default().push(client);
            }
        }

        for (path, clients) in by_path {
            let Some((first, rest)) = clients.split_first() else {
                continue;
            };
            let expected = first.ids();
            for client in rest {
                if client.ids() != expected {
                    return Err(Violation {
                        invariant: self.name(),
                        message: format!(
                            "{path}: client {} shows {:?}, client {} shows {:?}",
                            first.id,
                            expected,
                            client.id,
                            client.ids()
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}
