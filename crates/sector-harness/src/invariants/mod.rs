//! Transcript invariants.
//!
//! A participant's transcript is checked through a [`SystemSnapshot`], which
//! records for every participant the ids and timestamps of the lines on
//! screen. Two properties hold after every render:
//!
//! - one line per item id, however often the engine re-delivers it
//! - sector lines sorted by author timestamp
//!
//! A third, [`TranscriptConvergence`], holds only once every subscription has
//! been drained, so scenarios add it at the end instead of per render.

mod checks;
mod snapshot;

pub use checks::{ChronologicalTranscript, TranscriptConvergence, UniqueMessageIds};
pub use snapshot::{ClientSnapshot, LineSnapshot, SystemSnapshot};
use thiserror::Error;

/// Outcome of one check.
pub type InvariantResult = Result<(), Violation>;

/// A transcript that breaks an invariant.
#[derive(Debug, Clone, Error)]
#[error("{invariant}: {message}")]
pub struct Violation {
    /// Invariant that failed.
    pub invariant: &'static str,
    /// Which participant and which lines.
    pub message: String,
}

/// Property of the transcripts in a snapshot.
pub trait Invariant: Send + Sync {
    /// Short name used in violation reports.
    fn name(&self) -> &'static str;

    /// First offending line, if any.
    fn check(&self, state: &SystemSnapshot) -> InvariantResult;
}

/// Set of invariants checked together.
pub struct InvariantRegistry(Vec<Box<dyn Invariant>>);

impl InvariantRegistry {
    /// [`UniqueMessageIds`] and [`ChronologicalTranscript`].
    pub fn standard() -> Self {
        Self(vec![Box::new(UniqueMessageIds), Box::new(ChronologicalTranscript)])
    }

    /// Also check `invariant`.
    #[must_use]
    pub fn with<I: Invariant + 'static>(mut self, invariant: I) -> Self {
        self.0.push(Box::new(invariant));
        self
    }

    /// Every violation in `state`, one per failing invariant.
    pub fn violations(&self, state: &SystemSnapshot) -> Vec<Violation> {
        self.0.iter().filter_map(|invariant| invariant.check(state).err()).collect()
    }

    /// Stop the simulation if anything in `state` is violated.
    #[allow(clippy::panic, reason = "Simulation failures must stop the run")]
    pub fn assert_holds(&self, state: &SystemSnapshot, context: &str) {
        let violations = self.violations(state);
        if !violations.is_empty() {
            let report: Vec<_> = violations.iter().map(ToString::to_string).collect();
            panic!("transcript invariant broken {context}:\n  {}", report.join("\n  "));
        }
    }
}
