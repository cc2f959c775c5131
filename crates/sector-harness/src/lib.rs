//! Deterministic simulation harness for sector chat.
//!
//! Simulation implementations of the Environment and Driver traits, so the
//! production [`sector_app::Runtime`] runs against a virtual clock, a seeded
//! RNG and an in-memory sync engine shared by any number of participants.
//!
//! A [`SimDriver`] built with [`InvariantRegistry::standard()`] checks every
//! rendered transcript for duplicate ids and, in sectors, timestamp order.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod invariants;
pub mod sim_driver;
pub mod sim_env;

pub use invariants::{
    ChronologicalTranscript, ClientSnapshot, Invariant, InvariantRegistry, InvariantResult,
    LineSnapshot, SystemSnapshot, TranscriptConvergence, UniqueMessageIds, Violation,
};
pub use sim_driver::{SimDriver, SimDriverError};
pub use sim_env::SimEnv;
