//! Core types for sector chat.
//!
//! Pure, I/O-free building blocks shared by the client, the application
//! layer, and the sync engine:
//!
//! - [`Gate`]: credential gate over an injected [`CredentialVerifier`]
//! - [`NamespacePath`]: deterministic mailbox key derived from login input
//! - [`MessageRecord`]: the unit written into a namespace
//! - [`SessionContext`]: explicit per-session state returned by the gate
//! - [`ChatProfile`]: restricted room vs. open sector behaviour
//! - [`env::Environment`]: time and randomness abstraction

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod accent;
pub mod env;
mod error;
mod gate;
mod namespace;
mod profile;
mod record;
mod session;

pub use accent::{Accent, AccentMap};
pub use error::{DenialReason, GateError, RecordError};
pub use gate::{Admission, AllowList, AllowedUser, CredentialVerifier, Credentials, Gate};
pub use namespace::{NamespacePath, RESTRICTED_ROOT, SECTOR_ROOT, SECTOR_SEPARATOR};
pub use profile::{ChatProfile, PayloadProtection, TranscriptOrder};
pub use record::MessageRecord;
pub use session::{SessionContext, SessionKey};
