//! Application input events.
//!
//! Events originate from two distinct sources:
//! - User interactions (keyboard, resize), ticks and the authentication timer.
//! - Client notifications translated by the [`crate::Bridge`].

use sector_core::MessageRecord;
use sector_sync::ItemId;

use crate::KeyInput;

/// Events processed by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Keyboard input.
    Key(KeyInput),

    /// Periodic tick.
    Tick,

    /// Terminal resize (columns, rows).
    Resize(u16, u16),

    /// The verification delay scheduled on admission has passed.
    AuthenticationElapsed,

    /// A message was accepted into the transcript.
    MessageDelivered {
        /// Engine item id.
        id: ItemId,
        /// Validated record.
        record: MessageRecord,
        /// Display position in the transcript.
        position: usize,
    },

    /// Error occurred.
    Error {
        /// Error description.
        message: String,
    },
}
