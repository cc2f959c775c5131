//! Application side-effects and intents.
//!
//! This module defines the [`AppAction`] enum, which represents instructions
//! produced by the [`crate::App`] state machine for the runtime to execute.

use std::time::Duration;

use sector_core::SessionContext;

/// Actions produced by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    /// Render the UI.
    Render,

    /// Terminate the session and exit.
    Quit,

    /// Deliver [`crate::AppEvent::AuthenticationElapsed`] after `delay`.
    ScheduleAuthentication {
        /// Simulated verification delay.
        delay: Duration,
    },

    /// Bind the session's namespace and start the client.
    OpenSession(SessionContext),

    /// Send a chat message.
    SendMessage {
        /// Input line as typed.
        text: String,
    },
}
