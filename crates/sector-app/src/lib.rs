//! Application layer for sector chat
//!
//! Pure state machines and generic runtime for UI and session orchestration,
//! enabling deterministic simulation testing with the same code that runs in
//! production.
//!
//! # Components
//!
//! - [`App`]: UI state machine (login form, authentication delay, chat view)
//! - [`Bridge`]: Session bridge (translates App actions to Client events)
//! - [`Driver`]: Trait for platform-specific I/O abstraction
//! - [`Runtime`]: Generic orchestration loop using Driver
//! - [`AppConfig`]: TOML configuration
//! - [`transcript_html`] and friends: escaping and line rendering

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod bridge;
mod config;
mod driver;
mod event;
mod input;
mod render;
mod runtime;
mod state;

pub use action::AppAction;
pub use app::App;
pub use bridge::{Bridge, PendingAppend};
pub use config::{AppConfig, ConfigError};
pub use driver::Driver;
pub use event::AppEvent;
pub use input::{InputLine, KeyInput};
pub use render::{
    BANNER, ChatLine, ClockZone, UserStyle, escape_html, format_clock, transcript_html,
};
pub use runtime::Runtime;
pub use state::{ChatView, LoginField, LoginForm, Phase};
