//! Terminal UI for sector chat
//!
//! A thin shell over [`sector_app::Driver`] that provides terminal-specific
//! I/O. All orchestration logic lives in the generic [`sector_app::Runtime`]
//!
//! This crate only handles terminal rendering, key input and the production
//! environment.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod system_env;
pub mod terminal;
pub mod ui;

pub use sector_app::{App, AppAction, AppEvent, Bridge, Driver, KeyInput, Runtime};
pub use system_env::SystemEnv;
pub use terminal::{TerminalDriver, TerminalError};
