//! Crossterm/ratatui [`Driver`] over any [`SyncEngine`].
//!
//! Keys come from crossterm's async event stream; when none arrives within
//! [`TICK`] the app gets a tick, which is also when the runtime drains the
//! namespace subscription. The screen is in raw mode on the alternate
//! buffer for the driver's lifetime and restored on drop.

use std::{
    io::{self, Stdout, stdout},
    time::{Duration, Instant},
};

use crossterm::{
    ExecutableCommand,
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use sector_app::{App, AppEvent, Driver};
use sector_core::NamespacePath;
use sector_sync::{ItemId, Subscription, SyncEngine, SyncError, SyncItem};
use thiserror::Error;

use crate::{KeyInput, ui};

/// Longest wait for a key before the app gets a tick.
pub const TICK: Duration = Duration::from_millis(100);

/// Terminal driver errors.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// Terminal could not be set up, read, or drawn.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Engine refused a subscription or a write.
    #[error("sync engine error: {0}")]
    Sync(#[from] SyncError),
}

/// Terminal front-end bound to one engine.
pub struct TerminalDriver<S> {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    keys: EventStream,
    engine: S,
    subscription: Option<Subscription>,
}

impl<S: SyncEngine> TerminalDriver<S> {
    /// Take over the terminal.
    pub fn new(engine: S) -> Result<Self, TerminalError> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

        Ok(Self { terminal, keys: EventStream::new(), engine, subscription: None })
    }
}

/// Map a key press to app input.
///
/// Raw mode swallows SIGINT, so Ctrl+C is treated as Esc.
fn key_input(key: KeyEvent) -> Option<KeyInput> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return (key.code == KeyCode::Char('c')).then_some(KeyInput::Esc);
    }

    Some(match key.code {
        KeyCode::Char(c) => KeyInput::Char(c),
        KeyCode::Enter => KeyInput::Enter,
        KeyCode::Backspace => KeyInput::Backspace,
        KeyCode::Delete => KeyInput::Delete,
        KeyCode::Tab | KeyCode::BackTab => KeyInput::Tab,
        KeyCode::Esc => KeyInput::Esc,
        KeyCode::Left => KeyInput::Left,
        KeyCode::Right => KeyInput::Right,
        KeyCode::Up => KeyInput::Up,
        KeyCode::Down => KeyInput::Down,
        KeyCode::Home => KeyInput::Home,
        KeyCode::End => KeyInput::End,
        _ => return None,
    })
}

impl<S: SyncEngine> Driver for TerminalDriver<S> {
    type Error = TerminalError;
    type Instant = Instant;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        let event = match tokio::time::timeout(TICK, self.keys.next()).await {
            Err(_elapsed) => return Ok(Some(AppEvent::Tick)),
            Ok(None) => return Ok(None),
            Ok(Some(event)) => event?,
        };

        Ok(match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => key_input(key).map(AppEvent::Key),
            Event::Resize(cols, rows) => Some(AppEvent::Resize(cols, rows)),
            _ => None,
        })
    }

    fn bind(&mut self, path: &NamespacePath) -> Result<(), Self::Error> {
        self.subscription = Some(self.engine.subscribe(path)?);
        tracing::info!(path = %path, "subscribed");
        Ok(())
    }

    fn append(&mut self, path: &NamespacePath, value: Vec<u8>) -> Result<ItemId, Self::Error> {
        Ok(self.engine.append(path, value)?)
    }

    async fn recv_item(&mut self) -> Option<SyncItem> {
        let subscription = self.subscription.as_mut()?;
        subscription.try_recv().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "subscription ended");
            self.subscription = None;
            None
        })
    }

    fn now(&self) -> Self::Instant {
        Instant::now()
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        self.terminal.draw(|frame| ui::render(frame, app))?;
        Ok(())
    }

    fn stop(&mut self) {
        self.subscription = None;
    }
}

impl<S> Drop for TerminalDriver<S> {
    fn drop(&mut self) {
        self.subscription = None;
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> Option<KeyInput> {
        key_input(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn plain_keys_map_to_input() {
        assert_eq!(press(KeyCode::Char('x'), KeyModifiers::NONE), Some(KeyInput::Char('x')));
        assert_eq!(press(KeyCode::Char('X'), KeyModifiers::SHIFT), Some(KeyInput::Char('X')));
        assert_eq!(press(KeyCode::BackTab, KeyModifiers::SHIFT), Some(KeyInput::Tab));
        assert_eq!(press(KeyCode::F(1), KeyModifiers::NONE), None);
    }

    #[test]
    fn ctrl_c_quits_and_other_chords_are_ignored() {
        assert_eq!(press(KeyCode::Char('c'), KeyModifiers::CONTROL), Some(KeyInput::Esc));
        assert_eq!(press(KeyCode::Char('u'), KeyModifiers::CONTROL), None);
    }
}
