//! UI rendering
//!
//! Rendering functions that convert App state into terminal output using
//! ratatui widgets. All functions are pure (no I/O), taking state and
//! returning widget trees.

mod chat;
mod input;
mod login;
mod status;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    style::Color,
};
use sector_app::{App, Phase};
use sector_core::Accent;

/// Render the entire UI.
pub fn render(frame: &mut Frame, app: &App) {
    const MAIN_AREA_MIN_HEIGHT: u16 = 3;
    const INPUT_HEIGHT: u16 = 3;
    const STATUS_HEIGHT: u16 = 1;

    match app.phase() {
        Phase::Login | Phase::Authenticating { .. } => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Min(MAIN_AREA_MIN_HEIGHT),
                    Constraint::Length(STATUS_HEIGHT),
                ])
                .split(frame.area());

            let [form_area, status_area] = chunks.as_ref() else {
                return;
            };

            login::render(frame, app, *form_area);
            status::render(frame, app, *status_area);
        },
        Phase::Chat(chat) => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Min(MAIN_AREA_MIN_HEIGHT),
                    Constraint::Length(INPUT_HEIGHT),
                    Constraint::Length(STATUS_HEIGHT),
                ])
                .split(frame.area());

            let [chat_area, input_area, status_area] = chunks.as_ref() else {
                return;
            };

            chat::render(frame, app, chat, *chat_area);
            input::render(frame, &chat.input, *input_area);
            status::render(frame, app, *status_area);
        },
    }
}

/// Terminal colour for an accent.
fn accent_color(accent: Accent) -> Color {
    match accent {
        Accent::Red => Color::Red,
        Accent::Green => Color::Green,
        Accent::Yellow => Color::Yellow,
        Accent::Blue => Color::Blue,
        Accent::Magenta => Color::Magenta,
        Accent::Cyan => Color::Cyan,
    }
}
