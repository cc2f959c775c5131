//! Status bar
//!
//! Profile, room and message count, or the current status message.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use sector_app::{App, Phase};

/// Render the status bar.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let phase = match app.phase() {
        Phase::Login => Span::styled("Login", Style::default().fg(Color::Yellow)),
        Phase::Authenticating { .. } => {
            Span::styled("Verifying", Style::default().fg(Color::Yellow))
        },
        Phase::Chat(_) => Span::styled(
            "Connected",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
    };

    let detail = match (app.status_message(), app.chat()) {
        (Some(message), _) => format!(" | {message}"),
        (None, Some(chat)) => format!(
            " | {}: {} | Messages: {}",
            app.profile().room_label(),
            chat.room,
            chat.lines.len()
        ),
        (None, None) => format!(" | {} | Tab: next field, Enter: submit, Esc: quit", app.profile()),
    };

    let status_line = Line::from(vec![Span::raw(" "), phase, Span::raw(detail)]);

    let paragraph =
        Paragraph::new(status_line).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(paragraph, area);
}
