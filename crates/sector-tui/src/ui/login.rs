//! Login form
//!
//! Username, room (or sector) and key fields. The key is masked.

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use sector_app::{App, LoginField, Phase};
use sector_core::ChatProfile;

const LABEL_WIDTH: usize = 10;
/// Offset of the first field row inside the block: border plus blank line.
const FIRST_FIELD_Y: u16 = 2;

/// Render the login form.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let title = match app.profile() {
        ChatProfile::Restricted => " RESTRICTED ACCESS ",
        ChatProfile::Sector => " TERMINAL CHAT ",
    };
    let block =
        Block::default().borders(Borders::ALL).title(title).title_alignment(Alignment::Center);

    let form = app.login_form();
    let editable = *app.phase() == Phase::Login;
    let fields = [
        (LoginField::Username, "USERNAME"),
        (LoginField::Room, app.profile().room_label()),
        (LoginField::Key, "KEY"),
    ];

    let mut lines = vec![Line::raw("")];
    for (field, label) in fields {
        let focused = editable && form.focus == field;
        let label_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let text = form.field(field).text();
        let shown = match field {
            LoginField::Key => "*".repeat(text.chars().count()),
            LoginField::Username | LoginField::Room => text.to_string(),
        };
        lines.push(Line::from(vec![
            Span::styled(format!(" {label:<LABEL_WIDTH$}"), label_style),
            Span::raw("> "),
            Span::raw(shown),
        ]));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);

    if editable {
        let row = match form.focus {
            LoginField::Username => 0,
            LoginField::Room => 1,
            LoginField::Key => 2,
        };
        // Border, leading space, label, "> ".
        let prefix = (1 + 1 + LABEL_WIDTH + 2) as u16;
        let cursor = form.field(form.focus).cursor() as u16;
        let max_x = area.x.saturating_add(area.width).saturating_sub(2);
        let x = area.x.saturating_add(prefix).saturating_add(cursor).min(max_x);
        let y = area.y.saturating_add(FIRST_FIELD_Y).saturating_add(row);
        frame.set_cursor_position((x, y));
    }
}
