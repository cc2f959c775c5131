//! Chat area
//!
//! Displays the transcript of the open session, newest line at the bottom.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};
use sector_app::{App, BANNER, ChatLine, ChatView, UserStyle, format_clock};
use sector_core::ChatProfile;

use super::accent_color;

const BORDER_SIZE: u16 = 2;

/// Render the chat area.
pub fn render(frame: &mut Frame, app: &App, chat: &ChatView, area: Rect) {
    let title_style = chat.accent.map_or_else(
        || Style::default().add_modifier(Modifier::BOLD),
        |accent| Style::default().fg(accent_color(accent)).add_modifier(Modifier::BOLD),
    );
    let title = Line::from(vec![
        Span::raw(" "),
        Span::styled(printable(&chat.username), title_style),
        Span::raw(format!(" @ {} ", printable(&chat.room))),
    ]);
    let block = Block::default().borders(Borders::ALL).title(title);

    let mut items = Vec::with_capacity(chat.lines.len() + 1);
    if app.profile() == ChatProfile::Sector {
        items.push(ListItem::new(Line::from(Span::styled(
            BANNER,
            Style::default().fg(Color::DarkGray),
        ))));
    }
    items.extend(chat.lines.iter().map(|line| ListItem::new(render_line(app, line))));

    let visible_height = area.height.saturating_sub(BORDER_SIZE) as usize;
    let skip = items.len().saturating_sub(visible_height);
    let visible_items: Vec<_> = items.into_iter().skip(skip).collect();

    frame.render_widget(List::new(visible_items).block(block), area);
}

fn render_line(app: &App, line: &ChatLine) -> Line<'static> {
    let user_style = match line.style {
        UserStyle::Own => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        UserStyle::Accent(accent) => {
            Style::default().fg(accent_color(accent)).add_modifier(Modifier::BOLD)
        },
        UserStyle::Plain => Style::default().add_modifier(Modifier::BOLD),
    };

    Line::from(vec![
        Span::styled(
            format!("[{}] ", format_clock(line.timestamp, app.clock())),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(printable(&line.user), user_style),
        Span::raw(": "),
        Span::raw(printable(&line.text)),
    ])
}

/// Replace control characters so peer text cannot drive the terminal.
fn printable(text: &str) -> String {
    text.chars().map(|c| if c.is_control() { '\u{fffd}' } else { c }).collect()
}
