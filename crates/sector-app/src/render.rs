//! Transcript rendering.
//!
//! Produces the same HTML fragments a browser front-end would put into its
//! transcript container, plus the plain pieces (clock, style) a terminal view
//! needs. Every string that came from the network goes through
//! [`escape_html`] before it is placed in markup.

use std::fmt::Write as _;

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use sector_core::{Accent, AccentMap, ChatProfile, MessageRecord};
use sector_sync::ItemId;

/// Line shown at the top of every sector transcript.
pub const BANNER: &str = "--- ENCRYPTED CONNECTION ESTABLISHED ---";

/// Shown when a timestamp cannot be represented as a date.
const INVALID_CLOCK: &str = "--:--:--";

/// Escape text for inclusion in HTML.
///
/// Matches text-node serialization: `&`, `<`, `>` and U+00A0 are replaced,
/// quotes are left alone. The output is safe between tags, not inside
/// attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\u{a0}' => escaped.push_str("&nbsp;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Time zone used for transcript clocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockZone {
    /// Coordinated Universal Time.
    Utc,
    /// Zone of the machine running the client.
    #[default]
    Local,
}

impl std::str::FromStr for ClockZone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "utc" => Ok(Self::Utc),
            "local" => Ok(Self::Local),
            other => Err(format!("unknown clock zone '{other}' (expected utc or local)")),
        }
    }
}

/// Format a millisecond timestamp as 24-hour `HH:MM:SS`.
pub fn format_clock(timestamp_ms: u64, zone: ClockZone) -> String {
    let utc = i64::try_from(timestamp_ms).ok().and_then(DateTime::<Utc>::from_timestamp_millis);
    let Some(utc) = utc else {
        return INVALID_CLOCK.to_string();
    };

    match zone {
        ClockZone::Utc => utc.format("%H:%M:%S").to_string(),
        ClockZone::Local => utc.with_timezone(&Local).format("%H:%M:%S").to_string(),
    }
}

/// How the author of a line is highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserStyle {
    /// Viewer's own message (sector profile).
    Own,
    /// Allow-listed author with an accent (restricted profile).
    Accent(Accent),
    /// No highlight.
    Plain,
}

impl UserStyle {
    /// Style for `author` as seen by `viewer`.
    pub fn resolve(profile: ChatProfile, viewer: &str, author: &str, accents: &AccentMap) -> Self {
        match profile {
            ChatProfile::Sector if author == viewer => Self::Own,
            ChatProfile::Sector => Self::Plain,
            ChatProfile::Restricted => accents.get(author).map_or(Self::Plain, Self::Accent),
        }
    }
}

/// One transcript line, ready to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    /// Engine item id.
    pub id: ItemId,
    /// Author.
    pub user: String,
    /// Message body, unescaped.
    pub text: String,
    /// Author's timestamp in milliseconds.
    pub timestamp: u64,
    /// Author highlight.
    pub style: UserStyle,
}

impl ChatLine {
    /// Build from an accepted record.
    pub fn from_record(id: ItemId, record: MessageRecord, style: UserStyle) -> Self {
        Self { id, user: record.user, text: record.text, timestamp: record.timestamp, style }
    }

    /// HTML fragment for this line.
    pub fn to_html(&self, profile: ChatProfile, zone: ClockZone) -> String {
        let clock = format_clock(self.timestamp, zone);
        let user = escape_html(&self.user);
        let text = escape_html(&self.text);

        match profile {
            ChatProfile::Restricted => {
                let class = match self.style {
                    UserStyle::Accent(accent) => format!("msg-{}", accent.name()),
                    UserStyle::Own | UserStyle::Plain => String::new(),
                };
                format!(
                    "<div class=\"msg-line\"><span class=\"timestamp\">[{clock}]</span> \
                     <span class=\"{class}\">[{user}]</span>: \
                     <span class=\"msg-content\">{text}</span></div>"
                )
            },
            ChatProfile::Sector => {
                let class =
                    if self.style == UserStyle::Own { "msg-row msg-own" } else { "msg-row" };
                format!(
                    "<div class=\"{class}\"><div class=\"msg-meta\">[{clock}] {user}</div>\
                     <div class=\"msg-content\">{text}</div></div>"
                )
            },
        }
    }
}

/// HTML for a whole transcript, banner first for the sector profile.
pub fn transcript_html(lines: &[ChatLine], profile: ChatProfile, zone: ClockZone) -> String {
    let mut html = String::new();
    if profile == ChatProfile::Sector {
        let _ = write!(html, "<div class=\"sys-msg\">{BANNER}</div>");
    }
    for line in lines {
        html.push_str(&line.to_html(profile, zone));
    }
    html
}
