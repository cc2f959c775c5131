//! Observable application state types.
//!
//! These structures are the view model: what the login and chat screens
//! show, without the pipelines behind them.

use sector_core::{Accent, Credentials, SessionContext};

use crate::{ChatLine, InputLine};

/// Login form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    /// Display identity.
    Username,
    /// Room id or sector name.
    Room,
    /// Shared key.
    Key,
}

impl LoginField {
    /// Field that Tab moves to.
    pub fn next(self) -> Self {
        match self {
            Self::Username => Self::Room,
            Self::Room => Self::Key,
            Self::Key => Self::Username,
        }
    }
}

/// Three-field login form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    /// Username input.
    pub username: InputLine,
    /// Room or sector input.
    pub room: InputLine,
    /// Key input. Displayed masked.
    pub key: InputLine,
    /// Field receiving keystrokes.
    pub focus: LoginField,
}

impl Default for LoginForm {
    fn default() -> Self {
        Self {
            username: InputLine::new(),
            room: InputLine::new(),
            key: InputLine::new(),
            focus: LoginField::Username,
        }
    }
}

impl LoginForm {
    /// Input line for a field.
    pub fn field(&self, field: LoginField) -> &InputLine {
        match field {
            LoginField::Username => &self.username,
            LoginField::Room => &self.room,
            LoginField::Key => &self.key,
        }
    }

    /// Mutable input line for the focused field.
    pub fn focused_mut(&mut self) -> &mut InputLine {
        match self.focus {
            LoginField::Username => &mut self.username,
            LoginField::Room => &mut self.room,
            LoginField::Key => &mut self.key,
        }
    }

    /// Form contents as trimmed credentials.
    pub fn credentials(&self) -> Credentials {
        Credentials::from_form(self.username.text(), self.room.text(), self.key.text())
    }
}

/// Chat screen state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatView {
    /// Viewer's identity, shown in the header.
    pub username: String,
    /// Room id or sector, shown in the header.
    pub room: String,
    /// Viewer's accent (restricted profile only).
    pub accent: Option<Accent>,
    /// Transcript in display order.
    pub lines: Vec<ChatLine>,
    /// Message input.
    pub input: InputLine,
}

impl ChatView {
    /// Empty chat screen for a session.
    pub fn new(session: &SessionContext, accent: Option<Accent>) -> Self {
        Self {
            username: session.username().to_string(),
            room: session.room().to_string(),
            accent,
            lines: Vec::new(),
            input: InputLine::new(),
        }
    }
}

/// Screen the application is on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for credentials.
    Login,
    /// Admitted; waiting out the verification delay.
    Authenticating {
        /// Session to open when the delay elapses.
        session: SessionContext,
    },
    /// Session open.
    Chat(ChatView),
}
