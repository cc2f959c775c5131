//! Application state machine.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute.
//!
//! # Phases
//!
//! ```text
//! Login ──submit/admitted──► Authenticating ──delay elapsed──► Chat
//!   ▲  │
//!   └──┘ refused: status text, nothing else changes
//! ```
//!
//! Esc quits from any phase.

use sector_core::{AccentMap, ChatProfile, Gate};

use crate::{
    AppAction, AppEvent, ChatLine, ChatView, ClockZone, KeyInput, LoginForm, Phase, UserStyle,
    transcript_html,
};

/// Application state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable in simulation.
#[derive(Debug, Clone)]
pub struct App {
    /// Credential gate for the configured profile.
    gate: Gate,
    /// Accents from the allow-list.
    accents: AccentMap,
    /// Zone for transcript clocks.
    clock: ClockZone,
    /// Current screen.
    phase: Phase,
    /// Login form contents. Kept after admission, like a page form.
    login: LoginForm,
    /// Terminal dimensions (columns, rows).
    terminal_size: (u16, u16),
    /// Transient status message. `None` if no message.
    status_message: Option<String>,
}

impl App {
    /// Create an App on the login screen.
    pub fn new(gate: Gate, accents: AccentMap, clock: ClockZone) -> Self {
        Self {
            gate,
            accents,
            clock,
            phase: Phase::Login,
            login: LoginForm::default(),
            terminal_size: (80, 24),
            status_message: None,
        }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Tick => vec![],
            AppEvent::Resize(cols, rows) => {
                self.terminal_size = (cols, rows);
                vec![AppAction::Render]
            },
            AppEvent::Key(KeyInput::Esc) => self.quit(),
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::AuthenticationElapsed => self.open_session(),
            AppEvent::MessageDelivered { id, record, position } => {
                let profile = self.profile();
                let Phase::Chat(chat) = &mut self.phase else {
                    tracing::warn!(id = %id, "message delivered outside chat phase");
                    return vec![];
                };
                let style =
                    UserStyle::resolve(profile, &chat.username, &record.user, &self.accents);
                let position = position.min(chat.lines.len());
                chat.lines.insert(position, ChatLine::from_record(id, record, style));
                vec![AppAction::Render]
            },
            AppEvent::Error { message } => {
                self.status_message = Some(format!("ERROR: {message}"));
                vec![AppAction::Render]
            },
        }
    }

    fn handle_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        if self.phase == Phase::Login {
            return self.handle_login_key(key);
        }

        match &mut self.phase {
            // Input is locked while the delay runs.
            Phase::Login | Phase::Authenticating { .. } => vec![],
            Phase::Chat(chat) => match key {
                KeyInput::Enter => {
                    // Blank input stays in the field.
                    if chat.input.text().trim().is_empty() {
                        return vec![];
                    }
                    let text = chat.input.take();
                    vec![AppAction::SendMessage { text }, AppAction::Render]
                },
                other => {
                    if chat.input.edit(other) {
                        vec![AppAction::Render]
                    } else {
                        vec![]
                    }
                },
            },
        }
    }

    fn handle_login_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        match key {
            KeyInput::Tab => {
                self.login.focus = self.login.focus.next();
                vec![AppAction::Render]
            },
            KeyInput::Enter => self.submit_login(),
            other => {
                if self.login.focused_mut().edit(other) {
                    vec![AppAction::Render]
                } else {
                    vec![]
                }
            },
        }
    }

    /// Submit the login form through the gate.
    pub fn submit_login(&mut self) -> Vec<AppAction> {
        if self.phase != Phase::Login {
            return vec![];
        }

        match self.gate.admit(&self.login.credentials()) {
            Ok(admission) => {
                let username = admission.session.username().to_string();
                self.status_message = Some(match self.profile() {
                    ChatProfile::Restricted => format!("> AUTHENTICATING AS [{username}]..."),
                    ChatProfile::Sector => "AUTHENTICATING...".to_string(),
                });
                self.phase = Phase::Authenticating { session: admission.session };
                vec![
                    AppAction::ScheduleAuthentication { delay: admission.delay },
                    AppAction::Render,
                ]
            },
            Err(error) => {
                self.status_message = Some(error.to_string());
                vec![AppAction::Render]
            },
        }
    }

    fn open_session(&mut self) -> Vec<AppAction> {
        let Phase::Authenticating { session } = &self.phase else {
            return vec![];
        };
        let session = session.clone();

        let accent = match self.profile() {
            ChatProfile::Restricted => self.accents.get(session.username()),
            ChatProfile::Sector => None,
        };

        tracing::info!(user = %session.username(), path = %session.path(), "session opened");
        self.status_message = None;
        self.phase = Phase::Chat(ChatView::new(&session, accent));
        vec![AppAction::OpenSession(session), AppAction::Render]
    }

    /// Terminate the session.
    pub fn quit(&self) -> Vec<AppAction> {
        vec![AppAction::Quit]
    }

    /// Profile the gate admits into.
    pub fn profile(&self) -> ChatProfile {
        self.gate.profile()
    }

    /// Current screen.
    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Login form contents.
    pub fn login_form(&self) -> &LoginForm {
        &self.login
    }

    /// Chat screen state. `None` before the session opens.
    pub fn chat(&self) -> Option<&ChatView> {
        match &self.phase {
            Phase::Chat(chat) => Some(chat),
            Phase::Login | Phase::Authenticating { .. } => None,
        }
    }

    /// Zone for transcript clocks.
    pub fn clock(&self) -> ClockZone {
        self.clock
    }

    /// Terminal dimensions (columns, rows).
    pub fn terminal_size(&self) -> (u16, u16) {
        self.terminal_size
    }

    /// Transient status message. `None` if no message.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    /// Transcript as HTML. `None` before the session opens.
    pub fn transcript_html(&self) -> Option<String> {
        self.chat().map(|chat| transcript_html(&chat.lines, self.profile(), self.clock))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use sector_core::{Accent, AllowList, MessageRecord};
    use sector_sync::ItemId;

    use super::*;
    use crate::LoginField;

    fn restricted_app() -> App {
        let allow_list = AllowList::builtin();
        let accents = allow_list.accents();
        App::new(Gate::restricted(allow_list), accents, ClockZone::Utc)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle(AppEvent::Key(KeyInput::Char(c)));
        }
    }

    fn fill_login(app: &mut App, username: &str, room: &str, key: &str) {
        type_text(app, username);
        app.handle(AppEvent::Key(KeyInput::Tab));
        type_text(app, room);
        app.handle(AppEvent::Key(KeyInput::Tab));
        type_text(app, key);
    }

    #[test]
    fn tab_cycles_focus() {
        let mut app = restricted_app();
        for expected in [LoginField::Room, LoginField::Key, LoginField::Username] {
            app.handle(AppEvent::Key(KeyInput::Tab));
            assert_eq!(app.login_form().focus, expected);
        }
    }

    #[test]
    fn admitted_login_schedules_authentication() {
        let mut app = restricted_app();
        fill_login(&mut app, "rasya", "5678", "123");

        let actions = app.handle(AppEvent::Key(KeyInput::Enter));

        assert_eq!(actions, vec![
            AppAction::ScheduleAuthentication { delay: Duration::from_secs(2) },
            AppAction::Render
        ]);
        assert_eq!(app.status_message(), Some("> AUTHENTICATING AS [rasya]..."));
        assert!(matches!(app.phase(), Phase::Authenticating { .. }));
    }

    #[test]
    fn refused_login_only_sets_status() {
        let mut app = restricted_app();
        fill_login(&mut app, "rasya", "0000", "123");

        let actions = app.handle(AppEvent::Key(KeyInput::Enter));

        assert_eq!(actions, vec![AppAction::Render]);
        assert_eq!(app.phase(), &Phase::Login);
        assert_eq!(
            app.status_message(),
            Some("ACCESS DENIED: RESTRICTED SECTOR ID. (INVALID ROOM)")
        );
    }

    #[test]
    fn elapsed_delay_opens_session_with_accent() {
        let mut app = restricted_app();
        fill_login(&mut app, "PENGGUNA1", "5678", "1234");
        app.handle(AppEvent::Key(KeyInput::Enter));

        let actions = app.handle(AppEvent::AuthenticationElapsed);

        assert!(matches!(actions.as_slice(), [AppAction::OpenSession(_), AppAction::Render]));
        let chat = app.chat().unwrap();
        assert_eq!(chat.username, "PENGGUNA1");
        assert_eq!(chat.room, "5678");
        assert_eq!(chat.accent, Some(Accent::Magenta));
    }

    #[test]
    fn keys_are_ignored_while_authenticating() {
        let mut app = restricted_app();
        fill_login(&mut app, "rasya", "5678", "123");
        app.handle(AppEvent::Key(KeyInput::Enter));

        assert!(app.handle(AppEvent::Key(KeyInput::Char('x'))).is_empty());
        assert!(app.handle(AppEvent::Key(KeyInput::Enter)).is_empty());
    }

    #[test]
    fn stray_elapsed_event_is_ignored() {
        let mut app = restricted_app();
        assert!(app.handle(AppEvent::AuthenticationElapsed).is_empty());
        assert_eq!(app.phase(), &Phase::Login);
    }

    #[test]
    fn enter_sends_and_clears_input() {
        let mut app = restricted_app();
        fill_login(&mut app, "rasya", "5678", "123");
        app.handle(AppEvent::Key(KeyInput::Enter));
        app.handle(AppEvent::AuthenticationElapsed);

        type_text(&mut app, "hello");
        let actions = app.handle(AppEvent::Key(KeyInput::Enter));

        assert_eq!(actions, vec![
            AppAction::SendMessage { text: "hello".into() },
            AppAction::Render
        ]);
        assert!(app.chat().unwrap().input.is_empty());
    }

    #[test]
    fn enter_on_blank_input_keeps_the_text() {
        let mut app = restricted_app();
        fill_login(&mut app, "rasya", "5678", "123");
        app.handle(AppEvent::Key(KeyInput::Enter));
        app.handle(AppEvent::AuthenticationElapsed);

        type_text(&mut app, "   ");
        let actions = app.handle(AppEvent::Key(KeyInput::Enter));

        assert!(actions.is_empty());
        assert_eq!(app.chat().unwrap().input.text(), "   ");
    }

    #[test]
    fn delivered_messages_are_spliced_at_position() {
        let mut app = App::new(Gate::sector(), AccentMap::new(), ClockZone::Utc);
        fill_login(&mut app, "ghost", "alpha", "k");
        app.handle(AppEvent::Key(KeyInput::Enter));
        app.handle(AppEvent::AuthenticationElapsed);

        for (id, position) in [("b", 0), ("a", 0), ("c", 2)] {
            app.handle(AppEvent::MessageDelivered {
                id: ItemId::from(id),
                record: MessageRecord::new("ghost", id, 10),
                position,
            });
        }

        let texts: Vec<_> = app.chat().unwrap().lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, ["a", "b", "c"]);
        assert_eq!(app.chat().unwrap().lines[0].style, UserStyle::Own);
    }

    #[test]
    fn esc_quits_from_login() {
        let mut app = restricted_app();
        assert_eq!(app.handle(AppEvent::Key(KeyInput::Esc)), vec![AppAction::Quit]);
    }
}
