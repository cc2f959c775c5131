//! Integration tests for App and Bridge behavior.
//!
//! # Oracle Pattern
//!
//! Tests end with oracle checks that verify:
//! - App state reflects the expected phase
//! - Messages reach every participant of the same namespace exactly once
//! - Rendered markup never contains peer-controlled tags

use sector_app::{
    App, AppAction, AppConfig, AppEvent, BANNER, Bridge, ClockZone, KeyInput, Phase,
};
use sector_core::{AccentMap, AllowList, Gate, env::test_utils::MockEnv};
use sector_sync::{MemorySyncEngine, Subscription, SyncEngine};

/// One participant: App, its Bridge once the session opens, and its feed.
struct Participant {
    app: App,
    bridge: Option<Bridge<MockEnv>>,
    subscription: Option<Subscription>,
}

impl Participant {
    fn new(app: App) -> Self {
        Self { app, bridge: None, subscription: None }
    }

    fn type_text(&mut self, engine: &MemorySyncEngine, text: &str) {
        for c in text.chars() {
            self.key(engine, KeyInput::Char(c));
        }
    }

    fn key(&mut self, engine: &MemorySyncEngine, key: KeyInput) {
        let actions = self.app.handle(AppEvent::Key(key));
        self.process(engine, actions);
    }

    fn login(&mut self, engine: &MemorySyncEngine, username: &str, room: &str, key: &str) {
        self.type_text(engine, username);
        self.key(engine, KeyInput::Tab);
        self.type_text(engine, room);
        self.key(engine, KeyInput::Tab);
        self.type_text(engine, key);
        self.key(engine, KeyInput::Enter);
    }

    /// Let the verification delay pass.
    fn elapse(&mut self, engine: &MemorySyncEngine) {
        let actions = self.app.handle(AppEvent::AuthenticationElapsed);
        self.process(engine, actions);
    }

    fn say(&mut self, engine: &MemorySyncEngine, text: &str) {
        self.type_text(engine, text);
        self.key(engine, KeyInput::Enter);
    }

    /// Feed every ready item through the bridge.
    fn sync(&mut self, engine: &MemorySyncEngine) {
        let (Some(bridge), Some(subscription)) = (self.bridge.as_mut(), self.subscription.as_mut())
        else {
            return;
        };
        let mut events = Vec::new();
        for item in subscription.drain().unwrap() {
            events.extend(bridge.handle_item(item));
        }
        for event in events {
            let actions = self.app.handle(event);
            self.process(engine, actions);
        }
    }

    fn process(&mut self, engine: &MemorySyncEngine, actions: Vec<AppAction>) {
        for action in actions {
            match action {
                AppAction::OpenSession(session) => {
                    self.subscription = Some(engine.subscribe(session.path()).unwrap());
                    self.bridge = Some(Bridge::new(MockEnv::new(), session));
                },
                AppAction::SendMessage { .. } => {
                    let bridge = self.bridge.as_mut().unwrap();
                    assert!(bridge.process_app_action(action).is_empty());
                    for append in bridge.take_outgoing() {
                        engine.append(&append.path, append.value).unwrap();
                    }
                },
                AppAction::Render
                | AppAction::Quit
                | AppAction::ScheduleAuthentication { .. } => {},
            }
        }
    }

    fn texts(&self) -> Vec<String> {
        self.app
            .chat()
            .map(|c| c.lines.iter().map(|l| l.text.clone()).collect())
            .unwrap_or_default()
    }
}

fn restricted_app() -> App {
    AppConfig { clock: ClockZone::Utc, ..AppConfig::default() }.build_app()
}

fn sector_app() -> App {
    App::new(Gate::sector(), AccentMap::new(), ClockZone::Utc)
}

#[test]
fn stock_login_shows_identity_in_header() {
    let engine = MemorySyncEngine::new();
    let mut rasya = Participant::new(restricted_app());

    rasya.login(&engine, "rasya", "5678", "123");
    rasya.elapse(&engine);

    let chat = rasya.app.chat().unwrap();
    assert_eq!(chat.username, "rasya");
    assert_eq!(chat.room, "5678");
    assert!(rasya.subscription.is_some());
}

#[test]
fn rejected_login_binds_nothing() {
    let engine = MemorySyncEngine::new();
    let mut rasya = Participant::new(restricted_app());

    rasya.login(&engine, "rasya", "0000", "123");
    rasya.elapse(&engine);

    assert_eq!(rasya.app.phase(), &Phase::Login);
    assert!(rasya.subscription.is_none());
    assert_eq!(
        engine.subscriber_count(&sector_core::NamespacePath::restricted("0000")).unwrap(),
        0
    );
}

#[test]
fn restricted_peers_converge() {
    let engine = MemorySyncEngine::new();
    let mut desk = Participant::new(restricted_app());
    let mut laptop = Participant::new(restricted_app());

    desk.login(&engine, "rasya", "5678", "123");
    desk.elapse(&engine);
    desk.say(&engine, "first");

    laptop.login(&engine, "rasya", "5678", "123");
    laptop.elapse(&engine);
    laptop.say(&engine, "second");

    desk.sync(&engine);
    laptop.sync(&engine);

    assert_eq!(desk.texts(), ["first", "second"]);
    assert_eq!(laptop.texts(), ["first", "second"]);
}

#[test]
fn different_keys_in_same_room_see_nothing() {
    // Each identity seals with its own key, so payloads do not open across
    // identities even inside the admitted room.
    let engine = MemorySyncEngine::new();
    let mut rasya = Participant::new(restricted_app());
    let mut peer = Participant::new(restricted_app());

    rasya.login(&engine, "rasya", "5678", "123");
    rasya.elapse(&engine);
    peer.login(&engine, "PENGGUNA1", "5678", "1234");
    peer.elapse(&engine);

    rasya.say(&engine, "only mine");
    rasya.sync(&engine);
    peer.sync(&engine);

    assert_eq!(rasya.texts(), ["only mine"]);
    assert!(peer.texts().is_empty());
}

#[test]
fn script_tag_renders_as_text() {
    let engine = MemorySyncEngine::new();
    let mut ghost = Participant::new(sector_app());

    ghost.login(&engine, "ghost", "alpha", "k9");
    ghost.elapse(&engine);
    ghost.say(&engine, "<script>alert(1)</script>");
    ghost.sync(&engine);

    let html = ghost.app.transcript_html().unwrap();
    assert!(html.starts_with(&format!("<div class=\"sys-msg\">{BANNER}</div>")));
    assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    assert!(!html.contains("<script>"));
    assert!(html.contains("msg-own"));
}

#[test]
fn sector_login_requires_every_field() {
    let engine = MemorySyncEngine::new();
    let mut ghost = Participant::new(sector_app());

    ghost.login(&engine, "ghost", "   ", "k9");

    assert_eq!(ghost.app.phase(), &Phase::Login);
    assert_eq!(ghost.app.status_message(), Some("ERROR: ALL FIELDS MANDATORY"));
}

#[test]
fn custom_allow_list_gates_login() {
    let engine = MemorySyncEngine::new();
    let config = AppConfig::from_toml(
        r#"
        [allow_list]
        room = "42"
        users = [{ username = "ops", key = "pw" }]
        "#,
    )
    .unwrap();
    assert_ne!(config.allow_list(), AllowList::builtin());

    let mut stock = Participant::new(config.build_app());
    stock.login(&engine, "rasya", "5678", "123");
    assert_eq!(stock.app.phase(), &Phase::Login);

    let mut ops = Participant::new(config.build_app());
    ops.login(&engine, "ops", "42", "pw");
    assert!(matches!(ops.app.phase(), Phase::Authenticating { .. }));
}
