//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` provides the same interface as `TerminalDriver` but for
//! deterministic testing. It implements [`Driver`] so the same
//! [`sector_app::Runtime`] orchestration code runs in both production and
//! simulation.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use sector_app::{App, AppEvent, Driver, KeyInput};
use sector_core::{NamespacePath, env::Environment};
use sector_sync::{ItemId, MemorySyncEngine, Subscription, SyncEngine, SyncError, SyncItem};
use thiserror::Error;

use crate::{
    SimEnv,
    invariants::{ClientSnapshot, InvariantRegistry, SystemSnapshot},
};

/// Virtual time that passes on a poll with nothing scripted.
const IDLE_STEP: Duration = Duration::from_millis(100);

/// Error type for simulation driver.
#[derive(Error, Debug)]
pub enum SimDriverError {
    /// Sync engine refused an operation.
    #[error("sync engine: {0}")]
    Sync(#[from] SyncError),
}

/// One scripted step.
#[derive(Debug)]
enum Scripted {
    Event(AppEvent),
    Pause(Duration),
}

/// Shared state for event injection.
///
/// This allows injection while the Runtime owns the driver.
#[derive(Debug, Default)]
struct SharedState {
    script: VecDeque<Scripted>,
    subscription: Option<Subscription>,
    bound: Option<NamespacePath>,
    acknowledged: Vec<ItemId>,
    renders: usize,
    quit_when_idle: bool,
}

/// Simulation driver for deterministic testing.
///
/// Implements [`Driver`] trait so the same [`sector_app::Runtime`]
/// orchestration code runs in both production TUI and simulation tests.
/// Several drivers sharing one [`MemorySyncEngine`] model peers in the same
/// namespace.
pub struct SimDriver {
    client_id: u64,
    state: Arc<Mutex<SharedState>>,
    engine: MemorySyncEngine,
    env: SimEnv,
    invariants: Option<InvariantRegistry>,
}

impl SimDriver {
    /// Create a driver over a shared engine.
    ///
    /// Give the Runtime a clone of the same `env` so both observe one clock.
    pub fn new(engine: MemorySyncEngine, env: SimEnv) -> Self {
        Self {
            client_id: 0,
            state: Arc::new(Mutex::new(SharedState::default())),
            engine,
            env,
            invariants: None,
        }
    }

    /// Identify this participant in invariant reports.
    #[must_use]
    pub fn with_client_id(mut self, client_id: u64) -> Self {
        self.client_id = client_id;
        self
    }

    /// Enable invariant checking on every render.
    #[must_use]
    pub fn with_invariants(mut self, registry: InvariantRegistry) -> Self {
        self.invariants = Some(registry);
        self
    }

    /// Answer Esc once the script runs out, so [`sector_app::Runtime::run`]
    /// terminates.
    #[must_use]
    pub fn quit_when_idle(self) -> Self {
        self.state().quit_when_idle = true;
        self
    }

    fn state(&self) -> MutexGuard<'_, SharedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inject an `AppEvent` for processing.
    pub fn inject_event(&self, event: AppEvent) {
        self.state().script.push_back(Scripted::Event(event));
    }

    /// Inject a key press.
    pub fn inject_key(&self, key: KeyInput) {
        self.inject_event(AppEvent::Key(key));
    }

    /// Inject one key press per character.
    pub fn inject_text(&self, text: &str) {
        let mut state = self.state();
        state
            .script
            .extend(text.chars().map(|c| Scripted::Event(AppEvent::Key(KeyInput::Char(c)))));
    }

    /// Fill the login form and submit it.
    pub fn inject_login(&self, username: &str, room: &str, key: &str) {
        self.inject_text(username);
        self.inject_key(KeyInput::Tab);
        self.inject_text(room);
        self.inject_key(KeyInput::Tab);
        self.inject_text(key);
        self.inject_key(KeyInput::Enter);
    }

    /// Type a message and submit it.
    pub fn inject_message(&self, text: &str) {
        self.inject_text(text);
        self.inject_key(KeyInput::Enter);
    }

    /// Let virtual time pass at this point of the script.
    pub fn inject_pause(&self, duration: Duration) {
        self.state().script.push_back(Scripted::Pause(duration));
    }

    /// Check if there are scripted steps left.
    pub fn has_pending(&self) -> bool {
        !self.state().script.is_empty()
    }

    /// Namespace bound by the session, if any.
    pub fn bound_path(&self) -> Option<NamespacePath> {
        self.state().bound.clone()
    }

    /// Ids the engine returned for this participant's appends.
    pub fn acknowledged(&self) -> Vec<ItemId> {
        self.state().acknowledged.clone()
    }

    /// Number of renders so far.
    pub fn render_count(&self) -> usize {
        self.state().renders
    }

    /// Shared sync engine.
    pub fn engine(&self) -> &MemorySyncEngine {
        &self.engine
    }

    /// Create a snapshot from App state for invariant checking.
    pub fn snapshot_from_app(&self, app: &App) -> ClientSnapshot {
        ClientSnapshot::from_app(self.client_id, app, self.bound_path())
    }

    /// Check invariants against App state.
    pub fn check_invariants(&self, app: &App, context: &str) {
        if let Some(ref registry) = self.invariants {
            let snapshot = SystemSnapshot::single(self.snapshot_from_app(app));
            registry.assert_holds(&snapshot, context);
        }
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;
    type Instant = Duration;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        let mut state = self.state();
        match state.script.pop_front() {
            Some(Scripted::Event(event)) => Ok(Some(event)),
            Some(Scripted::Pause(duration)) => {
                self.env.advance(duration);
                Ok(None)
            },
            None if state.quit_when_idle => Ok(Some(AppEvent::Key(KeyInput::Esc))),
            None => {
                self.env.advance(IDLE_STEP);
                Ok(None)
            },
        }
    }

    fn bind(&mut self, path: &NamespacePath) -> Result<(), Self::Error> {
        let subscription = self.engine.subscribe(path)?;
        tracing::info!(client = self.client_id, path = %path, "bound namespace");
        let mut state = self.state();
        state.subscription = Some(subscription);
        state.bound = Some(path.clone());
        Ok(())
    }

    fn append(&mut self, path: &NamespacePath, value: Vec<u8>) -> Result<ItemId, Self::Error> {
        let id = self.engine.append(path, value)?;
        self.state().acknowledged.push(id.clone());
        Ok(id)
    }

    async fn recv_item(&mut self) -> Option<SyncItem> {
        let mut state = self.state();
        match state.subscription.as_mut()?.try_recv() {
            Ok(item) => item,
            Err(e) => {
                tracing::warn!(client = self.client_id, error = %e, "subscription ended");
                state.subscription = None;
                None
            },
        }
    }

    fn now(&self) -> Self::Instant {
        self.env.now()
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        self.state().renders += 1;
        self.check_invariants(app, "after render");
        Ok(())
    }

    fn stop(&mut self) {
        self.state().subscription = None;
    }
}
