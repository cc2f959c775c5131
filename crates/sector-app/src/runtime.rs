//! Generic runtime for application orchestration.
//!
//! The Runtime drives the application event loop, coordinating between:
//! - [`App`]: UI state machine
//! - [`Bridge`]: session client, created once the session opens
//! - [`Driver`]: Platform-specific I/O

use std::time::Duration;

use sector_core::env::Environment;

use crate::{App, AppAction, AppEvent, Bridge, Driver};

/// Generic runtime that orchestrates App, Bridge, and Driver.
///
/// # Type Parameters
///
/// - `D`: Platform-specific I/O driver
/// - `E`: Environment for wall clock and randomness
pub struct Runtime<D, E>
where
    D: Driver,
    E: Environment,
{
    driver: D,
    env: E,
    app: App,
    bridge: Option<Bridge<E>>,
    /// Start and length of the running verification delay.
    authentication: Option<(D::Instant, Duration)>,
}

impl<D, E> Runtime<D, E>
where
    D: Driver<Instant = E::Instant>,
    E: Environment,
{
    /// Create a new runtime with the given driver, environment and app.
    pub fn new(driver: D, env: E, app: App) -> Self {
        Self { driver, env, app, bridge: None, authentication: None }
    }

    /// Run the main event loop.
    ///
    /// Each cycle:
    /// 1. Polls for one input event from the driver
    /// 2. Fires the authentication timer if its delay has passed
    /// 3. Feeds every ready sync item through the bridge
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn run(mut self) -> Result<(), D::Error> {
        self.driver.render(&self.app)?;

        loop {
            if self.step().await? {
                break;
            }
        }

        self.driver.stop();
        Ok(())
    }

    /// Process one cycle of the event loop.
    ///
    /// Returns `true` if the application should quit.
    pub async fn step(&mut self) -> Result<bool, D::Error> {
        if let Some(event) = self.driver.poll_event().await? {
            let actions = self.app.handle(event);
            if self.process_actions(actions)? {
                return Ok(true);
            }
        }

        if let Some((started, delay)) = self.authentication
            && self.driver.now() - started >= delay
        {
            self.authentication = None;
            let actions = self.app.handle(AppEvent::AuthenticationElapsed);
            if self.process_actions(actions)? {
                return Ok(true);
            }
        }

        while self.bridge.is_some() {
            let Some(item) = self.driver.recv_item().await else {
                break;
            };
            let events = match self.bridge.as_mut() {
                Some(bridge) => bridge.handle_item(item),
                None => break,
            };
            if self.process_app_events(events)? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    /// Process actions returned by the App.
    ///
    /// Returns `true` if should quit.
    fn process_actions(&mut self, initial_actions: Vec<AppAction>) -> Result<bool, D::Error> {
        let mut pending_actions = initial_actions;

        while !pending_actions.is_empty() {
            let actions = std::mem::take(&mut pending_actions);

            for action in actions {
                match action {
                    AppAction::Render => self.driver.render(&self.app)?,
                    AppAction::Quit => return Ok(true),
                    AppAction::ScheduleAuthentication { delay } => {
                        self.authentication = Some((self.driver.now(), delay));
                    },
                    AppAction::OpenSession(session) => {
                        self.driver.bind(session.path())?;
                        self.bridge = Some(Bridge::new(self.env.clone(), session));
                    },
                    AppAction::SendMessage { .. } => {
                        let Some(bridge) = self.bridge.as_mut() else {
                            tracing::warn!("message submitted without an open session");
                            continue;
                        };
                        for event in bridge.process_app_action(action) {
                            pending_actions.extend(self.app.handle(event));
                        }
                        self.flush_outgoing();
                    },
                }
            }
        }
        Ok(false)
    }

    /// Process events from Bridge back to App.
    fn process_app_events(&mut self, events: Vec<AppEvent>) -> Result<bool, D::Error> {
        for event in events {
            let actions = self.app.handle(event);
            if self.process_actions(actions)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Write pending appends. Failures are logged, never shown to the user.
    fn flush_outgoing(&mut self) {
        let Some(bridge) = self.bridge.as_mut() else {
            return;
        };
        for append in bridge.take_outgoing() {
            match self.driver.append(&append.path, append.value) {
                Ok(id) => tracing::debug!(id = %id, path = %append.path, "append acknowledged"),
                Err(e) => tracing::warn!(error = %e, path = %append.path, "append failed"),
            }
        }
    }

    /// Get a reference to the App
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Get a mutable reference to the App
    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }

    /// Bridge for the open session. `None` before the session opens.
    pub fn bridge(&self) -> Option<&Bridge<E>> {
        self.bridge.as_ref()
    }

    /// Get a reference to the driver
    pub fn driver(&self) -> &D {
        &self.driver
    }
}
