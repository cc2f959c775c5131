//! Client-to-Application translation layer.
//!
//! The [`Bridge`] wraps the session [`sector_client::Client`] and adapts it
//! to the application lifecycle.
//!
//! # Responsibilities
//!
//! - Converts [`crate::AppAction::SendMessage`] into client events.
//! - Accumulates outgoing appends to be written by the driver in the next
//!   I/O cycle.
//! - Converts client deliveries back into [`crate::AppEvent`]s.

use sector_client::{Client, ClientAction, ClientError, ClientEvent};
use sector_core::{NamespacePath, SessionContext, env::Environment};
use sector_sync::SyncItem;

use crate::{AppAction, AppEvent};

/// A write waiting for the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAppend {
    /// Namespace to write into.
    pub path: NamespacePath,
    /// Encoded payload.
    pub value: Vec<u8>,
}

/// Bridge between App and the session client.
///
/// Generic over Environment to support both production and simulation.
pub struct Bridge<E: Environment> {
    client: Client<E>,
    outgoing: Vec<PendingAppend>,
}

impl<E: Environment> Bridge<E> {
    /// Create a bridge for an opened session.
    pub fn new(env: E, session: SessionContext) -> Self {
        Self { client: Client::new(env, session), outgoing: Vec::new() }
    }

    /// Underlying client.
    pub fn client(&self) -> &Client<E> {
        &self.client
    }

    /// Process an App action and return resulting App events.
    pub fn process_app_action(&mut self, action: AppAction) -> Vec<AppEvent> {
        match action {
            AppAction::SendMessage { text } => {
                let result = self.client.handle(ClientEvent::SendMessage { text });
                self.handle_client_result(result)
            },
            AppAction::Render
            | AppAction::Quit
            | AppAction::ScheduleAuthentication { .. }
            | AppAction::OpenSession(_) => vec![],
        }
    }

    /// Handle an item from the subscription.
    pub fn handle_item(&mut self, item: SyncItem) -> Vec<AppEvent> {
        let result =
            self.client.handle(ClientEvent::ItemDelivered { id: item.id, value: item.value });
        self.handle_client_result(result)
    }

    /// Take pending outgoing appends.
    pub fn take_outgoing(&mut self) -> Vec<PendingAppend> {
        std::mem::take(&mut self.outgoing)
    }

    fn handle_client_result(
        &mut self,
        result: Result<Vec<ClientAction>, ClientError>,
    ) -> Vec<AppEvent> {
        match result {
            Ok(actions) => self.process_client_actions(actions),
            Err(e) => vec![AppEvent::Error { message: e.to_string() }],
        }
    }

    fn process_client_actions(&mut self, actions: Vec<ClientAction>) -> Vec<AppEvent> {
        let mut events = Vec::new();

        for action in actions {
            match action {
                ClientAction::Append { path, value } => {
                    self.outgoing.push(PendingAppend { path, value });
                },
                ClientAction::Deliver(message) => {
                    events.push(AppEvent::MessageDelivered {
                        id: message.id,
                        record: message.record,
                        position: message.position,
                    });
                },
                // Already logged by the client; drops never reach the user.
                ClientAction::Dropped { .. } => {},
            }
        }

        events
    }
}
