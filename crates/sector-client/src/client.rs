//! Client state machine.
//!
//! One `Client` serves one session. It is created from the
//! [`SessionContext`] the gate produced and lives as long as the session.

use std::collections::HashSet;

use sector_core::{MessageRecord, PayloadProtection, SessionContext, env::Environment};
use sector_crypto::{SEAL_RANDOM_SIZE, SealedPayload};
use sector_sync::ItemId;

use crate::{
    error::ClientError,
    event::{ClientAction, ClientEvent, DeliveredMessage, DropReason},
    transcript::Transcript,
};

/// Session client.
pub struct Client<E: Environment> {
    /// Environment for wall clock and randomness.
    env: E,

    /// Session this client serves.
    session: SessionContext,

    /// Ids already accepted into the transcript.
    rendered: HashSet<ItemId>,

    /// Accepted messages in display order.
    transcript: Transcript,
}

impl<E: Environment> Client<E> {
    /// Create a client for an admitted session.
    pub fn new(env: E, session: SessionContext) -> Self {
        let transcript = Transcript::new(session.profile().order());
        Self { env, session, rendered: HashSet::new(), transcript }
    }

    /// Session this client serves.
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Accepted messages in display order.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// True if the id has been accepted.
    pub fn is_rendered(&self, id: &ItemId) -> bool {
        self.rendered.contains(id)
    }

    /// Number of accepted ids.
    pub fn rendered_count(&self) -> usize {
        self.rendered.len()
    }

    /// Process an event and return resulting actions.
    pub fn handle(&mut self, event: ClientEvent) -> Result<Vec<ClientAction>, ClientError> {
        match event {
            ClientEvent::ItemDelivered { id, value } => Ok(vec![self.handle_item(id, value)]),
            ClientEvent::SendMessage { text } => self.handle_send_message(&text),
        }
    }

    fn handle_send_message(&mut self, text: &str) -> Result<Vec<ClientAction>, ClientError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(vec![]);
        }

        let record =
            MessageRecord::new(self.session.username(), text, self.env.wall_clock_millis());
        record.validate()?;
        let encoded = record.encode()?;

        let value = match self.session.profile().protection() {
            PayloadProtection::Plain => encoded,
            PayloadProtection::Sealed => {
                let mut random = [0u8; SEAL_RANDOM_SIZE];
                self.env.random_bytes(&mut random);
                sector_crypto::seal(&encoded, self.session.key().as_bytes(), random).to_bytes()
            },
        };

        // No local echo: the message is shown when the engine delivers it back.
        Ok(vec![ClientAction::Append { path: self.session.path().clone(), value }])
    }

    fn handle_item(&mut self, id: ItemId, value: Option<Vec<u8>>) -> ClientAction {
        match self.accept(&id, value) {
            Ok(record) => {
                let position = self.transcript.insert(id.clone(), record.clone());
                self.rendered.insert(id.clone());
                ClientAction::Deliver(DeliveredMessage { id, record, position })
            },
            Err(reason) => {
                tracing::debug!(id = %id, %reason, "inbound item dropped");
                ClientAction::Dropped { id, reason }
            },
        }
    }

    /// Run the inbound checks. The id is only recorded by the caller once the
    /// record is accepted, so a tombstone or a bad payload does not shadow a
    /// later valid delivery under the same id.
    fn accept(&self, id: &ItemId, value: Option<Vec<u8>>) -> Result<MessageRecord, DropReason> {
        let value = value.ok_or(DropReason::Tombstone)?;
        if self.rendered.contains(id) {
            return Err(DropReason::Duplicate);
        }

        let plaintext = match self.session.profile().protection() {
            PayloadProtection::Plain => value,
            PayloadProtection::Sealed => self.open(&value)?,
        };

        MessageRecord::decode(&plaintext).map_err(|_| DropReason::MalformedRecord)
    }

    fn open(&self, value: &[u8]) -> Result<Vec<u8>, DropReason> {
        let sealed = SealedPayload::from_bytes(value).map_err(|_| DropReason::DecryptionFailure)?;
        sector_crypto::open(&sealed, self.session.key().as_bytes())
            .map_err(|_| DropReason::DecryptionFailure)
    }
}
