//! Handlers for inbound backend commands.
//!
//! Each recognized message type maps to exactly one handler. A handler may
//! change session state, reply to the backend or call a hardware
//! collaborator. Errors returned here reject the one command and are logged
//! by the caller; they never reset the session.

use std::time::{Duration, Instant};

use fabreader_core::{KeyMaterial, ReaderCredentials};
use fabreader_hardware::{Display, NfcReader};
use fabreader_network::NetworkLink;
use fabreader_protocol::payload::{
    AuthenticationResult, CardAuthenticationRequest, CardAuthenticationResult, ChangeKeys,
    ChangeKeysResult, DisplayText, RegistrationData, ShowText,
};
use fabreader_protocol::{Message, MessageBuilder, MessageType};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::SessionError;
use crate::session::Session;
use crate::state::SessionState;
use crate::store::DeviceStore;

impl<L, D, N, S> Session<L, D, N, S>
where
    L: NetworkLink,
    D: Display,
    N: NfcReader,
    S: DeviceStore,
{
    /// Route one decoded message to its handler.
    pub(crate) fn dispatch(&mut self, message: &Message, now: Instant) -> Result<(), SessionError> {
        match message.message_type() {
            MessageType::RegistrationData => self.on_registration_data(message, now),
            MessageType::Authenticate if message.is_response => {
                self.on_authentication_result(message, now)
            }
            MessageType::Authenticate => self.on_card_authentication(message, now),
            MessageType::Reauthenticate if message.is_response => {
                self.on_authentication_result(message, now)
            }
            MessageType::Reauthenticate => {
                self.on_reauthenticate(now);
                Ok(())
            }
            MessageType::Unauthorized => {
                self.on_unauthorized(now);
                Ok(())
            }
            MessageType::EnableCardChecking => {
                self.set_card_checking(true);
                Ok(())
            }
            MessageType::DisableCardChecking => {
                self.set_card_checking(false);
                Ok(())
            }
            MessageType::ChangeKeys => {
                self.on_change_keys(message, now);
                Ok(())
            }
            MessageType::DisplayText => {
                let payload: DisplayText = message.payload_as()?;
                self.show_text(&payload.message, payload.duration)
            }
            MessageType::ShowText => {
                let payload: ShowText = message.payload_as()?;
                self.show_text(&payload.text, payload.duration)
            }
            // Outbound-only types arriving from the backend
            MessageType::Register | MessageType::Heartbeat | MessageType::NfcTap => {
                debug!(kind = %message.kind, "Ignoring outbound-only message type");
                Ok(())
            }
            MessageType::Other => Ok(()),
        }
    }

    /// `registration_data`: adopt and persist the identity the backend assigned.
    fn on_registration_data(&mut self, message: &Message, now: Instant) -> Result<(), SessionError> {
        let data: RegistrationData = message.payload_as()?;
        let credentials = ReaderCredentials::new(data.id, data.token);

        if self.record.credentials.as_ref() != Some(&credentials) {
            self.record.credentials = Some(credentials);
            self.persist();
        }

        if self.state == SessionState::Connected {
            info!(id = data.id, "Registered with backend");
            self.authentication.clear();
            self.transition(SessionState::Registered, now);
        } else {
            debug!(id = data.id, state = %self.state, "Registration data refreshed");
        }
        Ok(())
    }

    /// Response to our authentication request.
    fn on_authentication_result(
        &mut self,
        message: &Message,
        now: Instant,
    ) -> Result<(), SessionError> {
        if !self.state.is_registered() {
            warn!(state = %self.state, "Authentication result before registration, ignoring");
            return Ok(());
        }

        let result: AuthenticationResult = message.payload_as()?;
        if !result.is_accepted() {
            warn!("Backend rejected authentication, retrying on timer");
            return Ok(());
        }

        if let Some(name) = result.name {
            if let Err(e) = self.show_text(&name, None) {
                warn!(name, "Display error: {}", e);
            }
            self.reader_name = Some(name);
        }

        if self.state == SessionState::Registered {
            info!(name = ?self.reader_name, "Authenticated with backend");
            self.heartbeat.clear();
            self.transition(SessionState::Authenticated, now);
        }
        Ok(())
    }

    /// `authenticate` request: authenticate the card in the field and report
    /// the outcome.
    ///
    /// Every request that passes the state check gets exactly one reply.
    fn on_card_authentication(
        &mut self,
        message: &Message,
        now: Instant,
    ) -> Result<(), SessionError> {
        if !self.state.is_registered() {
            warn!(state = %self.state, "Card authentication before registration, ignoring");
            return Ok(());
        }

        let successful = match self.authenticate_card(message) {
            Ok(successful) => successful,
            Err(e) => {
                warn!("Card authentication failed: {}", e);
                false
            }
        };

        let card_uid = self.nfc.last_uid().cloned();
        info!(successful, card = ?card_uid, "Card authentication finished");

        self.reply(
            MessageType::Authenticate,
            &CardAuthenticationResult {
                authentication_successful: successful,
                card_uid,
            },
            now,
        )
    }

    fn authenticate_card(&mut self, message: &Message) -> Result<bool, SessionError> {
        let request: CardAuthenticationRequest = message.payload_as()?;

        let key = match request.authentication_key.as_deref() {
            Some(text) => KeyMaterial::from_hex(text)?,
            None => self.record.key_material.clone().ok_or_else(|| {
                fabreader_core::Error::InvalidKeyMaterial("no key provisioned".into())
            })?,
        };

        Ok(self.nfc.authenticate_card(request.key_number, &key)?)
    }

    /// `reauthenticate` request: drop back to `Registered` and authenticate
    /// again on the next tick.
    fn on_reauthenticate(&mut self, now: Instant) {
        if !self.state.is_registered() {
            debug!(state = %self.state, "Reauthenticate before registration, ignoring");
            return;
        }

        info!("Backend requested reauthentication");
        self.authentication.clear();
        self.heartbeat.clear();
        self.transition(SessionState::Registered, now);
    }

    /// `unauthorized`: the backend revoked our authentication.
    ///
    /// Only authentication is redone; the registration stays valid, so the
    /// session never re-registers or disconnects because of this message.
    fn on_unauthorized(&mut self, now: Instant) {
        if !self.state.is_registered() {
            debug!(state = %self.state, "Unauthorized before registration, ignoring");
            return;
        }

        warn!("Backend reports reader unauthorized");
        self.authentication.clear();
        self.heartbeat.clear();
        self.transition(SessionState::Registered, now);
    }

    fn set_card_checking(&mut self, enabled: bool) {
        if self.card_checking_enabled != enabled {
            info!(enabled, "Card checking changed");
        }
        self.card_checking_enabled = enabled;
    }

    /// `change_keys`: replace the card key. Malformed keys leave the current
    /// key in place.
    fn on_change_keys(&mut self, message: &Message, now: Instant) {
        let updated = message
            .payload_as::<ChangeKeys>()
            .map_err(SessionError::from)
            .and_then(|payload| Ok(KeyMaterial::from_hex(&payload.key)?));

        let success = match updated {
            Ok(key) => {
                self.record.key_material = Some(key);
                self.persist();
                info!("Card key material updated");
                true
            }
            Err(e) => {
                warn!("Rejected key change: {}", e);
                false
            }
        };

        if let Err(e) = self.reply(MessageType::ChangeKeys, &ChangeKeysResult { success }, now) {
            warn!("Failed to answer key change: {}", e);
        }
    }

    fn show_text(&mut self, text: &str, duration_ms: Option<u64>) -> Result<(), SessionError> {
        let duration = duration_ms.map(Duration::from_millis);
        debug!(text, ?duration, "Showing text");
        self.display.show_text(text, duration)?;
        Ok(())
    }

    fn reply<T: Serialize>(
        &mut self,
        message_type: MessageType,
        payload: &T,
        now: Instant,
    ) -> Result<(), SessionError> {
        let message = MessageBuilder::response(message_type)
            .payload(payload)?
            .build();
        self.send(&message, now);
        Ok(())
    }
}
