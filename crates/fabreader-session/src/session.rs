//! Session protocol state machine.
//!
//! The session drives the reader's connection to the backend from the
//! device's single cooperative control loop. Every call to [`Session::tick`]
//! runs the same steps in the same order:
//!
//! 1. **Link health**: poll the network link and transport. A dead link or a
//!    closed transport resets the session to `Disconnected` and clears every
//!    handshake timer; a newly opened transport moves it to `Connected`. While
//!    the link is up but the transport is closed, a reconnect is attempted at
//!    most once per `reconnect_interval`.
//! 2. **Registration**: while `Connected`, send `register` when never sent or
//!    when `registration_timeout` has elapsed since the last attempt.
//! 3. **Authentication**: while `Registered`, the same policy with
//!    `authenticate` and `authentication_timeout`.
//! 4. **Heartbeat**: while `Authenticated`, send `heartbeat` every
//!    `heartbeat_interval`.
//! 5. **Inbound dispatch**: drain every buffered frame without blocking,
//!    decode it and hand it to its handler.
//!
//! A failed send is a transport failure: the session resets within the same
//! tick, so no later step sends on a dead connection.
//!
//! Nothing here blocks or sleeps. Waiting is a timestamp comparison against
//! the `now` passed to `tick`, which also lets tests drive time directly.
//!
//! # Examples
//!
//! ```
//! use fabreader_hardware::mock::{MockDisplay, MockNfc};
//! use fabreader_network::mock::MockLink;
//! use fabreader_session::{MemoryStore, Session, SessionState};
//! use std::time::Instant;
//!
//! let (link, link_handle) = MockLink::new();
//! let (display, _) = MockDisplay::new();
//! let (nfc, _) = MockNfc::new();
//!
//! let mut session = Session::builder(link, display, nfc, MemoryStore::new())
//!     .build()
//!     .unwrap();
//! session.setup().unwrap();
//!
//! let now = Instant::now();
//! session.tick(now); // link up, transport connects
//! session.tick(now); // transport open: Connected, register sent
//!
//! assert_eq!(session.state(), SessionState::Connected);
//! assert_eq!(link_handle.transport().sent().len(), 1);
//! ```

use std::collections::VecDeque;
use std::net::IpAddr;
use std::time::Instant;

use fabreader_core::constants::DEVICE_TYPE;
use fabreader_core::{CardUid, KeyMaterial, ReaderCredentials};
use fabreader_hardware::{Display, Icon, NfcReader};
use fabreader_network::{NetworkLink, Transport, TransportStatus};
use fabreader_protocol::payload::{AuthenticateRequest, NfcTap, RegisterRequest};
use fabreader_protocol::{EnvelopeCodec, Message, MessageBuilder, MessageType};
use tracing::{debug, info, trace, warn};

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::state::{MAX_HISTORY_SIZE, SessionState, StateTransition};
use crate::store::{DeviceRecord, DeviceStore};
use crate::timer::RetryTimer;

/// What one call to [`Session::tick`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Frames sent, including handler replies.
    pub sent: usize,

    /// Inbound frames decoded and handed to a handler.
    pub dispatched: usize,

    /// Inbound frames with a type outside the vocabulary.
    pub ignored: usize,

    /// Inbound frames that failed to decode.
    pub dropped: usize,
}

/// Result of [`Session::report_card_tapped`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    /// `nfc_tap` was sent.
    Sent,
    /// The handshake has not completed; nothing was sent.
    NotAuthenticated,
    /// The backend has card checking switched off; nothing was sent.
    CardCheckingDisabled,
    /// The send failed and the session was reset.
    Failed,
}

/// The reader's session with the backend.
///
/// Owns all protocol state. Collaborators are injected through the
/// [`SessionBuilder`] and only ever called synchronously from `tick`,
/// `report_card_tapped` or the handlers they run.
pub struct Session<L, D, N, S> {
    pub(crate) link: L,
    pub(crate) display: D,
    pub(crate) nfc: N,
    pub(crate) store: S,

    pub(crate) config: SessionConfig,
    codec: EnvelopeCodec,

    pub(crate) state: SessionState,
    pub(crate) card_checking_enabled: bool,
    pub(crate) record: DeviceRecord,
    pub(crate) reader_name: Option<String>,

    pub(crate) registration: RetryTimer,
    pub(crate) authentication: RetryTimer,
    pub(crate) heartbeat: RetryTimer,
    reconnect: RetryTimer,

    link_up: bool,
    history: VecDeque<StateTransition>,
    report: TickReport,
}

impl<L, D, N, S> Session<L, D, N, S>
where
    L: NetworkLink,
    D: Display,
    N: NfcReader,
    S: DeviceStore,
{
    /// Start building a session around its collaborators.
    pub fn builder(link: L, display: D, nfc: N, store: S) -> SessionBuilder<L, D, N, S> {
        SessionBuilder {
            link,
            display,
            nfc,
            store,
            config: SessionConfig::default(),
        }
    }

    /// Bring up the network link and show the boot screen.
    ///
    /// # Errors
    ///
    /// Returns an error if the link cannot be set up.
    pub fn setup(&mut self) -> Result<(), SessionError> {
        self.show_icon(Icon::BootLogo);
        self.link.setup()?;
        info!(
            firmware = %self.config.firmware_version,
            registered_before = self.record.credentials.is_some(),
            "Session set up"
        );
        Ok(())
    }

    /// Run one control-loop iteration at `now`.
    pub fn tick(&mut self, now: Instant) -> TickReport {
        self.report = TickReport::default();

        self.link.poll();
        self.check_connection(now);

        if self.state == SessionState::Connected {
            self.maybe_register(now);
        }
        if self.state == SessionState::Registered {
            self.maybe_authenticate(now);
        }
        if self.state == SessionState::Authenticated {
            self.maybe_heartbeat(now);
        }
        if self.state.is_connected() {
            self.drain_inbound(now);
        }

        std::mem::take(&mut self.report)
    }

    /// Run one control-loop iteration at the current time.
    pub fn tick_now(&mut self) -> TickReport {
        self.tick(Instant::now())
    }

    /// Report a card tap to the backend.
    ///
    /// Only sends while authenticated with card checking enabled.
    pub fn report_card_tapped(&mut self, uid: &CardUid, now: Instant) -> TapOutcome {
        if !self.state.is_authenticated() {
            debug!(%uid, state = %self.state, "Tap not reported: not authenticated");
            return TapOutcome::NotAuthenticated;
        }
        if !self.card_checking_enabled {
            debug!(%uid, "Tap not reported: card checking disabled");
            return TapOutcome::CardCheckingDisabled;
        }

        let message = MessageBuilder::request(MessageType::NfcTap)
            .payload(&NfcTap {
                card_uid: uid.clone(),
            })
            .map(MessageBuilder::build);

        match message {
            Ok(message) if self.send(&message, now) => {
                info!(%uid, "Card tap reported");
                TapOutcome::Sent
            }
            Ok(_) => TapOutcome::Failed,
            Err(e) => {
                warn!("Failed to build tap message: {}", e);
                TapOutcome::Failed
            }
        }
    }

    // ------------------------------------------------------------------------
    // Tick steps
    // ------------------------------------------------------------------------

    fn check_connection(&mut self, now: Instant) {
        let healthy = self.link.is_healthy();
        if healthy != self.link_up {
            self.link_up = healthy;
            self.show_icon(if healthy { Icon::WifiOn } else { Icon::WifiOff });
        }

        if !healthy {
            if self.state != SessionState::Disconnected {
                warn!("Network link down");
                self.reset(now);
            } else if self.link.transport().status() != TransportStatus::Disconnected {
                self.link.transport().close();
            }
            return;
        }

        match self.link.transport().status() {
            TransportStatus::Connected => {
                if self.state == SessionState::Disconnected {
                    self.enter_connected(now);
                }
            }
            TransportStatus::Connecting => {
                trace!("Transport connecting");
            }
            TransportStatus::Disconnected => {
                if self.state != SessionState::Disconnected {
                    warn!("Transport closed");
                    self.reset(now);
                }
                if self.reconnect.is_due(now) {
                    self.reconnect.mark(now);
                    debug!("Attempting transport connection");
                    if let Err(e) = self.link.transport().connect() {
                        warn!("Transport connect failed: {}", e);
                    }
                }
            }
        }
    }

    fn maybe_register(&mut self, now: Instant) {
        if !self.registration.is_due(now) {
            trace!(
                remaining_ms = self.registration.remaining(now).as_millis() as u64,
                "Registration pending"
            );
            return;
        }

        let credentials = self.record.credentials.as_ref();
        let request = RegisterRequest {
            device_type: DEVICE_TYPE.to_string(),
            firmware_version: self.config.firmware_version.clone(),
            id: credentials.map(|c| c.id),
            token: credentials.map(|c| c.token.clone()),
        };

        self.registration.mark(now);
        if self.send_payload(MessageType::Register, &request, now) {
            info!("Registration request sent");
        }
    }

    fn maybe_authenticate(&mut self, now: Instant) {
        if !self.authentication.is_due(now) {
            trace!(
                remaining_ms = self.authentication.remaining(now).as_millis() as u64,
                "Authentication pending"
            );
            return;
        }

        let Some(credentials) = self.record.credentials.clone() else {
            warn!("Registered without credentials, registering again");
            self.transition(SessionState::Connected, now);
            self.registration.clear();
            return;
        };

        let request = AuthenticateRequest {
            id: credentials.id,
            token: credentials.token,
        };

        self.authentication.mark(now);
        if self.send_payload(MessageType::Authenticate, &request, now) {
            info!(id = request.id, "Authentication request sent");
        }
    }

    fn maybe_heartbeat(&mut self, now: Instant) {
        if !self.heartbeat.is_due(now) {
            return;
        }

        self.heartbeat.mark(now);
        if self.send(&Message::request(MessageType::Heartbeat), now) {
            trace!("Heartbeat sent");
        }
    }

    fn drain_inbound(&mut self, now: Instant) {
        // Stop as soon as a handler's reply fails and resets the session
        while self.state.is_connected() {
            let Some(text) = self.link.transport().try_recv() else {
                break;
            };
            debug!(frame = %text, "Received frame");

            let message = match self.codec.decode(&text) {
                Ok(message) => message,
                Err(e) => {
                    debug!("Dropping malformed frame: {}", e);
                    self.report.dropped += 1;
                    continue;
                }
            };

            if message.message_type() == MessageType::Other {
                debug!(kind = %message.kind, "Ignoring unknown message type");
                self.report.ignored += 1;
                continue;
            }

            self.report.dispatched += 1;
            if let Err(e) = self.dispatch(&message, now) {
                warn!(kind = %message.kind, "Command rejected: {}", e);
            }
        }
    }

    // ------------------------------------------------------------------------
    // State changes
    // ------------------------------------------------------------------------

    fn enter_connected(&mut self, now: Instant) {
        self.clear_handshake_timers();
        self.transition(SessionState::Connected, now);
        self.show_icon(Icon::ApiConnected);
    }

    /// Drop back to `Disconnected`, closing the transport and forgetting all
    /// handshake progress.
    pub(crate) fn reset(&mut self, now: Instant) {
        self.link.transport().close();
        self.clear_handshake_timers();
        self.card_checking_enabled = false;
        if self.state != SessionState::Disconnected {
            self.transition(SessionState::Disconnected, now);
            self.show_icon(Icon::ApiDisconnected);
        }
    }

    fn clear_handshake_timers(&mut self) {
        self.registration.clear();
        self.authentication.clear();
        self.heartbeat.clear();
    }

    pub(crate) fn transition(&mut self, to: SessionState, now: Instant) {
        let from = self.state;
        if from == to {
            return;
        }

        info!(%from, %to, "Session state changed");
        self.state = to;
        self.history.push_back(StateTransition { from, to, at: now });
        if self.history.len() > MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
    }

    // ------------------------------------------------------------------------
    // Outbound
    // ------------------------------------------------------------------------

    /// Encode and send `message`. A transport error resets the session.
    pub(crate) fn send(&mut self, message: &Message, now: Instant) -> bool {
        let text = match self.codec.encode(message) {
            Ok(text) => text,
            Err(e) => {
                warn!(kind = %message.kind, "Failed to encode message: {}", e);
                return false;
            }
        };

        debug!(frame = %text, "Sending frame");
        match self.link.transport().send_text(&text) {
            Ok(()) => {
                self.report.sent += 1;
                true
            }
            Err(e) => {
                warn!(kind = %message.kind, "Send failed, resetting session: {}", e);
                self.reset(now);
                false
            }
        }
    }

    fn send_payload<T: serde::Serialize>(
        &mut self,
        message_type: MessageType,
        payload: &T,
        now: Instant,
    ) -> bool {
        match MessageBuilder::request(message_type).payload(payload) {
            Ok(builder) => self.send(&builder.build(), now),
            Err(e) => {
                warn!(%message_type, "Failed to build message: {}", e);
                false
            }
        }
    }

    pub(crate) fn persist(&mut self) {
        if let Err(e) = self.store.save(&self.record) {
            warn!("Failed to persist device record: {}", e);
        }
    }

    pub(crate) fn show_icon(&mut self, icon: Icon) {
        if let Err(e) = self.display.show_icon(icon) {
            warn!(%icon, "Display error: {}", e);
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_registered(&self) -> bool {
        self.state.is_registered()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    pub fn card_checking_enabled(&self) -> bool {
        self.card_checking_enabled
    }

    pub fn credentials(&self) -> Option<&ReaderCredentials> {
        self.record.credentials.as_ref()
    }

    pub fn key_material(&self) -> Option<&KeyMaterial> {
        self.record.key_material.as_ref()
    }

    /// Name the backend gave this reader on authentication.
    pub fn reader_name(&self) -> Option<&str> {
        self.reader_name.as_deref()
    }

    pub fn current_ip(&self) -> Option<IpAddr> {
        self.link.current_ip()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Most recent state transitions, oldest first.
    pub fn history(&self) -> &VecDeque<StateTransition> {
        &self.history
    }

    pub fn registration_timer(&self) -> &RetryTimer {
        &self.registration
    }

    pub fn authentication_timer(&self) -> &RetryTimer {
        &self.authentication
    }

    pub fn heartbeat_timer(&self) -> &RetryTimer {
        &self.heartbeat
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn nfc_mut(&mut self) -> &mut N {
        &mut self.nfc
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Take the link down and reset. The next tick after the link reports
    /// healthy again starts a fresh handshake.
    pub fn shutdown(&mut self, now: Instant) {
        self.reset(now);
        self.link.end();
        info!("Session shut down");
    }
}

/// Builder for [`Session`].
///
/// # Examples
///
/// ```
/// use fabreader_hardware::mock::{MockDisplay, MockNfc};
/// use fabreader_network::mock::MockLink;
/// use fabreader_session::{MemoryStore, Session, SessionConfig};
/// use std::time::Duration;
///
/// let config = SessionConfig {
///     heartbeat_interval: Duration::from_secs(60),
///     ..SessionConfig::default()
/// };
///
/// let session = Session::builder(
///     MockLink::new().0,
///     MockDisplay::new().0,
///     MockNfc::new().0,
///     MemoryStore::new(),
/// )
/// .with_config(config)
/// .build()
/// .unwrap();
///
/// assert_eq!(session.heartbeat_timer().interval(), Duration::from_secs(60));
/// ```
#[derive(Debug)]
pub struct SessionBuilder<L, D, N, S> {
    link: L,
    display: D,
    nfc: N,
    store: S,
    config: SessionConfig,
}

impl<L, D, N, S> SessionBuilder<L, D, N, S>
where
    L: NetworkLink,
    D: Display,
    N: NfcReader,
    S: DeviceStore,
{
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate the configuration, load the device record and build.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the store cannot
    /// be read.
    pub fn build(mut self) -> Result<Session<L, D, N, S>, SessionError> {
        self.config.validate()?;
        let record = self.store.load()?;
        let config = self.config;

        Ok(Session {
            link: self.link,
            display: self.display,
            nfc: self.nfc,
            store: self.store,
            codec: EnvelopeCodec::with_max_frame_size(config.max_frame_size),
            state: SessionState::Disconnected,
            card_checking_enabled: false,
            record,
            reader_name: None,
            registration: RetryTimer::new(config.registration_timeout),
            authentication: RetryTimer::new(config.authentication_timeout),
            heartbeat: RetryTimer::new(config.heartbeat_interval),
            reconnect: RetryTimer::new(config.reconnect_interval),
            link_up: false,
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
            report: TickReport::default(),
            config,
        })
    }
}
