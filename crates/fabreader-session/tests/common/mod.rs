//! Shared harness for session integration tests.
//!
//! Wraps a session built from mock collaborators together with the handles
//! that script them, and a clock the test advances by hand.

#![allow(dead_code)]

use std::time::{Duration, Instant};

use fabreader_core::CardUid;
use fabreader_hardware::mock::{MockDisplay, MockDisplayHandle, MockNfc, MockNfcHandle};
use fabreader_network::mock::{MockLink, MockLinkHandle, MockTransportHandle};
use fabreader_protocol::{Message, MessageType, decode};
use fabreader_session::{
    MemoryStore, Session, SessionConfig, SessionState, TapOutcome, TickReport,
};

pub type TestSession = Session<MockLink, MockDisplay, MockNfc, MemoryStore>;

pub const REGISTRATION_DATA: &str =
    r#"{"is_response":true,"type":"registration_data","payload":{"id":42,"token":"tok-42"}}"#;
pub const AUTHENTICATE_OK: &str =
    r#"{"is_response":true,"type":"authenticate","payload":{"name":"Laser Cutter"}}"#;
pub const AUTHENTICATE_REJECTED: &str =
    r#"{"is_response":true,"type":"authenticate","payload":{"authenticated":false}}"#;
pub const REAUTHENTICATE: &str = r#"{"is_response":false,"type":"reauthenticate","payload":{}}"#;
pub const UNAUTHORIZED: &str = r#"{"is_response":false,"type":"unauthorized","payload":{}}"#;
pub const ENABLE_CARD_CHECKING: &str =
    r#"{"is_response":false,"type":"enable_card_checking","payload":{}}"#;
pub const DISABLE_CARD_CHECKING: &str =
    r#"{"is_response":false,"type":"disable_card_checking","payload":{}}"#;
pub const DISPLAY_TEXT: &str = r#"{"is_response":false,"type":"display_text","payload":{"message":"No Resources","duration":10000}}"#;
pub const SHOW_TEXT: &str =
    r#"{"is_response":false,"type":"show_text","payload":{"text":"Welcome"}}"#;

pub const KEY_HEX: &str = "00112233445566778899AABBCCDDEEFF";
pub const OTHER_KEY_HEX: &str = "FFEEDDCCBBAA99887766554433221100";

pub fn change_keys(key: &str) -> String {
    format!(r#"{{"is_response":false,"type":"change_keys","payload":{{"key":"{key}"}}}}"#)
}

pub fn card_authentication(key_number: u8, key: Option<&str>) -> String {
    match key {
        Some(key) => format!(
            r#"{{"is_response":false,"type":"authenticate","payload":{{"keyNumber":{key_number},"authenticationKey":"{key}"}}}}"#
        ),
        None => format!(
            r#"{{"is_response":false,"type":"authenticate","payload":{{"keyNumber":{key_number}}}}}"#
        ),
    }
}

pub struct Harness {
    pub session: TestSession,
    pub link: MockLinkHandle,
    pub display: MockDisplayHandle,
    pub nfc: MockNfcHandle,
    pub now: Instant,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(SessionConfig::default(), MemoryStore::new())
    }

    pub fn with_store(store: MemoryStore) -> Self {
        Self::build(SessionConfig::default(), store)
    }

    pub fn with_config(config: SessionConfig) -> Self {
        Self::build(config, MemoryStore::new())
    }

    fn build(config: SessionConfig, store: MemoryStore) -> Self {
        let (link, link_handle) = MockLink::new();
        let (display, display_handle) = MockDisplay::new();
        let (nfc, nfc_handle) = MockNfc::new();

        let mut session = Session::builder(link, display, nfc, store)
            .with_config(config)
            .build()
            .unwrap();
        session.setup().unwrap();

        Self {
            session,
            link: link_handle,
            display: display_handle,
            nfc: nfc_handle,
            now: Instant::now(),
        }
    }

    pub fn transport(&self) -> &MockTransportHandle {
        self.link.transport()
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn tick(&mut self) -> TickReport {
        self.session.tick(self.now)
    }

    /// Move the clock forward, then tick.
    pub fn advance(&mut self, by: Duration) -> TickReport {
        self.now += by;
        self.tick()
    }

    /// Report a card tap at the harness clock.
    pub fn tap(&mut self, uid: &CardUid) -> TapOutcome {
        self.session.report_card_tapped(uid, self.now)
    }

    pub fn push(&self, frame: &str) {
        self.transport().push_frame(frame);
    }

    /// Drain and decode everything the device sent.
    pub fn take_sent(&self) -> Vec<Message> {
        self.transport()
            .take_sent()
            .iter()
            .map(|text| decode(text).unwrap())
            .collect()
    }

    /// Tick until the transport is open and the first `register` is out.
    pub fn connect(&mut self) {
        self.tick();
        self.tick();
        assert_eq!(self.state(), SessionState::Connected);
    }

    pub fn register(&mut self) {
        self.connect();
        self.push(REGISTRATION_DATA);
        self.tick();
        assert_eq!(self.state(), SessionState::Registered);
    }

    /// Complete the handshake. The sent queue is drained afterwards.
    pub fn authenticate(&mut self) {
        self.register();
        self.tick();
        self.push(AUTHENTICATE_OK);
        self.tick();
        assert_eq!(self.state(), SessionState::Authenticated);
        self.take_sent();
    }
}

pub fn types(messages: &[Message]) -> Vec<MessageType> {
    messages.iter().map(Message::message_type).collect()
}

/// Outbound `authenticate` requests, as opposed to card-exchange replies.
pub fn is_auth_request(message: &Message) -> bool {
    message.message_type() == MessageType::Authenticate && !message.is_response
}
