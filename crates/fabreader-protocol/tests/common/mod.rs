//! Common test utilities for protocol integration tests.
//!
//! Fixtures here are wire texts as the backend sends them, so tests exercise
//! the decoder against the real shape of each frame.

#![allow(dead_code)]

use fabreader_protocol::{Message, decode};

pub const REGISTRATION_DATA: &str =
    r#"{"is_response":true,"type":"registration_data","payload":{"id":42,"token":"tok-42"}}"#;
pub const AUTHENTICATE_OK: &str =
    r#"{"is_response":true,"type":"authenticate","payload":{"name":"Laser Cutter"}}"#;
pub const AUTHENTICATE_CARD: &str = r#"{"is_response":false,"type":"authenticate","payload":{"keyNumber":1,"authenticationKey":"00112233445566778899AABBCCDDEEFF"}}"#;
pub const REAUTHENTICATE: &str = r#"{"is_response":false,"type":"reauthenticate","payload":{}}"#;
pub const UNAUTHORIZED: &str = r#"{"is_response":false,"type":"unauthorized","payload":{}}"#;
pub const ENABLE_CARD_CHECKING: &str =
    r#"{"is_response":false,"type":"enable_card_checking","payload":{}}"#;
pub const DISABLE_CARD_CHECKING: &str =
    r#"{"is_response":false,"type":"disable_card_checking","payload":{}}"#;
pub const CHANGE_KEYS: &str = r#"{"is_response":false,"type":"change_keys","payload":{"key":"ffeeddccbbaa99887766554433221100"}}"#;
pub const DISPLAY_TEXT: &str = r#"{"is_response":false,"type":"display_text","payload":{"message":"No Resources","duration":10000}}"#;
pub const SHOW_TEXT: &str =
    r#"{"is_response":false,"type":"show_text","payload":{"text":"Welcome"}}"#;

/// Every inbound fixture, for tests that sweep the whole vocabulary.
pub const INBOUND: [&str; 10] = [
    REGISTRATION_DATA,
    AUTHENTICATE_OK,
    AUTHENTICATE_CARD,
    REAUTHENTICATE,
    UNAUTHORIZED,
    ENABLE_CARD_CHECKING,
    DISABLE_CARD_CHECKING,
    CHANGE_KEYS,
    DISPLAY_TEXT,
    SHOW_TEXT,
];

/// Decode a fixture, panicking with the fixture text on failure.
pub fn decode_fixture(text: &str) -> Message {
    decode(text).unwrap_or_else(|e| panic!("fixture failed to decode: {e}\n{text}"))
}
