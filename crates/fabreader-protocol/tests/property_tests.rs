//! Property-based tests for the envelope codec.
//!
//! Generated envelopes must survive encoding and decoding unchanged, payload
//! key order included, and no input text may make the codec panic.

use fabreader_protocol::{EnvelopeCodec, Message, MessageType, Payload, decode, encode};
use proptest::prelude::*;
use serde_json::Value;

const KNOWN_TAGS: [&str; 12] = [
    "register",
    "heartbeat",
    "nfc_tap",
    "authenticate",
    "registration_data",
    "reauthenticate",
    "unauthorized",
    "enable_card_checking",
    "disable_card_checking",
    "change_keys",
    "display_text",
    "show_text",
];

/// Known tags most of the time, arbitrary snake_case tags otherwise.
fn tag() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => prop::sample::select(KNOWN_TAGS.to_vec()).prop_map(String::from),
        1 => prop::string::string_regex("[a-z][a-z_]{0,23}")
            .expect("Failed to create tag regex strategy"),
    ]
}

/// Scalar payload values as the backend sends them.
fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        any::<u64>().prop_map(Value::from),
        ".{0,40}".prop_map(Value::from),
        Just(Value::Null),
    ]
}

/// Flat payload with unique keys in generation order.
fn payload() -> impl Strategy<Value = Payload> {
    prop::collection::vec(("[a-zA-Z][a-zA-Z0-9_]{0,15}", scalar()), 0..8).prop_map(|entries| {
        let mut payload = Payload::new();
        for (key, value) in entries {
            payload.entry(key).or_insert(value);
        }
        payload
    })
}

fn keys(payload: &Payload) -> Vec<String> {
    payload.keys().cloned().collect()
}

proptest! {
    #[test]
    fn prop_envelope_roundtrip(
        is_response in any::<bool>(),
        kind in tag(),
        payload in payload(),
    ) {
        let message = Message::new(is_response, kind, payload);

        let text = encode(&message).unwrap();
        let decoded = decode(&text).unwrap();

        prop_assert_eq!(&decoded, &message);
        prop_assert_eq!(keys(&decoded.payload), keys(&message.payload));
        prop_assert_eq!(encode(&decoded).unwrap(), text);
    }

    #[test]
    fn prop_tag_lookup_consistent(kind in tag()) {
        let message_type = MessageType::from_tag(&kind);
        if KNOWN_TAGS.contains(&kind.as_str()) {
            prop_assert_eq!(message_type.as_str(), kind.as_str());
        } else {
            prop_assert_eq!(message_type, MessageType::Other);
        }
    }

    #[test]
    fn prop_decode_never_panics(text in ".{0,256}") {
        let codec = EnvelopeCodec::with_max_frame_size(128);
        // Any outcome is fine as long as it is a value
        let _ = codec.decode(&text);
        let _ = decode(&text);
    }

    #[test]
    fn prop_oversized_frames_rejected_unparsed(padding in 0usize..64) {
        let codec = EnvelopeCodec::with_max_frame_size(64);
        let text = format!(
            r#"{{"is_response":false,"type":"show_text","payload":{{"text":"{}"}}}}"#,
            "x".repeat(64 + padding)
        );
        prop_assert!(codec.decode(&text).is_err());
    }
}
