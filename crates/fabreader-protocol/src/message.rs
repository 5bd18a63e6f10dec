use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::CodecError;

/// Ordered key/value payload carried by every envelope.
pub type Payload = Map<String, Value>;

/// Protocol envelope `{is_response, type, payload}`.
///
/// `kind` keeps the raw tag so that unrecognized types survive decoding and
/// can be logged before being ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub is_response: bool,

    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub payload: Payload,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Payload, D::Error> {
    Ok(Option::<Payload>::deserialize(deserializer)?.unwrap_or_default())
}

impl Message {
    pub fn new(is_response: bool, kind: impl Into<String>, payload: Payload) -> Self {
        Message {
            is_response,
            kind: kind.into(),
            payload,
        }
    }

    /// Request with an empty payload.
    pub fn request(message_type: MessageType) -> Self {
        Message::new(false, message_type.as_str(), Payload::new())
    }

    /// Response with an empty payload.
    pub fn response(message_type: MessageType) -> Self {
        Message::new(true, message_type.as_str(), Payload::new())
    }

    /// Recognized type of this message, `MessageType::Other` if the tag is unknown.
    pub fn message_type(&self) -> MessageType {
        MessageType::from_tag(&self.kind)
    }

    /// Get a payload field by name
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.payload.get(name)
    }

    /// Get a string payload field by name
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }

    /// Deserialize the payload into a typed view.
    ///
    /// # Errors
    /// Returns `CodecError::InvalidPayload` if the payload does not match `T`.
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T, CodecError> {
        serde_json::from_value(Value::Object(self.payload.clone())).map_err(|source| {
            CodecError::InvalidPayload {
                kind: self.kind.clone(),
                source,
            }
        })
    }
}

/// Message type vocabulary.
///
/// Inbound types are those the backend sends to the reader; outbound are
/// sent by the reader. `authenticate` travels both ways.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    // Outbound
    Register,
    Heartbeat,
    NfcTap,

    // Both directions
    Authenticate,

    // Inbound
    RegistrationData,
    Reauthenticate,
    Unauthorized,
    EnableCardChecking,
    DisableCardChecking,
    ChangeKeys,
    DisplayText,
    ShowText,

    /// Tag outside the vocabulary.
    Other,
}

impl MessageType {
    const TAGS: [(MessageType, &'static str); 12] = [
        (MessageType::Register, "register"),
        (MessageType::Heartbeat, "heartbeat"),
        (MessageType::NfcTap, "nfc_tap"),
        (MessageType::Authenticate, "authenticate"),
        (MessageType::RegistrationData, "registration_data"),
        (MessageType::Reauthenticate, "reauthenticate"),
        (MessageType::Unauthorized, "unauthorized"),
        (MessageType::EnableCardChecking, "enable_card_checking"),
        (MessageType::DisableCardChecking, "disable_card_checking"),
        (MessageType::ChangeKeys, "change_keys"),
        (MessageType::DisplayText, "display_text"),
        (MessageType::ShowText, "show_text"),
    ];

    /// Wire tag for this type. `Other` has no tag and maps to `""`.
    pub fn as_str(&self) -> &'static str {
        Self::TAGS
            .iter()
            .find(|(ty, _)| ty == self)
            .map_or("", |(_, tag)| tag)
    }

    /// Parse a wire tag. Matching is exact; unknown tags become `Other`.
    pub fn from_tag(tag: &str) -> Self {
        Self::TAGS
            .iter()
            .find(|(_, t)| *t == tag)
            .map_or(MessageType::Other, |(ty, _)| *ty)
    }

    /// Whether the backend may send this type to the reader.
    pub fn is_inbound(&self) -> bool {
        !matches!(
            self,
            MessageType::Register | MessageType::Heartbeat | MessageType::NfcTap | MessageType::Other
        )
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageType::Other => write!(f, "<other>"),
            _ => write!(f, "{}", self.as_str()),
        }
    }
}
