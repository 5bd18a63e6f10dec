use serde::Serialize;
use serde_json::Value;

use crate::error::CodecError;
use crate::message::{Message, MessageType, Payload};

/// Builder for protocol envelopes with a fluent API
///
/// # Example
/// ```
/// use fabreader_protocol::{MessageBuilder, MessageType};
/// use fabreader_protocol::payload::ChangeKeysResult;
///
/// let msg = MessageBuilder::response(MessageType::ChangeKeys)
///     .payload(&ChangeKeysResult { success: true })
///     .unwrap()
///     .build();
///
/// assert!(msg.is_response);
/// assert_eq!(msg.payload["success"], true);
/// ```
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    is_response: bool,
    message_type: MessageType,
    payload: Payload,
}

impl MessageBuilder {
    /// Start a request envelope
    pub fn request(message_type: MessageType) -> Self {
        MessageBuilder {
            is_response: false,
            message_type,
            payload: Payload::new(),
        }
    }

    /// Start a response envelope
    pub fn response(message_type: MessageType) -> Self {
        MessageBuilder {
            is_response: true,
            ..Self::request(message_type)
        }
    }

    /// Set a single payload field
    ///
    /// Fields keep insertion order on the wire.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(name.into(), value.into());
        self
    }

    /// Merge a typed payload into the envelope
    ///
    /// # Errors
    /// Returns error if `value` does not serialize to a JSON object.
    pub fn payload<T: Serialize>(mut self, value: &T) -> Result<Self, CodecError> {
        match serde_json::to_value(value)? {
            Value::Object(map) => {
                self.payload.extend(map);
                Ok(self)
            }
            _ => Err(CodecError::PayloadNotObject(
                self.message_type.as_str().to_string(),
            )),
        }
    }

    /// Build the message
    pub fn build(self) -> Message {
        Message::new(self.is_response, self.message_type.as_str(), self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_with_fields() {
        let msg = MessageBuilder::request(MessageType::Authenticate)
            .field("id", 3)
            .field("token", "t0k")
            .build();

        assert!(!msg.is_response);
        assert_eq!(msg.kind, "authenticate");
        assert_eq!(msg.payload["id"], 3);
        assert_eq!(msg.payload["token"], "t0k");
    }

    #[test]
    fn test_payload_merges_object() {
        #[derive(Serialize)]
        struct P {
            a: u8,
        }

        let msg = MessageBuilder::request(MessageType::Heartbeat)
            .field("first", true)
            .payload(&P { a: 1 })
            .unwrap()
            .build();

        let keys: Vec<&str> = msg.payload.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["first", "a"]);
    }

    #[test]
    fn test_payload_rejects_non_object() {
        let result = MessageBuilder::request(MessageType::NfcTap).payload(&json!([1, 2]));
        assert!(matches!(result, Err(CodecError::PayloadNotObject(_))));
    }
}
