//! Text codec for protocol envelopes.
//!
//! The WebSocket layer delivers whole text frames, so the codec has no
//! buffering or partial-frame state: one frame is one envelope.
//!
//! ```text
//! Message -> encode -> compact JSON text -> WebSocket text frame
//! WebSocket text frame -> decode -> Message | CodecError
//! ```
//!
//! Decode failures are returned to the caller, who drops the frame. The
//! protocol has no per-frame acknowledgement, so nothing is sent back.
//!
//! # Example
//!
//! ```
//! use fabreader_protocol::{decode, encode, Message, MessageType};
//!
//! let text = encode(&Message::request(MessageType::Heartbeat)).unwrap();
//! assert_eq!(text, r#"{"is_response":false,"type":"heartbeat","payload":{}}"#);
//!
//! let msg = decode(&text).unwrap();
//! assert_eq!(msg.message_type(), MessageType::Heartbeat);
//! ```

use fabreader_core::constants::DEFAULT_MAX_FRAME_SIZE;

use crate::error::CodecError;
use crate::message::Message;

/// Encode an envelope as compact JSON.
///
/// # Errors
/// Returns `CodecError::Json` if serialization fails.
pub fn encode(message: &Message) -> Result<String, CodecError> {
    Ok(serde_json::to_string(message)?)
}

/// Decode an envelope from JSON text without a size limit.
///
/// # Errors
/// Returns `CodecError::Json` for malformed JSON or a missing `type`.
pub fn decode(text: &str) -> Result<Message, CodecError> {
    Ok(serde_json::from_str(text)?)
}

/// Envelope codec with a frame size limit.
#[derive(Debug, Clone)]
pub struct EnvelopeCodec {
    max_frame_size: usize,
}

impl EnvelopeCodec {
    /// Create a codec limited to [`DEFAULT_MAX_FRAME_SIZE`].
    pub fn new() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }

    /// Create a codec with a custom maximum frame size.
    pub fn with_max_frame_size(max_frame_size: usize) -> Self {
        Self { max_frame_size }
    }

    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }

    /// # Errors
    /// Returns `CodecError::FrameTooLarge` if the encoded frame is over the limit.
    pub fn encode(&self, message: &Message) -> Result<String, CodecError> {
        let text = encode(message)?;
        self.check_size(text.len())?;
        Ok(text)
    }

    /// # Errors
    /// Returns `CodecError::FrameTooLarge` before parsing oversized frames,
    /// otherwise the same errors as [`decode`].
    pub fn decode(&self, text: &str) -> Result<Message, CodecError> {
        self.check_size(text.len())?;
        decode(text)
    }

    fn check_size(&self, size: usize) -> Result<(), CodecError> {
        if size > self.max_frame_size {
            return Err(CodecError::FrameTooLarge {
                size,
                max: self.max_frame_size,
            });
        }
        Ok(())
    }
}

impl Default for EnvelopeCodec {
    fn default() -> Self {
        Self::new()
    }
}
