use thiserror::Error;

/// Errors raised while encoding, decoding or interpreting envelopes.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The frame is not a valid JSON envelope.
    #[error("Malformed envelope: {0}")]
    Json(#[from] serde_json::Error),

    /// The frame exceeds the configured size limit.
    #[error("Frame of {size} bytes exceeds limit of {max} bytes")]
    FrameTooLarge { size: usize, max: usize },

    /// The payload does not have the shape the message type requires.
    #[error("Invalid payload for '{kind}': {source}")]
    InvalidPayload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    /// A payload value serialized to something other than a JSON object.
    #[error("Payload for '{0}' must be a JSON object")]
    PayloadNotObject(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_too_large_display() {
        let err = CodecError::FrameTooLarge { size: 10, max: 5 };
        assert_eq!(err.to_string(), "Frame of 10 bytes exceeds limit of 5 bytes");
    }

    #[test]
    fn test_json_error_converts() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: CodecError = json_err.into();
        assert!(matches!(err, CodecError::Json(_)));
    }
}
