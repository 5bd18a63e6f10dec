use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the session and its device store.
///
/// `Session::tick` never returns these; they are logged and absorbed there.
/// They reach callers only from setup, construction and store access.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Transport error: {0}")]
    Transport(#[from] fabreader_network::TransportError),

    #[error("Codec error: {0}")]
    Codec(#[from] fabreader_protocol::CodecError),

    #[error("Hardware error: {0}")]
    Hardware(#[from] fabreader_hardware::HardwareError),

    #[error(transparent)]
    Core(#[from] fabreader_core::Error),

    #[error("Device store error at {path}: {source}")]
    Store {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Device store format error: {0}")]
    StoreFormat(#[from] serde_json::Error),

    #[error("Invalid session configuration: {0}")]
    InvalidConfig(String),
}

impl SessionError {
    pub fn store(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Store {
            path: path.into(),
            source,
        }
    }
}
