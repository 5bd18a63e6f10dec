use thiserror::Error;

/// Errors raised by network links and transports.
///
/// The session treats every one of these as a transport failure and resets.
/// Failures inside the socket task surface as a closed connection, so a later
/// send reports [`NotConnected`](TransportError::NotConnected).
#[derive(Debug, Error)]
pub enum TransportError {
    /// The transport has no open connection.
    #[error("Not connected to server")]
    NotConnected,

    /// The background connection task is gone.
    #[error("Connection task channel closed")]
    ChannelClosed,

    /// A connection could not be started.
    #[error("Connection failed: {0}")]
    ConnectFailed(String),
}
