//! Message transport abstraction.

use crate::error::TransportError;

/// Connection status reported by a [`Transport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportStatus {
    Disconnected,
    /// A connection attempt is in flight.
    Connecting,
    Connected,
}

/// A message-oriented connection carrying whole text frames.
///
/// All methods are non-blocking. Implementations that do their I/O elsewhere
/// (a background task, an interrupt handler) only exchange buffered state
/// here. `status` and `try_recv` take `&mut self` so they can absorb that
/// state as a side effect.
pub trait Transport {
    /// Start connecting. Progress is observed through [`status`](Self::status).
    ///
    /// Calling this while connecting or connected is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the attempt cannot be started at all.
    fn connect(&mut self) -> Result<(), TransportError>;

    fn status(&mut self) -> TransportStatus;

    /// Queue one text frame for sending.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport is not connected or the connection
    /// has failed.
    fn send_text(&mut self, text: &str) -> Result<(), TransportError>;

    /// Next buffered inbound frame, if any.
    fn try_recv(&mut self) -> Option<String>;

    /// Close the connection and discard buffered frames.
    fn close(&mut self);
}
