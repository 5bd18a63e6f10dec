//! WebSocket transport over tokio-tungstenite.
//!
//! The socket is driven by a task spawned on the caller's tokio runtime. The
//! task and the transport talk only through unbounded channels, so every
//! [`Transport`] method stays non-blocking:
//!
//! ```text
//! Session ── send_text ──> outgoing channel ──> task ──> WebSocket
//! Session <── try_recv ─── event channel   <── task <── WebSocket
//! ```
//!
//! Dropping the outgoing sender (on [`close`](Transport::close) or drop) makes
//! the task send a close frame and exit.

use std::collections::VecDeque;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc::{self, error::TryRecvError};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, trace, warn};

use crate::error::TransportError;
use crate::transport::{Transport, TransportStatus};

/// Configuration for [`WebSocketTransport`].
///
/// # Example
///
/// ```
/// use fabreader_network::WebSocketConfig;
///
/// let config = WebSocketConfig::new("ws://10.0.0.5:8080/api/fabreader/websocket");
/// assert_eq!(config.connect_timeout.as_secs(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct WebSocketConfig {
    /// Full `ws://` or `wss://` URL including the resource path.
    pub url: String,

    /// Upper bound for the TCP connect and WebSocket upgrade.
    pub connect_timeout: Duration,
}

impl WebSocketConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug)]
enum SocketEvent {
    Opened,
    Frame(String),
    Closed,
}

/// Non-blocking WebSocket [`Transport`].
///
/// Must be used from within a tokio runtime; `connect` fails otherwise.
#[derive(Debug)]
pub struct WebSocketTransport {
    config: WebSocketConfig,
    status: TransportStatus,
    outgoing_tx: Option<mpsc::UnboundedSender<String>>,
    events_rx: Option<mpsc::UnboundedReceiver<SocketEvent>>,
    inbox: VecDeque<String>,
}

impl WebSocketTransport {
    pub fn new(config: WebSocketConfig) -> Self {
        debug!("Creating WebSocket transport for {}", config.url);
        Self {
            config,
            status: TransportStatus::Disconnected,
            outgoing_tx: None,
            events_rx: None,
            inbox: VecDeque::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Absorb everything the socket task has reported since the last call.
    fn pump(&mut self) {
        let Some(events_rx) = self.events_rx.as_mut() else {
            return;
        };

        let mut closed = false;
        loop {
            match events_rx.try_recv() {
                Ok(SocketEvent::Opened) => {
                    info!("WebSocket connected to {}", self.config.url);
                    self.status = TransportStatus::Connected;
                }
                Ok(SocketEvent::Frame(text)) => self.inbox.push_back(text),
                Ok(SocketEvent::Closed) | Err(TryRecvError::Disconnected) => {
                    closed = true;
                    break;
                }
                Err(TryRecvError::Empty) => break,
            }
        }

        if closed {
            if self.status != TransportStatus::Disconnected {
                info!("WebSocket to {} closed", self.config.url);
            }
            self.status = TransportStatus::Disconnected;
            self.outgoing_tx = None;
            self.events_rx = None;
        }
    }
}

impl Transport for WebSocketTransport {
    fn connect(&mut self) -> Result<(), TransportError> {
        self.pump();
        if self.status != TransportStatus::Disconnected {
            return Ok(());
        }

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| TransportError::ConnectFailed(e.to_string()))?;

        let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        info!("Connecting to {}", self.config.url);
        runtime.spawn(run_socket(self.config.clone(), events_tx, outgoing_rx));

        self.outgoing_tx = Some(outgoing_tx);
        self.events_rx = Some(events_rx);
        self.inbox.clear();
        self.status = TransportStatus::Connecting;
        Ok(())
    }

    fn status(&mut self) -> TransportStatus {
        self.pump();
        self.status
    }

    fn send_text(&mut self, text: &str) -> Result<(), TransportError> {
        self.pump();
        if self.status != TransportStatus::Connected {
            return Err(TransportError::NotConnected);
        }

        let outgoing_tx = self.outgoing_tx.as_ref().ok_or(TransportError::NotConnected)?;
        outgoing_tx
            .send(text.to_string())
            .map_err(|_| TransportError::ChannelClosed)
    }

    fn try_recv(&mut self) -> Option<String> {
        self.pump();
        self.inbox.pop_front()
    }

    fn close(&mut self) {
        if self.outgoing_tx.take().is_some() {
            debug!("Closing WebSocket to {}", self.config.url);
        }
        // The task finishes on its own once it sees the sender gone
        self.events_rx = None;
        self.inbox.clear();
        self.status = TransportStatus::Disconnected;
    }
}

impl Drop for WebSocketTransport {
    fn drop(&mut self) {
        self.close();
    }
}

async fn run_socket(
    config: WebSocketConfig,
    events_tx: mpsc::UnboundedSender<SocketEvent>,
    mut outgoing_rx: mpsc::UnboundedReceiver<String>,
) {
    let connect = connect_async(config.url.as_str());
    let stream = match tokio::time::timeout(config.connect_timeout, connect).await {
        Ok(Ok((stream, _response))) => stream,
        Ok(Err(e)) => {
            warn!("WebSocket connection to {} failed: {}", config.url, e);
            let _ = events_tx.send(SocketEvent::Closed);
            return;
        }
        Err(_) => {
            warn!(
                "WebSocket connection to {} timed out after {}ms",
                config.url,
                config.connect_timeout.as_millis()
            );
            let _ = events_tx.send(SocketEvent::Closed);
            return;
        }
    };

    if events_tx.send(SocketEvent::Opened).is_err() {
        return;
    }

    let (mut write, mut read) = stream.split();

    loop {
        tokio::select! {
            outgoing = outgoing_rx.recv() => match outgoing {
                Some(text) => {
                    trace!(len = text.len(), "Writing text frame");
                    if let Err(e) = write.send(Message::Text(text)).await {
                        warn!("WebSocket write failed: {}", e);
                        break;
                    }
                }
                None => {
                    let _ = write.send(Message::Close(None)).await;
                    break;
                }
            },
            incoming = read.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    if events_tx.send(SocketEvent::Frame(text)).is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    debug!(?frame, "Server closed WebSocket");
                    break;
                }
                Some(Ok(Message::Binary(data))) => {
                    debug!(len = data.len(), "Ignoring binary frame");
                }
                // Ping replies are queued by tungstenite itself
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!("WebSocket read failed: {}", e);
                    break;
                }
                None => break,
            },
        }
    }

    let _ = events_tx.send(SocketEvent::Closed);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_outside_runtime_fails() {
        let mut transport = WebSocketTransport::new(WebSocketConfig::new("ws://127.0.0.1:9/ws"));
        assert!(matches!(
            transport.connect(),
            Err(TransportError::ConnectFailed(_))
        ));
        assert_eq!(transport.status(), TransportStatus::Disconnected);
    }

    #[test]
    fn test_send_before_connect() {
        let mut transport = WebSocketTransport::new(WebSocketConfig::new("ws://127.0.0.1:9/ws"));
        assert!(matches!(
            transport.send_text("{}"),
            Err(TransportError::NotConnected)
        ));
        assert_eq!(transport.try_recv(), None);
    }
}
