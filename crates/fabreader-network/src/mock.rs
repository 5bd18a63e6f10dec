//! In-memory link and transport for tests.
//!
//! Tests keep the handles to script the backend side: push inbound frames,
//! inspect what was sent, drop the connection or take the link down.

use std::collections::VecDeque;
use std::net::IpAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::TransportError;
use crate::link::NetworkLink;
use crate::transport::{Transport, TransportStatus};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug)]
struct TransportState {
    status: TransportStatus,
    auto_connect: bool,
    fail_sends: bool,
    connect_attempts: usize,
    sent: Vec<String>,
    inbound: VecDeque<String>,
}

/// Transport that records sent frames and replays scripted inbound ones.
///
/// By default `connect` succeeds immediately. With auto-connect disabled the
/// transport stays `Connecting` until the handle calls
/// [`open`](MockTransportHandle::open).
#[derive(Debug)]
pub struct MockTransport {
    state: Arc<Mutex<TransportState>>,
}

impl MockTransport {
    pub fn new() -> (Self, MockTransportHandle) {
        let state = Arc::new(Mutex::new(TransportState {
            status: TransportStatus::Disconnected,
            auto_connect: true,
            fail_sends: false,
            connect_attempts: 0,
            sent: Vec::new(),
            inbound: VecDeque::new(),
        }));
        let handle = MockTransportHandle {
            state: Arc::clone(&state),
        };
        (Self { state }, handle)
    }
}

impl Transport for MockTransport {
    fn connect(&mut self) -> Result<(), TransportError> {
        let mut state = lock(&self.state);
        if state.status != TransportStatus::Disconnected {
            return Ok(());
        }
        state.connect_attempts += 1;
        state.status = if state.auto_connect {
            TransportStatus::Connected
        } else {
            TransportStatus::Connecting
        };
        Ok(())
    }

    fn status(&mut self) -> TransportStatus {
        lock(&self.state).status
    }

    fn send_text(&mut self, text: &str) -> Result<(), TransportError> {
        let mut state = lock(&self.state);
        if state.status != TransportStatus::Connected {
            return Err(TransportError::NotConnected);
        }
        if state.fail_sends {
            return Err(TransportError::ChannelClosed);
        }
        state.sent.push(text.to_string());
        Ok(())
    }

    fn try_recv(&mut self) -> Option<String> {
        let mut state = lock(&self.state);
        if state.status != TransportStatus::Connected {
            return None;
        }
        state.inbound.pop_front()
    }

    fn close(&mut self) {
        let mut state = lock(&self.state);
        state.status = TransportStatus::Disconnected;
        state.inbound.clear();
    }
}

/// Backend-side handle for a [`MockTransport`].
#[derive(Debug, Clone)]
pub struct MockTransportHandle {
    state: Arc<Mutex<TransportState>>,
}

impl MockTransportHandle {
    /// Queue a frame for the device to receive.
    pub fn push_frame(&self, text: impl Into<String>) {
        lock(&self.state).inbound.push_back(text.into());
    }

    /// Frames sent by the device so far.
    pub fn sent(&self) -> Vec<String> {
        lock(&self.state).sent.clone()
    }

    /// Drain the sent frames.
    pub fn take_sent(&self) -> Vec<String> {
        std::mem::take(&mut lock(&self.state).sent)
    }

    pub fn connect_attempts(&self) -> usize {
        lock(&self.state).connect_attempts
    }

    pub fn is_connected(&self) -> bool {
        lock(&self.state).status == TransportStatus::Connected
    }

    pub fn set_auto_connect(&self, auto_connect: bool) {
        lock(&self.state).auto_connect = auto_connect;
    }

    /// Complete a pending connection attempt.
    pub fn open(&self) {
        lock(&self.state).status = TransportStatus::Connected;
    }

    /// Simulate the server dropping the connection.
    pub fn drop_connection(&self) {
        let mut state = lock(&self.state);
        state.status = TransportStatus::Disconnected;
        state.inbound.clear();
    }

    /// Make every send fail while the connection still looks open.
    pub fn set_fail_sends(&self, fail: bool) {
        lock(&self.state).fail_sends = fail;
    }
}

#[derive(Debug)]
struct LinkState {
    healthy: bool,
    ip: Option<IpAddr>,
    setup_calls: usize,
}

/// Link whose health is controlled by a [`MockLinkHandle`].
///
/// The link starts healthy once `setup` has been called.
#[derive(Debug)]
pub struct MockLink {
    state: Arc<Mutex<LinkState>>,
    transport: MockTransport,
}

impl MockLink {
    pub fn new() -> (Self, MockLinkHandle) {
        let (transport, transport_handle) = MockTransport::new();
        let state = Arc::new(Mutex::new(LinkState {
            healthy: false,
            ip: Some(IpAddr::from([10, 0, 0, 42])),
            setup_calls: 0,
        }));
        let handle = MockLinkHandle {
            state: Arc::clone(&state),
            transport: transport_handle,
        };
        (Self { state, transport }, handle)
    }
}

impl NetworkLink for MockLink {
    type Transport = MockTransport;

    fn setup(&mut self) -> Result<(), TransportError> {
        let mut state = lock(&self.state);
        state.setup_calls += 1;
        state.healthy = true;
        Ok(())
    }

    fn poll(&mut self) {}

    fn is_healthy(&self) -> bool {
        lock(&self.state).healthy
    }

    fn current_ip(&self) -> Option<IpAddr> {
        let state = lock(&self.state);
        state.healthy.then_some(state.ip).flatten()
    }

    fn end(&mut self) {
        self.transport.close();
        lock(&self.state).healthy = false;
    }

    fn transport(&mut self) -> &mut MockTransport {
        &mut self.transport
    }
}

/// Handle for a [`MockLink`] and its transport.
#[derive(Debug, Clone)]
pub struct MockLinkHandle {
    state: Arc<Mutex<LinkState>>,
    transport: MockTransportHandle,
}

impl MockLinkHandle {
    /// Bring the link up or down. Going down also drops the connection.
    pub fn set_healthy(&self, healthy: bool) {
        lock(&self.state).healthy = healthy;
        if !healthy {
            self.transport.drop_connection();
        }
    }

    pub fn set_ip(&self, ip: Option<IpAddr>) {
        lock(&self.state).ip = ip;
    }

    pub fn setup_calls(&self) -> usize {
        lock(&self.state).setup_calls
    }

    pub fn transport(&self) -> &MockTransportHandle {
        &self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_requires_connection() {
        let (mut transport, handle) = MockTransport::new();
        assert!(matches!(
            transport.send_text("x"),
            Err(TransportError::NotConnected)
        ));

        transport.connect().unwrap();
        transport.send_text("hello").unwrap();
        assert_eq!(handle.sent(), vec!["hello".to_string()]);
        assert_eq!(handle.connect_attempts(), 1);
    }

    #[test]
    fn test_pending_connection() {
        let (mut transport, handle) = MockTransport::new();
        handle.set_auto_connect(false);
        transport.connect().unwrap();
        assert_eq!(transport.status(), TransportStatus::Connecting);

        // A second connect while pending does not start another attempt
        transport.connect().unwrap();
        assert_eq!(handle.connect_attempts(), 1);

        handle.open();
        assert_eq!(transport.status(), TransportStatus::Connected);
    }

    #[test]
    fn test_frames_received_in_order() {
        let (mut transport, handle) = MockTransport::new();
        transport.connect().unwrap();
        handle.push_frame("a");
        handle.push_frame("b");

        assert_eq!(transport.try_recv().as_deref(), Some("a"));
        assert_eq!(transport.try_recv().as_deref(), Some("b"));
        assert_eq!(transport.try_recv(), None);
    }

    #[test]
    fn test_failing_sends() {
        let (mut transport, handle) = MockTransport::new();
        transport.connect().unwrap();
        handle.set_fail_sends(true);
        assert!(transport.send_text("x").is_err());
        assert!(handle.sent().is_empty());
    }

    #[test]
    fn test_link_health() {
        let (mut link, handle) = MockLink::new();
        assert!(!link.is_healthy());

        link.setup().unwrap();
        assert!(link.is_healthy());
        assert_eq!(link.current_ip(), Some(IpAddr::from([10, 0, 0, 42])));

        link.transport().connect().unwrap();
        handle.set_healthy(false);
        assert!(!link.is_healthy());
        assert_eq!(link.current_ip(), None);
        assert!(!handle.transport().is_connected());
    }
}
