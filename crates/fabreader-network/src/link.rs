//! Physical network link abstraction.
//!
//! A link is the medium underneath the transport (wired or wireless on the
//! device, the host's network stack on a development machine). The session
//! is generic over [`NetworkLink`] and never names a concrete medium.

use std::net::{IpAddr, SocketAddr, UdpSocket};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::TransportError;
use crate::transport::Transport;

/// A physical network link owning the transport that runs over it.
pub trait NetworkLink {
    type Transport: Transport;

    /// Bring the link up.
    ///
    /// # Errors
    ///
    /// Returns an error if the link hardware cannot be initialized.
    fn setup(&mut self) -> Result<(), TransportError>;

    /// Service the link. Called once per control-loop tick.
    fn poll(&mut self);

    fn is_healthy(&self) -> bool;

    /// Address currently assigned to this device on the link.
    fn current_ip(&self) -> Option<IpAddr>;

    /// Take the link down, closing the transport.
    fn end(&mut self);

    fn transport(&mut self) -> &mut Self::Transport;
}

/// Configuration for [`HostLink`].
#[derive(Debug, Clone)]
pub struct HostLinkConfig {
    /// Address the link routes towards when probing for a local IP.
    /// No packets are sent to it.
    pub probe_addr: SocketAddr,

    /// Minimum time between probes.
    pub probe_interval: Duration,
}

impl Default for HostLinkConfig {
    fn default() -> Self {
        Self {
            probe_addr: SocketAddr::from(([192, 0, 2, 1], 80)),
            probe_interval: Duration::from_secs(5),
        }
    }
}

/// Link backed by the host operating system's network stack.
///
/// The link is healthy while the host has a route towards `probe_addr`. The
/// route is found by connecting a UDP socket, which only consults the routing
/// table.
#[derive(Debug)]
pub struct HostLink<T> {
    config: HostLinkConfig,
    transport: T,
    ip: Option<IpAddr>,
    last_probe: Option<Instant>,
    active: bool,
}

impl<T: Transport> HostLink<T> {
    pub fn new(config: HostLinkConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            ip: None,
            last_probe: None,
            active: false,
        }
    }

    fn probe(&mut self) {
        let previous = self.ip;
        self.ip = match local_ip_towards(self.config.probe_addr) {
            Ok(ip) => Some(ip),
            Err(e) => {
                debug!("No route to {}: {}", self.config.probe_addr, e);
                None
            }
        };
        self.last_probe = Some(Instant::now());

        if self.ip != previous {
            match self.ip {
                Some(ip) => info!(%ip, "Network link up"),
                None => warn!("Network link down"),
            }
        }
    }
}

fn local_ip_towards(addr: SocketAddr) -> std::io::Result<IpAddr> {
    let bind: SocketAddr = match addr {
        SocketAddr::V4(_) => SocketAddr::from(([0, 0, 0, 0], 0)),
        SocketAddr::V6(_) => SocketAddr::from(([0u16; 8], 0)),
    };
    let socket = UdpSocket::bind(bind)?;
    socket.connect(addr)?;
    Ok(socket.local_addr()?.ip())
}

impl<T: Transport> NetworkLink for HostLink<T> {
    type Transport = T;

    fn setup(&mut self) -> Result<(), TransportError> {
        self.active = true;
        self.probe();
        Ok(())
    }

    fn poll(&mut self) {
        if !self.active {
            return;
        }
        let due = self
            .last_probe
            .is_none_or(|at| at.elapsed() >= self.config.probe_interval);
        if due {
            self.probe();
        }
    }

    fn is_healthy(&self) -> bool {
        self.active && self.ip.is_some()
    }

    fn current_ip(&self) -> Option<IpAddr> {
        self.ip
    }

    fn end(&mut self) {
        self.transport.close();
        self.active = false;
        self.ip = None;
        info!("Network link ended");
    }

    fn transport(&mut self) -> &mut T {
        &mut self.transport
    }
}
