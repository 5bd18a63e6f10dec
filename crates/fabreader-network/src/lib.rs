//! Network layer for the FabReader device.
//!
//! Two abstractions separate the session core from the network:
//!
//! - [`NetworkLink`]: the physical medium. It reports health and the device's
//!   IP and owns the transport running over it.
//! - [`Transport`]: a message-oriented connection carrying whole text frames,
//!   polled without blocking.
//!
//! # Components
//!
//! - **HostLink**: link backed by the host network stack
//! - **WebSocketTransport**: tokio-tungstenite client driven by a background task
//! - **MockLink / MockTransport**: scriptable in-memory doubles for tests
//!
//! # Example
//!
//! ```no_run
//! use fabreader_network::{
//!     HostLink, HostLinkConfig, NetworkLink, Transport, WebSocketConfig, WebSocketTransport,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = WebSocketTransport::new(WebSocketConfig::new(
//!     "ws://127.0.0.1:3000/api/fabreader/websocket",
//! ));
//! let mut link = HostLink::new(HostLinkConfig::default(), transport);
//! link.setup()?;
//! link.transport().connect()?;
//! # Ok(())
//! # }
//! ```

mod error;
mod link;
pub mod mock;
mod transport;
mod websocket;

pub use error::TransportError;
pub use link::{HostLink, HostLinkConfig, NetworkLink};
pub use transport::{Transport, TransportStatus};
pub use websocket::{WebSocketConfig, WebSocketTransport};
