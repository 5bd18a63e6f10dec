//! FabReader session core.
//!
//! This crate holds the protocol state machine that connects a reader to its
//! backend: connection lifecycle, the registration and authentication
//! handshake with timed retries, heartbeats, and dispatch of inbound
//! commands to the display and NFC reader.
//!
//! The session is single-threaded and never blocks. The device's control
//! loop calls [`Session::tick`] repeatedly and reports card taps through
//! [`Session::report_card_tapped`].

pub mod config;
pub mod error;
mod handlers;
pub mod session;
pub mod state;
pub mod store;
pub mod timer;

pub use config::{FIRMWARE_VERSION, SessionConfig};
pub use error::SessionError;
pub use session::{Session, SessionBuilder, TapOutcome, TickReport};
pub use state::{SessionState, StateTransition};
pub use store::{DeviceRecord, DeviceStore, FileStore, MemoryStore};
pub use timer::RetryTimer;
