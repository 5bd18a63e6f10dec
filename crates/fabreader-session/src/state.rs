//! Session connection states.
//!
//! # States
//!
//! - `Disconnected`: no open transport (initial state)
//! - `Connected`: transport open, registration pending
//! - `Registered`: backend has assigned an identity, authentication pending
//! - `Authenticated`: handshake complete, heartbeats flowing
//!
//! States are ordered: each one implies every earlier one. There is no
//! terminal state; any state falls back to `Disconnected` on a transport
//! failure, and `Authenticated` falls back to `Registered` when the backend
//! revokes the authentication.

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Maximum number of state transitions kept for diagnostics.
pub(crate) const MAX_HISTORY_SIZE: usize = 32;

/// Handshake progress of the session.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Disconnected,
    Connected,
    Registered,
    Authenticated,
}

impl SessionState {
    pub fn is_connected(&self) -> bool {
        *self >= SessionState::Connected
    }

    pub fn is_registered(&self) -> bool {
        *self >= SessionState::Registered
    }

    pub fn is_authenticated(&self) -> bool {
        *self == SessionState::Authenticated
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state_str = match self {
            SessionState::Disconnected => "Disconnected",
            SessionState::Connected => "Connected",
            SessionState::Registered => "Registered",
            SessionState::Authenticated => "Authenticated",
        };
        write!(f, "{}", state_str)
    }
}

/// Record of a state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTransition {
    pub from: SessionState,
    pub to: SessionState,

    /// Tick time at which the change happened.
    pub at: Instant,
}
