//! Core constants for the FabReader session protocol.
//!
//! This module defines the protocol-level constants shared by the codec,
//! the session state machine and the device binary. Timing values here are
//! the defaults used when no configuration overrides them.
//!
//! # Protocol Structure
//!
//! Every message exchanged with the backend is a JSON envelope carried in a
//! WebSocket text frame:
//!
//! ```text
//! {"is_response":false,"type":"nfc_tap","payload":{"cardUID":"04A1B2C3"}}
//! ```
//!
//! Where:
//! - `is_response` - `true` when the message answers a request from the peer
//! - `type` - Message tag from the fixed vocabulary
//! - `payload` - Ordered key/value map, shape depends on `type`
//!
//! # Usage
//!
//! ```
//! use fabreader_core::constants::*;
//!
//! assert_eq!(API_WS_PATH, "/api/fabreader/websocket");
//! assert_eq!(KEY_LENGTH * 2, 32);
//! ```

// ============================================================================
// Transport
// ============================================================================

/// Resource path of the backend WebSocket endpoint.
///
/// # Examples
///
/// ```
/// use fabreader_core::constants::API_WS_PATH;
///
/// let url = format!("ws://10.0.0.5:3000{API_WS_PATH}");
/// assert_eq!(url, "ws://10.0.0.5:3000/api/fabreader/websocket");
/// ```
pub const API_WS_PATH: &str = "/api/fabreader/websocket";

/// Device type announced in the registration request.
pub const DEVICE_TYPE: &str = "fabreader";

/// Default maximum envelope size in bytes (16 KB).
///
/// Generous for every envelope in the vocabulary while keeping a bound on
/// what a misbehaving peer can make the device parse.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 16 * 1024;

// ============================================================================
// Card Identifiers and Key Material
// ============================================================================

/// Minimum card UID length in bytes (ISO 14443 single size UID).
pub const MIN_UID_LENGTH: usize = 4;

/// Maximum card UID length in bytes (ISO 14443 triple size UID).
pub const MAX_UID_LENGTH: usize = 10;

/// Length of card authentication key material in bytes.
///
/// NTAG 424 application keys are AES-128, so the backend always sends
/// exactly 32 hex characters.
pub const KEY_LENGTH: usize = 16;

/// Highest key slot number a card exposes.
pub const MAX_KEY_NUMBER: u8 = 4;

// ============================================================================
// Timing Defaults (seconds)
// ============================================================================

/// Default retry period for unanswered registration requests.
pub const DEFAULT_REGISTRATION_TIMEOUT_SECS: u64 = 10;

/// Default retry period for unanswered authentication requests.
pub const DEFAULT_AUTHENTICATION_TIMEOUT_SECS: u64 = 10;

/// Default spacing between heartbeats once authenticated.
pub const DEFAULT_HEARTBEAT_INTERVAL_SECS: u64 = 30;

/// Default spacing between WebSocket reconnect attempts.
pub const DEFAULT_RECONNECT_INTERVAL_SECS: u64 = 5;

/// Default period of the cooperative control loop (milliseconds).
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 50;
