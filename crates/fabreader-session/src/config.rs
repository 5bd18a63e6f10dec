//! Session timing configuration.
//!
//! Durations are written in whole seconds in configuration files:
//!
//! ```toml
//! [session]
//! registration_timeout = 10
//! authentication_timeout = 10
//! heartbeat_interval = 30
//! reconnect_interval = 5
//! ```

use std::time::Duration;

use fabreader_core::constants::{
    DEFAULT_AUTHENTICATION_TIMEOUT_SECS, DEFAULT_HEARTBEAT_INTERVAL_SECS, DEFAULT_MAX_FRAME_SIZE,
    DEFAULT_RECONNECT_INTERVAL_SECS, DEFAULT_REGISTRATION_TIMEOUT_SECS,
};
use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// Firmware version reported in `register` requests.
pub const FIRMWARE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Retry and keep-alive timing for the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Time to wait for `registration_data` before re-sending `register`.
    #[serde(with = "secs")]
    pub registration_timeout: Duration,

    /// Time to wait for an `authenticate` response before re-sending.
    #[serde(with = "secs")]
    pub authentication_timeout: Duration,

    /// Spacing between heartbeats once authenticated.
    #[serde(with = "secs")]
    pub heartbeat_interval: Duration,

    /// Spacing between transport reconnect attempts.
    #[serde(with = "secs")]
    pub reconnect_interval: Duration,

    /// Frames larger than this are dropped unparsed.
    pub max_frame_size: usize,

    pub firmware_version: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            registration_timeout: Duration::from_secs(DEFAULT_REGISTRATION_TIMEOUT_SECS),
            authentication_timeout: Duration::from_secs(DEFAULT_AUTHENTICATION_TIMEOUT_SECS),
            heartbeat_interval: Duration::from_secs(DEFAULT_HEARTBEAT_INTERVAL_SECS),
            reconnect_interval: Duration::from_secs(DEFAULT_RECONNECT_INTERVAL_SECS),
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            firmware_version: FIRMWARE_VERSION.to_string(),
        }
    }
}

impl SessionConfig {
    /// Check that every interval is non-zero.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidConfig` naming the first bad field.
    pub fn validate(&self) -> Result<(), SessionError> {
        let intervals = [
            ("registration_timeout", self.registration_timeout),
            ("authentication_timeout", self.authentication_timeout),
            ("heartbeat_interval", self.heartbeat_interval),
            ("reconnect_interval", self.reconnect_interval),
        ];
        if let Some((name, _)) = intervals.iter().find(|(_, d)| d.is_zero()) {
            return Err(SessionError::InvalidConfig(format!("{name} must be non-zero")));
        }
        if self.max_frame_size == 0 {
            return Err(SessionError::InvalidConfig(
                "max_frame_size must be non-zero".into(),
            ));
        }
        if self.firmware_version.is_empty() {
            return Err(SessionError::InvalidConfig(
                "firmware_version must not be empty".into(),
            ));
        }
        Ok(())
    }
}

mod secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
