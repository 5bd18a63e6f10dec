//! Device configuration.
//!
//! Sources, later ones overriding earlier ones:
//!
//! 1. built-in defaults
//! 2. `config/fabreader.{toml,json,yaml}` if present, or the file passed with
//!    `--config`
//! 3. `FABREADER_` environment variables, `__` separating nested keys
//!    (`FABREADER_BACKEND__HOST`, `FABREADER_SESSION__HEARTBEAT_INTERVAL`)

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use fabreader_core::constants::{API_WS_PATH, DEFAULT_TICK_INTERVAL_MS};
use fabreader_session::SessionConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub backend: BackendConfig,
    #[serde(default)]
    pub session: SessionConfig,
    pub device: DeviceSettings,
}

/// Where the backend's WebSocket endpoint lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub host: String,
    pub port: u16,
    /// Use `wss://` instead of `ws://`.
    pub secure: bool,
}

impl BackendConfig {
    pub fn websocket_url(&self) -> String {
        let scheme = if self.secure { "wss" } else { "ws" };
        format!("{scheme}://{}:{}{API_WS_PATH}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSettings {
    /// JSON file holding the reader identity and card key.
    pub store_path: PathBuf,
    /// Control-loop period.
    pub tick_interval_ms: u64,
}

impl DeviceSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

impl DeviceConfig {
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_sources(path, None)
    }

    /// Load with `env_vars` standing in for the process environment.
    pub fn load_with_sources(
        path: Option<&Path>,
        env_vars: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("backend.host", "localhost")?
            .set_default("backend.port", 3000)?
            .set_default("backend.secure", false)?
            .set_default("device.store_path", "fabreader-device.json")?
            .set_default("device.tick_interval_ms", DEFAULT_TICK_INTERVAL_MS)?;

        builder = match path {
            Some(path) => builder.add_source(File::from(path)),
            None => builder.add_source(File::with_name("config/fabreader").required(false)),
        };

        match env_vars {
            Some(vars) => {
                for (key, value) in vars {
                    builder = builder.set_override(&key, value)?;
                }
            }
            None => {
                builder = builder.add_source(
                    Environment::with_prefix("FABREADER")
                        .prefix_separator("_")
                        .separator("__"),
                );
            }
        }

        builder.build()?.try_deserialize()
    }
}
