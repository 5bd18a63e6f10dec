//! Persistent device state.
//!
//! The backend assigns the reader an identity during registration and may
//! rotate its card key at any time. Both survive reboots through a
//! [`DeviceStore`]. Protocol state (connection, handshake progress, timers)
//! is never persisted.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use fabreader_core::{KeyMaterial, ReaderCredentials};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SessionError;

/// Everything the device keeps across reboots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceRecord {
    /// Identity assigned by the backend in `registration_data`.
    pub credentials: Option<ReaderCredentials>,

    /// Card authentication key provisioned through `change_keys`.
    pub key_material: Option<KeyMaterial>,
}

/// Storage for the [`DeviceRecord`].
pub trait DeviceStore {
    /// Load the stored record. An empty store yields the default record.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read or parsed.
    fn load(&mut self) -> Result<DeviceRecord, SessionError>;

    /// Replace the stored record.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn save(&mut self, record: &DeviceRecord) -> Result<(), SessionError>;
}

/// Store kept in memory, for tests and volatile deployments.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    record: DeviceRecord,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `record` already stored.
    pub fn with_record(record: DeviceRecord) -> Self {
        Self { record, saves: 0 }
    }

    pub fn record(&self) -> &DeviceRecord {
        &self.record
    }

    /// Number of successful saves.
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl DeviceStore for MemoryStore {
    fn load(&mut self) -> Result<DeviceRecord, SessionError> {
        Ok(self.record.clone())
    }

    fn save(&mut self, record: &DeviceRecord) -> Result<(), SessionError> {
        self.record = record.clone();
        self.saves += 1;
        Ok(())
    }
}

/// Store backed by a JSON file.
///
/// Saves write a sibling temporary file and rename it over the target, so a
/// power cut leaves either the old record or the new one.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl DeviceStore for FileStore {
    fn load(&mut self) -> Result<DeviceRecord, SessionError> {
        match fs::read_to_string(&self.path) {
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No device record at {}, starting fresh", self.path.display());
                Ok(DeviceRecord::default())
            }
            Err(e) => Err(SessionError::store(&self.path, e)),
        }
    }

    fn save(&mut self, record: &DeviceRecord) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| SessionError::store(parent, e))?;
        }

        let text = serde_json::to_string_pretty(record)?;
        let temp = self.temp_path();
        fs::write(&temp, text).map_err(|e| SessionError::store(&temp, e))?;
        fs::rename(&temp, &self.path).map_err(|e| SessionError::store(&self.path, e))?;

        debug!("Saved device record to {}", self.path.display());
        Ok(())
    }
}
