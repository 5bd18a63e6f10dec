//! Error types for hardware collaborators.
//!
//! Collaborators are polled from the control loop, so every failure is
//! reported as a value. The session logs these and carries on.

pub type Result<T> = std::result::Result<T, HardwareError>;

/// Failures of the display, keypad or NFC front end.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Peripheral went away (unplugged, driver gone, input closed).
    #[error("{device} disconnected")]
    Disconnected { device: String },

    /// The peripheral cannot do this at all.
    #[error("{operation} not supported")]
    Unsupported { operation: String },

    /// Writing to the display failed.
    #[error("Display write failed: {message}")]
    DisplayWrite { message: String },

    /// Card left the field or rejected the exchange mid-way.
    #[error("Card read failed: {message}")]
    CardRead { message: String },

    /// Input outside what the peripheral can produce.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Malformed card data reported by the reader.
    #[error(transparent)]
    Card(#[from] fabreader_core::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HardwareError {
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }

    pub fn display_write(message: impl Into<String>) -> Self {
        Self::DisplayWrite {
            message: message.into(),
        }
    }

    pub fn card_read(message: impl Into<String>) -> Self {
        Self::CardRead {
            message: message.into(),
        }
    }
}
