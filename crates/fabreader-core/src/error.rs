use thiserror::Error;

/// Errors produced while converting hexadecimal text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HexError {
    #[error("Hex length mismatch: expected {expected} characters, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Hex text has odd length {0}")]
    OddLength(usize),

    #[error("Invalid hex digit {found:?} at index {index}")]
    InvalidDigit { index: usize, found: char },
}

#[derive(Error, Debug)]
pub enum Error {
    // Encoding errors
    #[error("Hex decode failed: {0}")]
    Hex(#[from] HexError),

    #[error("Invalid card UID: {0}")]
    InvalidCardUid(String),

    #[error("Invalid key material: {0}")]
    InvalidKeyMaterial(String),

    #[error("Invalid key number {0}")]
    InvalidKeyNumber(u8),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
