//! Shared types for the FabReader firmware: card identifiers, key material,
//! reader credentials, hex conversion and protocol constants.

pub mod constants;
pub mod error;
pub mod hex;
pub mod types;

pub use error::{Error, HexError, Result};
pub use types::*;
