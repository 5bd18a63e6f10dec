//! JSON envelope protocol spoken between a FabReader and its backend.
//!
//! Every frame is a `{is_response, type, payload}` object. This crate owns
//! the envelope ([`Message`]), the tag vocabulary ([`MessageType`]), the
//! typed payload views and the text codec used by the session.

pub mod builder;
pub mod codec;
pub mod error;
pub mod message;
pub mod payload;

pub use builder::MessageBuilder;
pub use codec::{EnvelopeCodec, decode, encode};
pub use error::CodecError;
pub use message::{Message, MessageType, Payload};
