//! Typed views of envelope payloads.
//!
//! Inbound views are deserialized from [`Message::payload`] by the session's
//! handlers; outbound views are serialized into it by [`MessageBuilder`].
//! Field names follow the backend's camelCase convention.
//!
//! [`Message::payload`]: crate::Message::payload
//! [`MessageBuilder`]: crate::MessageBuilder

use fabreader_core::{CardUid, KeyNumber};
use serde::{Deserialize, Serialize};

// ============================================================================
// Inbound (backend -> reader)
// ============================================================================

/// `registration_data`: identity assigned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegistrationData {
    pub id: u64,
    pub token: String,
}

/// `authenticate` / `reauthenticate` response to our authentication request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationResult {
    /// Explicit rejection flag; absent means accepted.
    #[serde(default)]
    pub authenticated: Option<bool>,

    /// Display name the backend knows this reader by.
    #[serde(default)]
    pub name: Option<String>,
}

impl AuthenticationResult {
    pub fn is_accepted(&self) -> bool {
        self.authenticated.unwrap_or(true)
    }
}

/// `authenticate` request from the backend: authenticate the card on the reader.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardAuthenticationRequest {
    pub key_number: KeyNumber,

    /// Hex key to use instead of the stored key material.
    #[serde(default)]
    pub authentication_key: Option<String>,
}

/// `change_keys`: new key material as hex text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChangeKeys {
    pub key: String,
}

/// `display_text`: message for the display, optionally timed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DisplayText {
    pub message: String,

    /// Milliseconds to keep the message up.
    #[serde(default)]
    pub duration: Option<u64>,
}

/// `show_text`: same as `display_text` with the text under `text`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ShowText {
    pub text: String,

    #[serde(default)]
    pub duration: Option<u64>,
}

// ============================================================================
// Outbound (reader -> backend)
// ============================================================================

/// `register` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub device_type: String,
    pub firmware_version: String,

    /// Previously assigned identity, so the backend can recognize the reader.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// `authenticate` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticateRequest {
    pub id: u64,
    pub token: String,
}

/// `nfc_tap` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NfcTap {
    #[serde(rename = "cardUID")]
    pub card_uid: CardUid,
}

/// `authenticate` response carrying the outcome of a card authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardAuthenticationResult {
    pub authentication_successful: bool,

    #[serde(rename = "cardUID", skip_serializing_if = "Option::is_none")]
    pub card_uid: Option<CardUid>,
}

/// `change_keys` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeKeysResult {
    pub success: bool,
}
