//! Hardware collaborator trait definitions.
//!
//! These traits are the contract between the session core and the reader's
//! peripherals: display, keypad and NFC front end. They are called from the
//! single cooperative control loop, so every method is synchronous and must
//! return promptly. Polling methods report "nothing yet" as `Ok(None)` rather
//! than waiting.
//!
//! Implementations are injected into the session as generic parameters; the
//! session never constructs them.

use std::time::{Duration, Instant};

use fabreader_core::{CardUid, KeyMaterial, KeyNumber};

use crate::error::{HardwareError, Result};
use crate::icons::Icon;

/// Input from the reader's keypad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum KeypadInput {
    /// Numeric digit (0-9).
    Digit(u8),

    /// Star key (*).
    Star,

    /// Hash/pound key (#).
    Hash,

    /// Enter/confirm key.
    Enter,

    /// Cancel operation key.
    Cancel,
}

impl KeypadInput {
    /// Create a digit input.
    ///
    /// # Errors
    ///
    /// Returns an error if the digit is greater than 9.
    ///
    /// # Examples
    ///
    /// ```
    /// use fabreader_hardware::traits::KeypadInput;
    ///
    /// let input = KeypadInput::digit(5).unwrap();
    /// assert_eq!(input.as_digit(), Some(5));
    ///
    /// assert!(KeypadInput::digit(10).is_err());
    /// ```
    pub fn digit(d: u8) -> Result<Self> {
        if d > 9 {
            return Err(HardwareError::InvalidInput(format!("digit must be 0-9, got {d}")));
        }
        Ok(Self::Digit(d))
    }

    /// Map a key label to an input. Unknown labels yield `None`.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0'..='9' => c.to_digit(10).map(|d| Self::Digit(d as u8)),
            '*' => Some(Self::Star),
            '#' => Some(Self::Hash),
            'e' | 'E' => Some(Self::Enter),
            'c' | 'C' => Some(Self::Cancel),
            _ => None,
        }
    }

    /// Get the digit value if this is a digit input.
    pub fn as_digit(&self) -> Option<u8> {
        match self {
            Self::Digit(d) => Some(*d),
            _ => None,
        }
    }
}

/// Small text display on the reader.
pub trait Display {
    /// Show a line of text, replacing whatever is on screen.
    ///
    /// With `duration`, the display returns to its idle view once it elapses.
    /// Without it, the text stays until replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if the display cannot be written.
    fn show_text(&mut self, text: &str, duration: Option<Duration>) -> Result<()>;

    /// Show a status icon from the icon table.
    ///
    /// # Errors
    ///
    /// Returns an error if the display cannot be written.
    fn show_icon(&mut self, icon: Icon) -> Result<()>;

    /// Blank the display.
    ///
    /// # Errors
    ///
    /// Returns an error if the display cannot be written.
    fn clear(&mut self) -> Result<()>;

    /// Service timed content, such as text shown with a duration.
    /// Called once per control-loop tick.
    ///
    /// # Errors
    ///
    /// Returns an error if the display cannot be written.
    fn refresh(&mut self, _now: Instant) -> Result<()> {
        Ok(())
    }
}

/// Keypad scanned by the control loop.
pub trait Keypad {
    /// Return the next pending key press, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the keypad is disconnected.
    fn poll_input(&mut self) -> Result<Option<KeypadInput>>;
}

/// NFC front end.
///
/// The session only orchestrates card operations; the card cryptography
/// lives behind this trait.
///
/// # Examples
///
/// ```
/// use fabreader_hardware::mock::MockNfc;
/// use fabreader_hardware::traits::NfcReader;
/// use fabreader_core::CardUid;
///
/// let (mut nfc, handle) = MockNfc::new();
/// let uid = CardUid::from_hex("04A1B2C3").unwrap();
/// handle.present_card(uid.clone());
///
/// assert_eq!(nfc.poll_card().unwrap(), Some(uid.clone()));
/// assert_eq!(nfc.last_uid(), Some(&uid));
/// assert_eq!(nfc.poll_card().unwrap(), None);
/// ```
pub trait NfcReader {
    /// Return a newly presented card, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader stops responding.
    fn poll_card(&mut self) -> Result<Option<CardUid>>;

    /// UID of the most recently presented card.
    fn last_uid(&self) -> Option<&CardUid>;

    /// Authenticate the card in the field against key slot `key_number`.
    ///
    /// Returns `Ok(false)` when the card rejects the key.
    ///
    /// # Errors
    ///
    /// Returns an error if no card is present or the exchange fails.
    fn authenticate_card(&mut self, key_number: KeyNumber, key: &KeyMaterial) -> Result<bool>;
}
