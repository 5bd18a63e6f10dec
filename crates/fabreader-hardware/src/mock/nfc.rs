//! Mock NFC reader with scripted cards and authentication outcomes.

use std::sync::{Arc, Mutex};

use fabreader_core::{CardUid, KeyMaterial, KeyNumber};
use tokio::sync::mpsc::{self, error::TryRecvError};

use super::lock;
use crate::error::{HardwareError, Result};
use crate::traits::NfcReader;

/// One call to [`NfcReader::authenticate_card`] seen by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct CardAuthentication {
    pub key_number: KeyNumber,
    pub key: KeyMaterial,
}

#[derive(Debug)]
struct NfcState {
    accept_key: Option<KeyMaterial>,
    card_in_field: bool,
    attempts: Vec<CardAuthentication>,
}

/// Mock NFC reader for testing and development.
///
/// Cards presented through the handle are returned by `poll_card` in order.
/// Authentication succeeds when a card has been presented and the key equals
/// the one set with [`MockNfcHandle::accept_key`]; with no accepted key set
/// every key is accepted.
#[derive(Debug)]
pub struct MockNfc {
    card_rx: mpsc::UnboundedReceiver<CardUid>,
    last_uid: Option<CardUid>,
    state: Arc<Mutex<NfcState>>,
}

impl MockNfc {
    /// Create a mock reader and the handle that drives it.
    pub fn new() -> (Self, MockNfcHandle) {
        let (card_tx, card_rx) = mpsc::unbounded_channel();
        let state = Arc::new(Mutex::new(NfcState {
            accept_key: None,
            card_in_field: false,
            attempts: Vec::new(),
        }));

        let nfc = Self {
            card_rx,
            last_uid: None,
            state: Arc::clone(&state),
        };
        (nfc, MockNfcHandle { card_tx, state })
    }
}

impl NfcReader for MockNfc {
    fn poll_card(&mut self) -> Result<Option<CardUid>> {
        match self.card_rx.try_recv() {
            Ok(uid) => {
                tracing::trace!(%uid, "mock card presented");
                lock(&self.state).card_in_field = true;
                self.last_uid = Some(uid.clone());
                Ok(Some(uid))
            }
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(HardwareError::disconnected("mock nfc")),
        }
    }

    fn last_uid(&self) -> Option<&CardUid> {
        self.last_uid.as_ref()
    }

    fn authenticate_card(&mut self, key_number: KeyNumber, key: &KeyMaterial) -> Result<bool> {
        let mut state = lock(&self.state);
        state.attempts.push(CardAuthentication {
            key_number,
            key: key.clone(),
        });

        if !state.card_in_field {
            return Err(HardwareError::card_read("no card in field"));
        }
        Ok(state.accept_key.as_ref().is_none_or(|accepted| accepted == key))
    }
}

/// Handle for driving a [`MockNfc`].
#[derive(Debug, Clone)]
pub struct MockNfcHandle {
    card_tx: mpsc::UnboundedSender<CardUid>,
    state: Arc<Mutex<NfcState>>,
}

impl MockNfcHandle {
    /// Queue a card tap. Returns `false` if the reader has been dropped.
    pub fn present_card(&self, uid: CardUid) -> bool {
        self.card_tx.send(uid).is_ok()
    }

    /// Only accept `key` from now on.
    pub fn accept_key(&self, key: KeyMaterial) {
        lock(&self.state).accept_key = Some(key);
    }

    /// Take the card out of the field.
    pub fn remove_card(&self) {
        lock(&self.state).card_in_field = false;
    }

    /// Authentication attempts made so far.
    pub fn attempts(&self) -> Vec<CardAuthentication> {
        lock(&self.state).attempts.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid() -> CardUid {
        CardUid::from_hex("04A1B2C3D4E5F6").unwrap()
    }

    fn key(byte: u8) -> KeyMaterial {
        KeyMaterial::new([byte; fabreader_core::constants::KEY_LENGTH])
    }

    #[test]
    fn test_authenticate_without_card_fails() {
        let (mut nfc, handle) = MockNfc::new();
        let result = nfc.authenticate_card(KeyNumber::new(0).unwrap(), &key(0));
        assert!(matches!(result, Err(HardwareError::CardRead { .. })));
        assert_eq!(handle.attempts().len(), 1);
    }

    #[test]
    fn test_authenticate_checks_key() {
        let (mut nfc, handle) = MockNfc::new();
        handle.accept_key(key(7));
        handle.present_card(uid());
        nfc.poll_card().unwrap();

        let slot = KeyNumber::new(1).unwrap();
        assert!(!nfc.authenticate_card(slot, &key(1)).unwrap());
        assert!(nfc.authenticate_card(slot, &key(7)).unwrap());

        let attempts = handle.attempts();
        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[1].key, key(7));
        assert_eq!(attempts[1].key_number, slot);
    }

    #[test]
    fn test_removed_card() {
        let (mut nfc, handle) = MockNfc::new();
        handle.present_card(uid());
        nfc.poll_card().unwrap();
        handle.remove_card();

        assert!(nfc.authenticate_card(KeyNumber::new(0).unwrap(), &key(0)).is_err());
        assert_eq!(nfc.last_uid(), Some(&uid()));
    }
}
