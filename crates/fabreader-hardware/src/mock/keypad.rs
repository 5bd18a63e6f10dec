//! Mock keypad fed through a channel.

use tokio::sync::mpsc::{self, error::TryRecvError};

use crate::error::{HardwareError, Result};
use crate::traits::{Keypad, KeypadInput};

/// Mock keypad for testing and development.
///
/// # Examples
///
/// ```
/// use fabreader_hardware::mock::MockKeypad;
/// use fabreader_hardware::traits::{Keypad, KeypadInput};
///
/// let (mut keypad, handle) = MockKeypad::new();
/// handle.press(KeypadInput::Digit(1)).unwrap();
///
/// assert_eq!(keypad.poll_input().unwrap(), Some(KeypadInput::Digit(1)));
/// assert_eq!(keypad.poll_input().unwrap(), None);
/// ```
#[derive(Debug)]
pub struct MockKeypad {
    input_rx: mpsc::UnboundedReceiver<KeypadInput>,
}

impl MockKeypad {
    /// Create a mock keypad and the handle that feeds it.
    pub fn new() -> (Self, MockKeypadHandle) {
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        (Self { input_rx }, MockKeypadHandle { input_tx })
    }
}

impl Keypad for MockKeypad {
    fn poll_input(&mut self) -> Result<Option<KeypadInput>> {
        match self.input_rx.try_recv() {
            Ok(input) => Ok(Some(input)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(HardwareError::disconnected("mock keypad")),
        }
    }
}

/// Handle for pressing keys on a [`MockKeypad`].
#[derive(Debug, Clone)]
pub struct MockKeypadHandle {
    input_tx: mpsc::UnboundedSender<KeypadInput>,
}

impl MockKeypadHandle {
    /// Queue a key press.
    ///
    /// # Errors
    ///
    /// Returns an error if the keypad has been dropped.
    pub fn press(&self, input: KeypadInput) -> Result<()> {
        self.input_tx
            .send(input)
            .map_err(|_| HardwareError::disconnected("mock keypad"))
    }
}
