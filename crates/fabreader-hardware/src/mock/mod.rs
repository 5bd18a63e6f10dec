//! Mock collaborators for testing and development.
//!
//! Each mock comes with a cloneable handle. Tests keep the handle to feed
//! input or inspect what the session did, after the mock itself has been
//! moved into the session.

pub mod display;
pub mod keypad;
pub mod nfc;

pub use display::{DisplayEvent, MockDisplay, MockDisplayHandle};
pub use keypad::{MockKeypad, MockKeypadHandle};
pub use nfc::{CardAuthentication, MockNfc, MockNfcHandle};

use std::sync::{Mutex, MutexGuard};

/// Lock shared mock state, recovering from a panicked holder.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
