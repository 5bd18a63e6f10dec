//! Hardware collaborators for the FabReader device.
//!
//! The session core reaches the reader's peripherals only through the traits
//! in this crate:
//!
//! - [`Display`]: text and status icons on the small screen
//! - [`Keypad`]: key presses, polled by the control loop
//! - [`NfcReader`]: card detection and card authentication
//!
//! All methods are synchronous and non-blocking. The device runs a single
//! cooperative loop, and a collaborator that stalls stalls the whole device.
//!
//! # Icons
//!
//! Bitmaps for the status icons live in the immutable [`icons`] table, keyed
//! by [`Icon`]. Displays that cannot draw bitmaps may render the icon name.
//!
//! # Mock Implementations
//!
//! The [`mock`] module provides [`MockDisplay`](mock::MockDisplay),
//! [`MockKeypad`](mock::MockKeypad) and [`MockNfc`](mock::MockNfc) for tests
//! and development without physical hardware.
//!
//! ```
//! use fabreader_hardware::mock::MockDisplay;
//! use fabreader_hardware::{Display, Icon};
//!
//! let (mut display, handle) = MockDisplay::new();
//! display.show_icon(Icon::WifiOn).unwrap();
//! display.show_text("Welcome", None).unwrap();
//!
//! assert_eq!(handle.icons(), vec![Icon::WifiOn]);
//! assert_eq!(handle.last_text().as_deref(), Some("Welcome"));
//! ```

pub mod error;
pub mod icons;
pub mod mock;
pub mod traits;

pub use error::{HardwareError, Result};
pub use icons::{Bitmap, Icon};
pub use traits::{Display, Keypad, KeypadInput, NfcReader};
