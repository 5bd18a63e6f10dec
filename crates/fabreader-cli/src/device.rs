//! The device control loop body.

use std::time::{Duration, Instant};

use fabreader_hardware::{Display, Keypad, NfcReader};
use fabreader_network::NetworkLink;
use fabreader_session::{DeviceStore, Session, SessionError, TapOutcome, TickReport};
use tracing::{debug, warn};

/// How long a key press keeps the status screen up.
const STATUS_DURATION: Duration = Duration::from_secs(3);

/// A session plus the peripherals the session itself does not drive.
pub struct Device<L, D, N, K, S> {
    session: Session<L, D, N, S>,
    keypad: K,
}

impl<L, D, N, K, S> Device<L, D, N, K, S>
where
    L: NetworkLink,
    D: Display,
    N: NfcReader,
    K: Keypad,
    S: DeviceStore,
{
    pub fn new(session: Session<L, D, N, S>, keypad: K) -> Self {
        Self { session, keypad }
    }

    pub fn setup(&mut self) -> Result<(), SessionError> {
        self.session.setup()
    }

    /// One control-loop iteration: peripherals first, then the session.
    pub fn step(&mut self, now: Instant) -> TickReport {
        self.poll_card(now);
        self.poll_keypad();

        if let Err(e) = self.session.display_mut().refresh(now) {
            warn!("Display refresh failed: {}", e);
        }

        self.session.tick(now)
    }

    fn poll_card(&mut self, now: Instant) {
        match self.session.nfc_mut().poll_card() {
            Ok(Some(uid)) => {
                let outcome = self.session.report_card_tapped(&uid, now);
                if outcome != TapOutcome::Sent {
                    debug!(%uid, ?outcome, "Tap not forwarded");
                }
            }
            Ok(None) => {}
            Err(e) => warn!("NFC poll failed: {}", e),
        }
    }

    /// Any key press shows the reader's address and session state.
    fn poll_keypad(&mut self) {
        match self.keypad.poll_input() {
            Ok(Some(input)) => {
                debug!(?input, "Key pressed");
                let status = self.status_line();
                if let Err(e) = self
                    .session
                    .display_mut()
                    .show_text(&status, Some(STATUS_DURATION))
                {
                    warn!("Display error: {}", e);
                }
            }
            Ok(None) => {}
            Err(e) => warn!("Keypad poll failed: {}", e),
        }
    }

    fn status_line(&self) -> String {
        let ip = self
            .session
            .current_ip()
            .map_or_else(|| "no network".to_string(), |ip| ip.to_string());
        format!("{ip} {}", self.session.state())
    }

    pub fn shutdown(&mut self, now: Instant) {
        self.session.shutdown(now);
    }
}
