//! Console stand-ins for the reader's peripherals.
//!
//! The display renders into a framed text panel on stdout. Card taps and key
//! presses are typed on stdin:
//!
//! ```text
//! tap 04A1B2C3D4E5F6
//! key 5
//! ```

use std::io::{self, Write};
use std::time::{Duration, Instant};

use chrono::Local;
use fabreader_core::{CardUid, KeyMaterial, KeyNumber};
use fabreader_hardware::{Display, HardwareError, Icon, Keypad, KeypadInput, NfcReader, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender, error::TryRecvError};
use tracing::{debug, info, warn};

/// Characters per display line.
const COLUMNS: usize = 32;

const IDLE_TEXT: &str = "Ready";

// ----------------------------------------------------------------------------
// Display
// ----------------------------------------------------------------------------

/// Text panel written to any [`Write`] sink.
///
/// Text shown with a duration reverts to the idle view on the first
/// [`refresh`](Display::refresh) after it expires.
#[derive(Debug)]
pub struct ConsoleDisplay<W> {
    out: W,
    current: String,
    expires_at: Option<Instant>,
}

impl ConsoleDisplay<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleDisplay<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            current: String::new(),
            expires_at: None,
        }
    }

    fn render(&mut self, text: &str) -> Result<()> {
        let border = format!("+{}+", "-".repeat(COLUMNS));
        let line = center(&sanitize(text), COLUMNS);
        let time = Local::now().format("%H:%M:%S");

        writeln!(self.out, "{time} {border}")?;
        writeln!(self.out, "{time} |{line}|")?;
        writeln!(self.out, "{time} {border}")?;
        self.out.flush()?;

        self.current = text.to_string();
        Ok(())
    }
}

impl<W: Write> Display for ConsoleDisplay<W> {
    fn show_text(&mut self, text: &str, duration: Option<Duration>) -> Result<()> {
        self.expires_at = duration.map(|d| Instant::now() + d);
        self.render(text)
    }

    fn show_icon(&mut self, icon: Icon) -> Result<()> {
        if icon == Icon::BootLogo {
            writeln!(self.out, "{}", icon.bitmap().to_ascii('#', ' '))?;
        }
        writeln!(self.out, "{} [{icon}]", Local::now().format("%H:%M:%S"))?;
        self.out.flush()?;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.expires_at = None;
        self.render("")
    }

    fn refresh(&mut self, now: Instant) -> Result<()> {
        match self.expires_at {
            Some(at) if now >= at => {
                self.expires_at = None;
                if self.current == IDLE_TEXT {
                    return Ok(());
                }
                self.render(IDLE_TEXT)
            }
            _ => Ok(()),
        }
    }
}

/// Drop control characters.
fn sanitize(text: &str) -> String {
    text.chars().filter(|c| !c.is_control()).collect()
}

/// Center `text` in `width` columns, truncating when too long. Extra padding
/// goes on the right.
fn center(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.chars().take(width).collect();
    }
    let left = (width - len) / 2;
    let right = width - len - left;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(right))
}

// ----------------------------------------------------------------------------
// Input
// ----------------------------------------------------------------------------

/// One line typed on the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Tap(CardUid),
    Key(KeypadInput),
}

impl ConsoleCommand {
    /// Parse `tap <hex uid>` or `key <0-9|*|#|e|c>`.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let command = parts.next()?;
        let argument = parts.next()?;
        if parts.next().is_some() {
            return None;
        }

        match command {
            "tap" => CardUid::from_hex(argument).ok().map(Self::Tap),
            "key" => {
                let mut chars = argument.chars();
                let c = chars.next()?;
                if chars.next().is_some() {
                    return None;
                }
                KeypadInput::from_char(c).map(Self::Key)
            }
            _ => None,
        }
    }
}

/// Read commands from stdin until EOF, routing taps and key presses to their
/// channels. Must be called from within a tokio runtime.
pub fn spawn_stdin_reader() -> (ConsoleNfc, ConsoleKeypad) {
    let (card_tx, card_rx) = mpsc::unbounded_channel();
    let (key_tx, key_rx) = mpsc::unbounded_channel();
    tokio::spawn(read_commands(card_tx, key_tx));
    (ConsoleNfc::new(card_rx), ConsoleKeypad::new(key_rx))
}

async fn read_commands(card_tx: UnboundedSender<CardUid>, key_tx: UnboundedSender<KeypadInput>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("Failed to read stdin: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let delivered = match ConsoleCommand::parse(&line) {
            Some(ConsoleCommand::Tap(uid)) => card_tx.send(uid).is_ok(),
            Some(ConsoleCommand::Key(input)) => key_tx.send(input).is_ok(),
            None => {
                warn!("Unrecognized input {:?}; try `tap <hex uid>` or `key <c>`", line);
                true
            }
        };
        if !delivered {
            break;
        }
    }
    debug!("Console input closed");
}

/// NFC reader fed from the console.
///
/// It has no card front end, so card authentication is unsupported and the
/// backend is answered with a failed exchange.
#[derive(Debug)]
pub struct ConsoleNfc {
    card_rx: UnboundedReceiver<CardUid>,
    last_uid: Option<CardUid>,
}

impl ConsoleNfc {
    pub fn new(card_rx: UnboundedReceiver<CardUid>) -> Self {
        Self {
            card_rx,
            last_uid: None,
        }
    }
}

impl NfcReader for ConsoleNfc {
    fn poll_card(&mut self) -> Result<Option<CardUid>> {
        match self.card_rx.try_recv() {
            Ok(uid) => {
                info!(%uid, "Card tapped");
                self.last_uid = Some(uid.clone());
                Ok(Some(uid))
            }
            // Closed stdin just means no more cards
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => Ok(None),
        }
    }

    fn last_uid(&self) -> Option<&CardUid> {
        self.last_uid.as_ref()
    }

    fn authenticate_card(&mut self, key_number: KeyNumber, _key: &KeyMaterial) -> Result<bool> {
        Err(HardwareError::unsupported(format!(
            "card authentication with key {key_number} on console reader"
        )))
    }
}

#[derive(Debug)]
pub struct ConsoleKeypad {
    key_rx: UnboundedReceiver<KeypadInput>,
}

impl ConsoleKeypad {
    pub fn new(key_rx: UnboundedReceiver<KeypadInput>) -> Self {
        Self { key_rx }
    }
}

impl Keypad for ConsoleKeypad {
    fn poll_input(&mut self) -> Result<Option<KeypadInput>> {
        match self.key_rx.try_recv() {
            Ok(input) => Ok(Some(input)),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => Ok(None),
        }
    }
}
