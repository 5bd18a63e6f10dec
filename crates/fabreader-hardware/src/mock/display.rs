//! Mock display that records every call.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::lock;
use crate::error::{HardwareError, Result};
use crate::icons::Icon;
use crate::traits::Display;

/// One call made on a [`MockDisplay`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayEvent {
    Text {
        text: String,
        duration: Option<Duration>,
    },
    Icon(Icon),
    Clear,
}

#[derive(Debug, Default)]
struct DisplayState {
    events: Vec<DisplayEvent>,
    failing: bool,
}

/// Mock display for testing and development.
#[derive(Debug, Clone, Default)]
pub struct MockDisplay {
    state: Arc<Mutex<DisplayState>>,
}

impl MockDisplay {
    /// Create a mock display and the handle that inspects it.
    pub fn new() -> (Self, MockDisplayHandle) {
        let display = Self::default();
        let handle = MockDisplayHandle {
            state: Arc::clone(&display.state),
        };
        (display, handle)
    }

    fn record(&mut self, event: DisplayEvent) -> Result<()> {
        let mut state = lock(&self.state);
        if state.failing {
            return Err(HardwareError::display_write("mock display failing"));
        }
        tracing::trace!(?event, "mock display");
        state.events.push(event);
        Ok(())
    }
}

impl Display for MockDisplay {
    fn show_text(&mut self, text: &str, duration: Option<Duration>) -> Result<()> {
        self.record(DisplayEvent::Text {
            text: text.to_string(),
            duration,
        })
    }

    fn show_icon(&mut self, icon: Icon) -> Result<()> {
        self.record(DisplayEvent::Icon(icon))
    }

    fn clear(&mut self) -> Result<()> {
        self.record(DisplayEvent::Clear)
    }
}

/// Handle for inspecting a [`MockDisplay`].
#[derive(Debug, Clone)]
pub struct MockDisplayHandle {
    state: Arc<Mutex<DisplayState>>,
}

impl MockDisplayHandle {
    /// Every recorded call, oldest first.
    pub fn events(&self) -> Vec<DisplayEvent> {
        lock(&self.state).events.clone()
    }

    /// Texts shown so far, oldest first.
    pub fn texts(&self) -> Vec<String> {
        lock(&self.state)
            .events
            .iter()
            .filter_map(|event| match event {
                DisplayEvent::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Most recent text shown, if any.
    pub fn last_text(&self) -> Option<String> {
        self.texts().pop()
    }

    /// Icons shown so far, oldest first.
    pub fn icons(&self) -> Vec<Icon> {
        lock(&self.state)
            .events
            .iter()
            .filter_map(|event| match event {
                DisplayEvent::Icon(icon) => Some(*icon),
                _ => None,
            })
            .collect()
    }

    /// Make subsequent calls fail with a communication error.
    pub fn set_failing(&self, failing: bool) {
        lock(&self.state).failing = failing;
    }

    pub fn clear_events(&self) {
        lock(&self.state).events.clear();
    }
}
