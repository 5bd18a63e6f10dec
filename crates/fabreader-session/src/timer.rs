//! Retry timers for handshake steps and heartbeats.

use std::time::{Duration, Instant};

/// Timestamp of the last send paired with its retry interval.
///
/// An action is due when it has never been sent, or when at least
/// `interval` has passed since the last send.
///
/// # Examples
///
/// ```
/// use fabreader_session::RetryTimer;
/// use std::time::{Duration, Instant};
///
/// let start = Instant::now();
/// let mut timer = RetryTimer::new(Duration::from_secs(10));
/// assert!(timer.is_due(start));
///
/// timer.mark(start);
/// assert!(!timer.is_due(start + Duration::from_secs(9)));
/// assert!(timer.is_due(start + Duration::from_secs(10)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryTimer {
    last_sent: Option<Instant>,
    interval: Duration,
}

impl RetryTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            last_sent: None,
            interval,
        }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.last_sent
            .is_none_or(|sent| now.saturating_duration_since(sent) >= self.interval)
    }

    /// Record a send at `now`.
    pub fn mark(&mut self, now: Instant) {
        self.last_sent = Some(now);
    }

    /// Forget the last send so the action is due immediately.
    pub fn clear(&mut self) {
        self.last_sent = None;
    }

    pub fn last_sent(&self) -> Option<Instant> {
        self.last_sent
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time left until the action is due; zero if it already is.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.last_sent {
            Some(sent) => self
                .interval
                .saturating_sub(now.saturating_duration_since(sent)),
            None => Duration::ZERO,
        }
    }
}
