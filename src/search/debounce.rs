//! Query debounce control
//!
//! Coalesces rapid keystrokes into a single settled query: every new raw
//! value restarts the quiet-period deadline, and only a value that survives
//! the full quiet period uninterrupted settles. Intermediate values never
//! reach the fetch pipeline.

use std::time::{Duration, Instant};

/// Default quiet period (300ms)
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, PartialEq, Eq)]
enum DebounceState {
    Idle,
    Pending { value: String, since: Instant },
}

/// Debounce state machine for the search input.
///
/// Driven by polling from the event loop: `note_input` on every keystroke,
/// `poll_settled` on every tick. A settle is emitted at most once per
/// uninterrupted quiet period, after which the machine returns to idle.
#[derive(Debug)]
pub struct QueryDebouncer {
    quiet_period: Duration,
    state: DebounceState,
}

impl QueryDebouncer {
    pub fn new() -> Self {
        Self::with_quiet_period(DEFAULT_QUIET_PERIOD)
    }

    pub fn with_quiet_period(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            state: DebounceState::Idle,
        }
    }

    /// Record a new raw input value. Cancels any pending deadline outright
    /// and starts a fresh one for this value.
    pub fn note_input(&mut self, value: impl Into<String>) {
        self.state = DebounceState::Pending {
            value: value.into(),
            since: Instant::now(),
        };
    }

    /// Cancel the pending deadline without settling. Used on teardown and
    /// when the query is superseded by other means (e.g. Escape).
    pub fn cancel(&mut self) {
        self.state = DebounceState::Idle;
    }

    /// Return the settled value if the quiet period has elapsed since the
    /// last keystroke, transitioning back to idle. Returns `None` while
    /// idle or while the deadline is still running.
    pub fn poll_settled(&mut self) -> Option<String> {
        match &self.state {
            DebounceState::Pending { value, since } if since.elapsed() >= self.quiet_period => {
                let settled = value.clone();
                self.state = DebounceState::Idle;
                Some(settled)
            }
            _ => None,
        }
    }

    /// Whether a value is waiting out its quiet period
    pub fn is_pending(&self) -> bool {
        matches!(self.state, DebounceState::Pending { .. })
    }

    /// Time remaining until the pending value settles; zero if already due
    pub fn time_until_settle(&self) -> Option<Duration> {
        match &self.state {
            DebounceState::Pending { since, .. } => {
                Some(self.quiet_period.saturating_sub(since.elapsed()))
            }
            DebounceState::Idle => None,
        }
    }
}

impl Default for QueryDebouncer {
    fn default() -> Self {
        Self::new()
    }
}
