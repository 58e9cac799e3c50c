//! Debounce timer for background saves.
//!
//! The timer never reads the clock itself; callers pass `now` so hosts with
//! their own clock (and tests) drive it deterministically.

use std::time::Duration;
use web_time::Instant;

use crate::constants::DEFAULT_AUTOSAVE_DELAY;

/// Tracks the quiet period after the last change.
///
/// Every change restarts the countdown, so a burst of edits produces a single
/// save once the user stops for `debounce_delay`.
#[derive(Debug)]
pub struct AutoSaveTimer {
    /// Quiet period required before a save.
    debounce_delay: Duration,

    /// Time of the last change that still needs saving.
    last_change: Option<Instant>,
}

impl AutoSaveTimer {
    /// Create a timer with the default delay.
    pub fn new() -> Self {
        Self {
            debounce_delay: DEFAULT_AUTOSAVE_DELAY,
            last_change: None,
        }
    }

    /// Set the debounce delay.
    pub fn with_debounce_delay(mut self, delay: Duration) -> Self {
        self.debounce_delay = delay;
        self
    }

    pub fn debounce_delay(&self) -> Duration {
        self.debounce_delay
    }

    /// Start or restart the countdown.
    pub fn restart(&mut self, now: Instant) {
        if self.last_change.is_some() {
            log::trace!("Auto-save: countdown restarted");
        } else {
            log::trace!("Auto-save: countdown started");
        }
        self.last_change = Some(now);
    }

    /// Stop the countdown without saving.
    pub fn cancel(&mut self) {
        if self.last_change.take().is_some() {
            log::trace!("Auto-save: countdown cancelled");
        }
    }

    /// Whether a countdown is running.
    pub fn is_pending(&self) -> bool {
        self.last_change.is_some()
    }

    /// Check if the quiet period has elapsed.
    pub fn is_due(&self, now: Instant) -> bool {
        let Some(last_change) = self.last_change else {
            return false;
        };
        now.saturating_duration_since(last_change) >= self.debounce_delay
    }

    /// Consume the countdown if it is due.
    pub fn take_due(&mut self, now: Instant) -> bool {
        if self.is_due(now) {
            self.last_change = None;
            log::trace!("Auto-save: due");
            true
        } else {
            false
        }
    }

    /// Time left until the countdown fires, for hosts that schedule a wake-up.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.last_change.map(|last_change| {
            self.debounce_delay
                .saturating_sub(now.saturating_duration_since(last_change))
        })
    }
}

impl Default for AutoSaveTimer {
    fn default() -> Self {
        Self::new()
    }
}
