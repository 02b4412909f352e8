//! Countdown timer driven by game-clock ticks.
//!
//! The timer holds no clock of its own. The orchestrator delivers one
//! [`tick`](CountdownTimer::tick) per running second, tagged with the epoch
//! the tick was scheduled under; ticks from any other epoch are ignored.

use crate::models::session::SessionEpoch;

/// Signal raised by the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerSignal {
    /// Remaining time reached zero. Raised once per arming.
    Expired,
}

/// Single authoritative countdown.
#[derive(Debug, Clone, Default)]
pub struct CountdownTimer {
    duration_seconds: u64,
    remaining_seconds: u64,
    epoch: SessionEpoch,
    armed: bool,
    paused: bool,
    expired: bool,
}

impl CountdownTimer {
    /// Construct a disarmed timer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset remaining time to `duration_seconds` and re-arm expiry for `epoch`.
    ///
    /// The caller validates the duration.
    pub fn arm(&mut self, duration_seconds: u64, epoch: SessionEpoch) {
        self.duration_seconds = duration_seconds;
        self.remaining_seconds = duration_seconds;
        self.epoch = epoch;
        self.armed = true;
        self.paused = false;
        self.expired = false;
    }

    /// Stop all work until re-armed. Remaining time is kept for display.
    pub fn disarm(&mut self) {
        self.armed = false;
    }

    /// Stop decrementing.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume decrementing.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Advance one second.
    ///
    /// Returns [`TimerSignal::Expired`] on the tick that reaches zero.
    pub fn tick(&mut self, epoch: SessionEpoch) -> Option<TimerSignal> {
        if !self.armed || self.paused || self.expired || epoch != self.epoch {
            return None;
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            self.expired = true;
            return Some(TimerSignal::Expired);
        }
        None
    }

    /// Seconds left on the clock.
    #[must_use]
    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    /// Configured length of the current countdown.
    #[must_use]
    pub fn duration_seconds(&self) -> u64 {
        self.duration_seconds
    }

    /// Seconds actually counted down so far.
    #[must_use]
    pub fn elapsed_seconds(&self) -> u64 {
        self.duration_seconds - self.remaining_seconds
    }

    /// Whether expiry has fired for the current arming.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expired
    }

    /// Whether the timer is currently frozen.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }
}
