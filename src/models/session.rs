//! Session lifecycle model: state, stage, epoch and timer configuration.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{AppError, Result};

/// Shortest countdown a session may be started with, in seconds.
pub const MIN_DURATION_SECONDS: u64 = 5;

/// Lifecycle status for a drill session.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No session started yet, or restarted and waiting for `Start`.
    #[default]
    Idle,
    /// Countdown and escalation clock are running; the workspace is editable.
    Running,
    /// Clocks frozen by the learner.
    Paused,
    /// Terminal until an explicit restart.
    Ended,
}

impl SessionState {
    /// Determine whether a lifecycle transition is permitted.
    ///
    /// Any state may go back to `Idle` (restart).
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle | Self::Paused, Self::Running)
                | (Self::Running, Self::Paused | Self::Ended)
                | (_, Self::Idle)
        )
    }

    /// The workspace accepts edits only while running.
    #[must_use]
    pub fn is_editable(self) -> bool {
        self == Self::Running
    }

    /// Whether the countdown and message panel are shown.
    #[must_use]
    pub fn clock_visible(self) -> bool {
        matches!(self, Self::Running | Self::Paused)
    }
}

impl Display for SessionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Ended => "ended",
        };
        f.write_str(label)
    }
}

/// Coarse escalation depth surfaced to the learner.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Normal work.
    #[default]
    Normal = 1,
    /// At least one message went urgent.
    Urgent = 2,
    /// Summoned to court; terminal.
    Court = 3,
}

impl Stage {
    /// Numeric stage as shown in the workspace header.
    #[must_use]
    pub fn number(self) -> u8 {
        self as u8
    }

    /// Label sent to the record store, e.g. `Stage2`.
    #[must_use]
    pub fn label(self) -> String {
        format!("Stage{}", self.number())
    }
}

/// Generation counter distinguishing one session attempt from the next.
///
/// Every background event carries the epoch it was scheduled under; the
/// state machine drops events whose epoch is not the current one.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionEpoch(u64);

impl SessionEpoch {
    /// Construct an epoch from its raw value.
    #[must_use]
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// The epoch following this one.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Raw counter value.
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl Display for SessionEpoch {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Countdown configuration; editable only while the session is idle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct TimerConfig {
    /// Countdown length in seconds.
    pub duration_seconds: u64,
}

impl TimerConfig {
    /// Check the duration against the floor. There is no upper bound.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidConfiguration` when the duration is below
    /// [`MIN_DURATION_SECONDS`].
    pub fn validate(&self) -> Result<()> {
        if self.duration_seconds < MIN_DURATION_SECONDS {
            return Err(AppError::InvalidConfiguration(format!(
                "duration must be at least {MIN_DURATION_SECONDS}s, got {}s",
                self.duration_seconds
            )));
        }
        Ok(())
    }
}
