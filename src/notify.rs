//! User-visible notifications.
//!
//! Every outcome the learner should see goes through a [`Notifier`]. The
//! `Display` impl of [`Notification`] is the exact text shown.

use std::fmt::{Display, Formatter};
use std::io::Write;

use crate::models::escalation::{Message, ReasonCategory, Severity};
use crate::models::session::MIN_DURATION_SECONDS;

/// One-shot textual notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// `Start` rejected because the duration is below the floor.
    InvalidDuration,
    /// A session started.
    SessionStarted {
        /// Seconds on the clock.
        duration_seconds: u64,
    },
    /// Countdown reached zero.
    TimeExpired,
    /// A critical message ended the session.
    CourtSummoned(ReasonCategory),
    /// Workspace content reset to the template.
    WorkspaceReset,
    /// Whole session restarted.
    Restarted,
    /// Record store accepted the save.
    SaveSucceeded,
    /// Record store answered with a failure.
    SaveFailed(String),
    /// Record store could not be reached.
    TransportFailed,
    /// New message in the inbox.
    MessagePosted(Message),
    /// A message went up a severity level.
    MessageEscalated(Message),
    /// A message was dealt with.
    MessageAddressed {
        /// Message identifier.
        id: u32,
    },
}

impl Display for Notification {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDuration => {
                write!(f, "Choose a valid time (>= {MIN_DURATION_SECONDS}s).")
            }
            Self::SessionStarted { duration_seconds } => {
                write!(f, "Session started: {duration_seconds}s on the clock.")
            }
            Self::TimeExpired => f.write_str("Time's up! Court session ended."),
            Self::CourtSummoned(category) => f.write_str(court_text(*category)),
            Self::WorkspaceReset => f.write_str("Workspace reset to starting template."),
            Self::Restarted => f.write_str("Game restarted — set time and press Start."),
            Self::SaveSucceeded => f.write_str("Saved to database!"),
            Self::SaveFailed(reason) => write!(f, "Save failed: {reason}"),
            Self::TransportFailed => f.write_str("Network or server error."),
            Self::MessagePosted(message) | Self::MessageEscalated(message) => {
                let marker = match message.severity {
                    Severity::Advisory => "advisory".to_owned(),
                    other => other.to_string().to_uppercase(),
                };
                write!(
                    f,
                    "[#{} {marker}] {}: {}",
                    message.id, message.sender, message.text
                )
            }
            Self::MessageAddressed { id } => write!(f, "Message #{id} resolved."),
        }
    }
}

fn court_text(category: ReasonCategory) -> &'static str {
    match category {
        ReasonCategory::Accessibility => {
            "Court summoned — accessibility issue (missing alt) was ignored."
        }
        ReasonCategory::Validation => "Court summoned — input validation ignored (Laws of Tort).",
        ReasonCategory::Authentication => "Court summoned — login failure / bankruptcy scenario.",
        ReasonCategory::Security => "Court summoned — security breach / data unsafe.",
        ReasonCategory::Generic => "Court summoned for negligence!",
    }
}

/// Notification surface.
///
/// Fire-and-forget: implementations must not block for long and have no
/// way to report back.
pub trait Notifier: Send + Sync {
    /// Show a notification.
    fn notify(&self, notification: &Notification);
}

/// Prints notifications to stdout, one per line.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: &Notification) {
        let mut out = std::io::stdout().lock();
        if let Err(err) = writeln!(out, "» {notification}") {
            tracing::warn!(%err, "failed to print notification");
        }
    }
}
