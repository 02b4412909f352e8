//! Escalation model: reason categories, severities and workplace messages.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// What a message (and an eventual court summons) is about.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCategory {
    /// Missing `alt` text and similar accessibility faults.
    Accessibility,
    /// Form inputs accepting anything.
    Validation,
    /// No way for users to log in.
    Authentication,
    /// Data submitted unsafely.
    Security,
    /// Anything else.
    Generic,
}

impl ReasonCategory {
    /// Classify a free-text reason, case-insensitively.
    ///
    /// Authentication needs the phrase `user login`; a bare `login` is generic.
    ///
    /// ```
    /// use courtroom_drill::models::escalation::ReasonCategory;
    ///
    /// assert_eq!(ReasonCategory::from_reason("Missing ALT"), ReasonCategory::Accessibility);
    /// assert_eq!(ReasonCategory::from_reason("coffee"), ReasonCategory::Generic);
    /// ```
    #[must_use]
    pub fn from_reason(reason: &str) -> Self {
        let reason = reason.to_lowercase();
        if reason.contains("alt") {
            Self::Accessibility
        } else if reason.contains("validation") {
            Self::Validation
        } else if reason.contains("user login") {
            Self::Authentication
        } else if reason.contains("secure") {
            Self::Security
        } else {
            Self::Generic
        }
    }
}

impl Display for ReasonCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Accessibility => "accessibility",
            Self::Validation => "validation",
            Self::Authentication => "authentication",
            Self::Security => "security",
            Self::Generic => "generic",
        };
        f.write_str(label)
    }
}

/// How loudly a message is demanding attention.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Freshly posted.
    #[default]
    Advisory,
    /// Ignored past the first deadline.
    Urgent,
    /// Ignored past the final deadline; triggers court.
    Critical,
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Advisory => "advisory",
            Self::Urgent => "urgent",
            Self::Critical => "critical",
        };
        f.write_str(label)
    }
}

/// A severity change for one category, consumed once by the orchestrator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct EscalationEvent {
    /// What the message was about.
    pub reason_category: ReasonCategory,
    /// Severity reached.
    pub severity: Severity,
}

/// A message posted to the learner's inbox during a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct Message {
    /// 1-based identifier, unique within an epoch.
    pub id: u32,
    /// Free-text reason, classified into `category`.
    pub reason: String,
    /// Classified reason.
    pub category: ReasonCategory,
    /// Who is asking (boss, agile coach, ...).
    pub sender: String,
    /// Body shown to the learner.
    pub text: String,
    /// Current severity.
    pub severity: Severity,
    /// Session second at which the message was posted.
    pub posted_at: u64,
    /// Whether the learner has dealt with it.
    pub addressed: bool,
}

impl Message {
    /// Seconds this message has been open at session second `now`.
    #[must_use]
    pub fn age(&self, now: u64) -> u64 {
        now.saturating_sub(self.posted_at)
    }

    /// Escalation snapshot for this message.
    #[must_use]
    pub fn escalation(&self) -> EscalationEvent {
        EscalationEvent {
            reason_category: self.category,
            severity: self.severity,
        }
    }
}
