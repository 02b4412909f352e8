//! Message escalation timeline.
//!
//! Posts scripted messages as session time passes. Every unaddressed message
//! escalates `advisory -> urgent -> critical` on fixed deadlines measured
//! from when it was posted. The first urgent message of a session raises
//! [`TimelineSignal::Urgent`]; the first critical one raises
//! [`TimelineSignal::CourtTrigger`] and the timeline goes quiet until reset.
//!
//! Time is whatever the caller says it is: one [`advance`](MessageTimeline::advance)
//! is one second of running session time, so pausing the session freezes
//! every deadline.

use tracing::debug;

use crate::config::{EscalationConfig, ScriptedMessage};
use crate::inspector::Findings;
use crate::models::escalation::{EscalationEvent, Message, ReasonCategory, Severity};
use crate::models::session::SessionEpoch;

/// Output of one timeline step, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineSignal {
    /// A scripted message arrived.
    Posted(Message),
    /// A pending message is no longer needed.
    Addressed {
        /// Message identifier.
        id: u32,
    },
    /// A message moved up a severity level.
    Escalated {
        /// Message identifier.
        id: u32,
        /// Category and the severity reached.
        event: EscalationEvent,
    },
    /// First message of the session went urgent.
    Urgent,
    /// A message went critical; the timeline is now inert.
    CourtTrigger {
        /// The message's free-text reason.
        reason: String,
        /// Classified reason.
        category: ReasonCategory,
    },
}

/// Scripted, epoch-keyed message timeline.
#[derive(Debug, Clone)]
pub struct MessageTimeline {
    urgent_after_seconds: u64,
    critical_after_seconds: u64,
    script: Vec<ScriptedMessage>,
    epoch: SessionEpoch,
    elapsed_seconds: u64,
    cursor: usize,
    messages: Vec<Message>,
    disabled: bool,
    urgent_raised: bool,
    triggered: bool,
}

impl MessageTimeline {
    /// Build a timeline from configuration. Starts disabled.
    #[must_use]
    pub fn new(config: &EscalationConfig) -> Self {
        let mut script = config.messages.clone();
        script.sort_by_key(|m| m.at_seconds);
        Self {
            urgent_after_seconds: config.urgent_after_seconds,
            critical_after_seconds: config.critical_after_seconds,
            script,
            epoch: SessionEpoch::default(),
            elapsed_seconds: 0,
            cursor: 0,
            messages: Vec::new(),
            disabled: true,
            urgent_raised: false,
            triggered: false,
        }
    }

    /// Drop every message and counter and key the timeline to `epoch`.
    pub fn reset(&mut self, epoch: SessionEpoch) {
        self.epoch = epoch;
        self.elapsed_seconds = 0;
        self.cursor = 0;
        self.messages.clear();
        self.urgent_raised = false;
        self.triggered = false;
    }

    /// Suspend (`true`) or allow (`false`) all timeline work.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// Advance one second of session time.
    pub fn advance(&mut self, epoch: SessionEpoch, findings: &Findings) -> Vec<TimelineSignal> {
        if self.disabled || self.triggered || epoch != self.epoch {
            return Vec::new();
        }

        self.elapsed_seconds += 1;
        let now = self.elapsed_seconds;
        let mut signals = Vec::new();

        self.post_due(now, &mut signals);

        let urgent_after = self.urgent_after_seconds;
        let critical_after = self.critical_after_seconds;
        for message in self.messages.iter_mut().filter(|m| !m.addressed) {
            if message.category != ReasonCategory::Generic && !findings.blocks(message.category) {
                message.addressed = true;
                debug!(message_id = message.id, category = %message.category, "message addressed by fix");
                signals.push(TimelineSignal::Addressed { id: message.id });
                continue;
            }

            let age = message.age(now);
            let due = if age >= critical_after {
                Severity::Critical
            } else if age >= urgent_after {
                Severity::Urgent
            } else {
                Severity::Advisory
            };
            if due <= message.severity {
                continue;
            }

            message.severity = due;
            signals.push(TimelineSignal::Escalated {
                id: message.id,
                event: message.escalation(),
            });

            if !self.urgent_raised {
                self.urgent_raised = true;
                signals.push(TimelineSignal::Urgent);
            }

            if due == Severity::Critical {
                self.triggered = true;
                signals.push(TimelineSignal::CourtTrigger {
                    reason: message.reason.clone(),
                    category: message.category,
                });
                break;
            }
        }

        signals
    }

    fn post_due(&mut self, now: u64, signals: &mut Vec<TimelineSignal>) {
        while let Some(next) = self.script.get(self.cursor) {
            if next.at_seconds > now {
                break;
            }
            self.cursor += 1;
            let message = Message {
                id: u32::try_from(self.cursor).unwrap_or(u32::MAX),
                reason: next.reason.clone(),
                category: ReasonCategory::from_reason(&next.reason),
                sender: next.sender.clone(),
                text: next.text.clone(),
                severity: Severity::Advisory,
                posted_at: now,
                addressed: false,
            };
            debug!(message_id = message.id, category = %message.category, "message posted");
            signals.push(TimelineSignal::Posted(message.clone()));
            self.messages.push(message);
        }
    }

    /// Mark a pending generic message as read.
    ///
    /// Messages in other categories close only when the workspace is fixed,
    /// so acknowledging them does nothing. Returns whether the message was
    /// addressed by this call.
    pub fn acknowledge(&mut self, id: u32) -> bool {
        if self.disabled || self.triggered {
            return false;
        }
        match self.messages.iter_mut().find(|m| m.id == id) {
            Some(message) if !message.addressed && message.category == ReasonCategory::Generic => {
                message.addressed = true;
                true
            }
            _ => false,
        }
    }

    /// Look up a posted message.
    #[must_use]
    pub fn message(&self, id: u32) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Messages posted so far in this epoch.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Messages still waiting on the learner.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.messages.iter().filter(|m| !m.addressed).count()
    }

    /// Seconds of session time the timeline has seen.
    #[must_use]
    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    /// Whether a court trigger has fired in this epoch.
    #[must_use]
    pub fn has_triggered(&self) -> bool {
        self.triggered
    }
}
