//! The session state machine.
//!
//! [`SessionMachine::apply`] is the single transition function: it consumes
//! one [`SessionEvent`] plus a read-only view of the workspace text, updates
//! session state, and returns the [`Effect`]s the runtime must carry out.
//! It performs no I/O and owns no clocks, so every transition is a plain,
//! non-preemptible function call.
//!
//! Background events carry the [`SessionEpoch`] they were scheduled under.
//! Anything from an epoch other than the current one is dropped here, no
//! matter how late it arrives.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::GlobalConfig;
use crate::escalation::{MessageTimeline, TimelineSignal};
use crate::inspector::{self, Findings};
use crate::models::escalation::{Message, ReasonCategory};
use crate::models::record::SaveRecord;
use crate::models::session::{SessionEpoch, SessionState, Stage, TimerConfig};
use crate::notify::Notification;
use crate::timer::{CountdownTimer, TimerSignal};
use crate::workspace::{READY_PLACEHOLDER, STARTING_TEMPLATE};
use crate::Result;

/// Everything that can happen to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Change the countdown length (idle only).
    ConfigureDuration(u64),
    /// Begin a session.
    Start,
    /// Pause a running session or resume a paused one.
    TogglePause,
    /// Put the starting template back in the workspace.
    Reset,
    /// Abandon the current session and return to idle.
    Restart,
    /// Send the workspace to the record store.
    Save,
    /// Mark a generic message as read.
    Acknowledge {
        /// Message identifier.
        message_id: u32,
    },
    /// One second of running session time.
    Tick {
        /// Epoch the tick was scheduled under.
        epoch: SessionEpoch,
    },
    /// Periodic advisory inspection.
    InspectionDue {
        /// Epoch the check was scheduled under.
        epoch: SessionEpoch,
    },
    /// Countdown reached zero.
    Expired {
        /// Epoch of the countdown.
        epoch: SessionEpoch,
    },
    /// A message went urgent for the first time this session.
    Urgent {
        /// Epoch of the timeline.
        epoch: SessionEpoch,
    },
    /// A message went critical.
    CourtTrigger {
        /// Epoch of the timeline.
        epoch: SessionEpoch,
        /// Free-text reason, classified into a category.
        reason: String,
    },
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Show something to the learner.
    Notify(Notification),
    /// Replace the whole workspace text.
    ReplaceDocument(&'static str),
    /// Lock or unlock learner edits.
    SetEditable(bool),
    /// Cancel existing background jobs and schedule fresh ones for `epoch`.
    ArmJobs {
        /// Epoch the new jobs belong to.
        epoch: SessionEpoch,
    },
    /// Stop producing ticks without cancelling the epoch.
    SuspendJobs,
    /// Resume ticks under the same epoch.
    ResumeJobs,
    /// Cancel every background job.
    CancelJobs,
    /// Hand a record to the persistence collaborator.
    Persist(SaveRecord),
    /// Periodic check found open issues.
    Advisory(Findings),
    /// Stage moved.
    StageChanged(Stage),
}

/// Read-only view of the session for display surfaces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    /// Lifecycle state.
    pub state: SessionState,
    /// Escalation depth.
    pub stage: Stage,
    /// Current epoch.
    pub epoch: SessionEpoch,
    /// Configured countdown length.
    pub duration_seconds: u64,
    /// Seconds left on the clock.
    pub remaining_seconds: u64,
    /// Whether the workspace accepts edits.
    pub editable: bool,
    /// Whether the countdown and messages are shown.
    pub clock_visible: bool,
    /// Messages posted in this epoch.
    pub messages: Vec<Message>,
}

/// Authoritative owner of session state.
#[derive(Debug, Clone)]
pub struct SessionMachine {
    state: SessionState,
    stage: Stage,
    epoch: SessionEpoch,
    timer_config: TimerConfig,
    user_identifier: String,
    timer: CountdownTimer,
    timeline: MessageTimeline,
}

impl SessionMachine {
    /// Build an idle machine from configuration.
    #[must_use]
    pub fn new(config: &GlobalConfig) -> Self {
        Self {
            state: SessionState::Idle,
            stage: Stage::Normal,
            epoch: SessionEpoch::default(),
            timer_config: TimerConfig {
                duration_seconds: config.timer.default_seconds,
            },
            user_identifier: config.persistence.user_identifier.clone(),
            timer: CountdownTimer::new(),
            timeline: MessageTimeline::new(&config.escalation),
        }
    }

    /// Apply one event. `document` is the current workspace text.
    pub fn apply(&mut self, event: SessionEvent, document: &str) -> Vec<Effect> {
        let mut effects = Vec::new();

        if let Some(epoch) = background_epoch(&event) {
            if epoch != self.epoch {
                debug!(%epoch, current = %self.epoch, ?event, "dropping stale event");
                return effects;
            }
        }

        match event {
            SessionEvent::ConfigureDuration(seconds) => self.configure_duration(seconds),
            SessionEvent::Start => match self.start() {
                Ok(started) => effects = started,
                Err(err) => {
                    warn!(%err, "start rejected");
                    effects.push(Effect::Notify(Notification::InvalidDuration));
                }
            },
            SessionEvent::TogglePause => self.toggle_pause(&mut effects),
            SessionEvent::Reset => {
                effects.push(Effect::ReplaceDocument(STARTING_TEMPLATE));
                effects.push(Effect::Notify(Notification::WorkspaceReset));
            }
            SessionEvent::Restart => self.restart(&mut effects),
            SessionEvent::Save => self.save(document, &mut effects),
            SessionEvent::Acknowledge { message_id } => {
                if self.state == SessionState::Running && self.timeline.acknowledge(message_id) {
                    effects.push(Effect::Notify(Notification::MessageAddressed {
                        id: message_id,
                    }));
                } else {
                    debug!(message_id, "acknowledge ignored");
                }
            }
            SessionEvent::Tick { epoch } => self.tick(epoch, document, &mut effects),
            SessionEvent::InspectionDue { .. } => {
                if self.state == SessionState::Running {
                    let findings = inspector::inspect(document);
                    if !findings.is_clean() {
                        effects.push(Effect::Advisory(findings));
                    }
                }
            }
            SessionEvent::Expired { .. } => self.expire(&mut effects),
            SessionEvent::Urgent { .. } => self.escalate_to_urgent(&mut effects),
            SessionEvent::CourtTrigger { reason, .. } => self.summon(&reason, &mut effects),
        }

        effects
    }

    /// Validate the configured duration and start a session.
    ///
    /// Does nothing unless the session is idle.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidConfiguration` when the duration is below
    /// the floor; no state is touched in that case.
    pub fn start(&mut self) -> Result<Vec<Effect>> {
        if self.state != SessionState::Idle {
            debug!(state = %self.state, "start ignored");
            return Ok(Vec::new());
        }
        self.timer_config.validate()?;

        self.epoch = self.epoch.next();
        self.stage = Stage::Normal;
        self.set_state(SessionState::Running);

        let duration_seconds = self.timer_config.duration_seconds;
        self.timer.arm(duration_seconds, self.epoch);
        self.timeline.reset(self.epoch);
        self.timeline.set_disabled(false);

        info!(epoch = %self.epoch, duration_seconds, "session started");
        Ok(vec![
            Effect::ReplaceDocument(STARTING_TEMPLATE),
            Effect::SetEditable(true),
            Effect::ArmJobs { epoch: self.epoch },
            Effect::Notify(Notification::SessionStarted { duration_seconds }),
        ])
    }

    fn configure_duration(&mut self, seconds: u64) {
        if self.state == SessionState::Idle {
            self.timer_config.duration_seconds = seconds;
            debug!(seconds, "duration configured");
        } else {
            debug!(state = %self.state, "duration locked outside idle");
        }
    }

    fn toggle_pause(&mut self, effects: &mut Vec<Effect>) {
        match self.state {
            SessionState::Running => {
                self.set_state(SessionState::Paused);
                self.timer.pause();
                self.timeline.set_disabled(true);
                effects.push(Effect::SuspendJobs);
                effects.push(Effect::SetEditable(false));
                info!(remaining = self.timer.remaining_seconds(), "session paused");
            }
            SessionState::Paused => {
                self.set_state(SessionState::Running);
                self.timer.resume();
                self.timeline.set_disabled(false);
                effects.push(Effect::ResumeJobs);
                effects.push(Effect::SetEditable(true));
                info!(remaining = self.timer.remaining_seconds(), "session resumed");
            }
            SessionState::Idle | SessionState::Ended => {
                debug!(state = %self.state, "toggle pause ignored");
            }
        }
    }

    fn restart(&mut self, effects: &mut Vec<Effect>) {
        self.set_state(SessionState::Idle);
        self.epoch = self.epoch.next();
        if self.stage != Stage::Normal {
            self.stage = Stage::Normal;
            effects.push(Effect::StageChanged(Stage::Normal));
        }
        self.timer = CountdownTimer::new();
        self.timeline.reset(self.epoch);
        self.timeline.set_disabled(true);

        info!(epoch = %self.epoch, "session restarted");
        effects.push(Effect::CancelJobs);
        effects.push(Effect::SetEditable(false));
        effects.push(Effect::ReplaceDocument(READY_PLACEHOLDER));
        effects.push(Effect::Notify(Notification::Restarted));
    }

    fn save(&self, document: &str, effects: &mut Vec<Effect>) {
        if self.state != SessionState::Running {
            debug!(state = %self.state, "save unavailable");
            return;
        }
        effects.push(Effect::Persist(SaveRecord {
            user_identifier: self.user_identifier.clone(),
            document_content: document.to_owned(),
            stage_label: self.stage.label(),
        }));
    }

    fn tick(&mut self, epoch: SessionEpoch, document: &str, effects: &mut Vec<Effect>) {
        if self.state != SessionState::Running {
            return;
        }

        if self.timer.tick(epoch) == Some(TimerSignal::Expired) {
            self.expire(effects);
            return;
        }

        let findings = inspector::inspect(document);
        for signal in self.timeline.advance(epoch, &findings) {
            match signal {
                TimelineSignal::Posted(message) => {
                    effects.push(Effect::Notify(Notification::MessagePosted(message)));
                }
                TimelineSignal::Addressed { id } => {
                    effects.push(Effect::Notify(Notification::MessageAddressed { id }));
                }
                TimelineSignal::Escalated { id, event } => {
                    debug!(
                        message_id = id,
                        category = %event.reason_category,
                        severity = %event.severity,
                        "message escalated"
                    );
                    if let Some(message) = self.timeline.message(id) {
                        effects.push(Effect::Notify(Notification::MessageEscalated(
                            message.clone(),
                        )));
                    }
                }
                TimelineSignal::Urgent => self.escalate_to_urgent(effects),
                TimelineSignal::CourtTrigger { reason, .. } => {
                    self.summon(&reason, effects);
                    break;
                }
            }
        }
    }

    fn expire(&mut self, effects: &mut Vec<Effect>) {
        if self.state != SessionState::Running {
            return;
        }
        self.end();
        info!(epoch = %self.epoch, "countdown expired");
        effects.push(Effect::CancelJobs);
        effects.push(Effect::SetEditable(false));
        effects.push(Effect::Notify(Notification::TimeExpired));
    }

    fn escalate_to_urgent(&mut self, effects: &mut Vec<Effect>) {
        if self.state != SessionState::Running || self.stage != Stage::Normal {
            return;
        }
        self.stage = Stage::Urgent;
        info!(stage = self.stage.number(), "stage advanced");
        effects.push(Effect::StageChanged(Stage::Urgent));
    }

    fn summon(&mut self, reason: &str, effects: &mut Vec<Effect>) {
        if self.state != SessionState::Running {
            return;
        }
        let category = ReasonCategory::from_reason(reason);

        // Court is always preceded by urgent.
        self.escalate_to_urgent(effects);
        self.stage = Stage::Court;
        self.end();

        warn!(reason, %category, epoch = %self.epoch, "court summoned");
        effects.push(Effect::StageChanged(Stage::Court));
        effects.push(Effect::CancelJobs);
        effects.push(Effect::SetEditable(false));
        effects.push(Effect::Notify(Notification::CourtSummoned(category)));
    }

    fn end(&mut self) {
        self.set_state(SessionState::Ended);
        self.timer.disarm();
        self.timeline.set_disabled(true);
    }

    fn set_state(&mut self, next: SessionState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {next}",
            self.state
        );
        self.state = next;
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Current stage.
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Current epoch.
    #[must_use]
    pub fn epoch(&self) -> SessionEpoch {
        self.epoch
    }

    /// Countdown configuration.
    #[must_use]
    pub fn timer_config(&self) -> TimerConfig {
        self.timer_config
    }

    /// Read-only view for display surfaces.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let clock_visible = self.state.clock_visible();
        SessionSnapshot {
            state: self.state,
            stage: self.stage,
            epoch: self.epoch,
            duration_seconds: self.timer_config.duration_seconds,
            remaining_seconds: if clock_visible || self.state == SessionState::Ended {
                self.timer.remaining_seconds()
            } else {
                self.timer_config.duration_seconds
            },
            editable: self.state.is_editable(),
            clock_visible,
            messages: self.timeline.messages().to_vec(),
        }
    }
}

fn background_epoch(event: &SessionEvent) -> Option<SessionEpoch> {
    match event {
        SessionEvent::Tick { epoch }
        | SessionEvent::InspectionDue { epoch }
        | SessionEvent::Expired { epoch }
        | SessionEvent::Urgent { epoch }
        | SessionEvent::CourtTrigger { epoch, .. } => Some(*epoch),
        _ => None,
    }
}
