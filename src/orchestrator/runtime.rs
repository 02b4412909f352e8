//! Async host loop for a session.
//!
//! [`SessionRuntime`] owns the [`SessionMachine`] and is the only task that
//! touches it. User actions (through a [`SessionHandle`]) and background
//! ticks arrive on one channel and are applied strictly one at a time; the
//! resulting effects are carried out against the workspace, the notifier,
//! the record store and the runtime's own ticker handles.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::config::GlobalConfig;
use crate::inspector::Findings;
use crate::models::escalation::ReasonCategory;
use crate::models::record::SaveRecord;
use crate::models::session::SessionEpoch;
use crate::notify::{Notification, Notifier};
use crate::persistence::RecordStore;
use crate::workspace::Workspace;
use crate::{AppError, Result};

use super::machine::{Effect, SessionEvent, SessionMachine, SessionSnapshot};
use super::ticker::{TickKind, Ticker, TickerHandle};

/// Length of one second of session time.
pub const GAME_SECOND: Duration = Duration::from_secs(1);

const EVENT_QUEUE_CAPACITY: usize = 64;

/// Collaborators the runtime drives.
#[derive(Clone)]
pub struct Collaborators {
    /// Editor surface.
    pub workspace: Arc<dyn Workspace>,
    /// Notification surface.
    pub notifier: Arc<dyn Notifier>,
    /// Persistence collaborator.
    pub store: Arc<dyn RecordStore>,
}

/// Background jobs for one epoch, owned by the runtime.
struct BackgroundJobs {
    clock: TickerHandle,
    inspection: TickerHandle,
}

impl BackgroundJobs {
    fn pause(&self) {
        self.clock.pause();
        self.inspection.pause();
    }

    fn resume(&self) {
        self.clock.resume();
        self.inspection.resume();
    }
}

/// Cheap, cloneable front door to a running session.
#[derive(Clone)]
pub struct SessionHandle {
    events: mpsc::Sender<SessionEvent>,
    snapshots: watch::Receiver<SessionSnapshot>,
}

impl SessionHandle {
    /// Queue an event for the session.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Closed` if the runtime has stopped.
    pub async fn send(&self, event: SessionEvent) -> Result<()> {
        self.events
            .send(event)
            .await
            .map_err(|_| AppError::Closed("session runtime stopped".into()))
    }

    /// Set the countdown length (ignored unless idle).
    ///
    /// # Errors
    ///
    /// Returns `AppError::Closed` if the runtime has stopped.
    pub async fn configure_duration(&self, seconds: u64) -> Result<()> {
        self.send(SessionEvent::ConfigureDuration(seconds)).await
    }

    /// Start a session.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Closed` if the runtime has stopped.
    pub async fn start(&self) -> Result<()> {
        self.send(SessionEvent::Start).await
    }

    /// Pause or resume.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Closed` if the runtime has stopped.
    pub async fn toggle_pause(&self) -> Result<()> {
        self.send(SessionEvent::TogglePause).await
    }

    /// Reset workspace content.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Closed` if the runtime has stopped.
    pub async fn reset(&self) -> Result<()> {
        self.send(SessionEvent::Reset).await
    }

    /// Restart the whole session.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Closed` if the runtime has stopped.
    pub async fn restart(&self) -> Result<()> {
        self.send(SessionEvent::Restart).await
    }

    /// Save the workspace.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Closed` if the runtime has stopped.
    pub async fn save(&self) -> Result<()> {
        self.send(SessionEvent::Save).await
    }

    /// Acknowledge a generic message.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Closed` if the runtime has stopped.
    pub async fn acknowledge(&self, message_id: u32) -> Result<()> {
        self.send(SessionEvent::Acknowledge { message_id }).await
    }

    /// Latest published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Subscribe to snapshot updates.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }
}

/// Single-task event loop around a [`SessionMachine`].
pub struct SessionRuntime {
    machine: SessionMachine,
    collaborators: Collaborators,
    events_rx: mpsc::Receiver<SessionEvent>,
    events_weak: mpsc::WeakSender<SessionEvent>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
    jobs: Option<BackgroundJobs>,
    inspection_period: Duration,
    saves: TaskTracker,
    cancel: CancellationToken,
}

impl SessionRuntime {
    /// Spawn the runtime task.
    ///
    /// The task ends when `cancel` fires or every [`SessionHandle`] is
    /// dropped. In-flight saves are awaited before it exits.
    #[must_use]
    pub fn spawn(
        config: &GlobalConfig,
        collaborators: Collaborators,
        cancel: CancellationToken,
    ) -> (SessionHandle, JoinHandle<()>) {
        let machine = SessionMachine::new(config);
        let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
        let (snapshot_tx, snapshots) = watch::channel(machine.snapshot());

        let runtime = Self {
            machine,
            collaborators,
            events_rx,
            events_weak: events_tx.downgrade(),
            snapshot_tx,
            jobs: None,
            inspection_period: Duration::from_secs(config.inspection.interval_seconds),
            saves: TaskTracker::new(),
            cancel,
        };

        let task = tokio::spawn(runtime.run().instrument(info_span!("session_runtime")));
        let handle = SessionHandle {
            events: events_tx,
            snapshots,
        };
        (handle, task)
    }

    async fn run(mut self) {
        // Locked until the first start.
        self.collaborators.workspace.set_editable(false);

        loop {
            let event = tokio::select! {
                () = self.cancel.cancelled() => {
                    info!("session runtime shutting down");
                    break;
                }
                maybe_event = self.events_rx.recv() => {
                    if let Some(event) = maybe_event { event } else {
                        info!("all session handles dropped");
                        break;
                    }
                }
            };

            let document = self.collaborators.workspace.text();
            let effects = self.machine.apply(event, &document);
            for effect in effects {
                self.perform(effect);
            }
            self.snapshot_tx.send_replace(self.machine.snapshot());
        }

        self.jobs = None;
        self.saves.close();
        self.saves.wait().await;
    }

    fn perform(&mut self, effect: Effect) {
        match effect {
            Effect::Notify(notification) => {
                info!(%notification, "notify");
                self.collaborators.notifier.notify(&notification);
            }
            Effect::ReplaceDocument(text) => self.collaborators.workspace.replace(text),
            Effect::SetEditable(editable) => self.collaborators.workspace.set_editable(editable),
            Effect::ArmJobs { epoch } => {
                // Old handles cancel on drop before the new ones start.
                self.jobs = None;
                self.jobs = Some(self.spawn_jobs(epoch));
            }
            Effect::SuspendJobs => {
                if let Some(jobs) = &self.jobs {
                    jobs.pause();
                }
            }
            Effect::ResumeJobs => {
                if let Some(jobs) = &self.jobs {
                    jobs.resume();
                }
            }
            Effect::CancelJobs => {
                if self.jobs.take().is_some() {
                    debug!("background jobs cancelled");
                }
            }
            Effect::Persist(record) => self.persist(record),
            Effect::Advisory(findings) => log_advisory(findings),
            Effect::StageChanged(stage) => info!(stage = stage.number(), "stage changed"),
        }
    }

    fn spawn_jobs(&self, epoch: SessionEpoch) -> BackgroundJobs {
        let ticker = |kind, period| {
            Ticker::new(
                kind,
                period,
                epoch,
                self.events_weak.clone(),
                self.cancel.child_token(),
            )
            .spawn()
        };
        debug!(%epoch, "arming background jobs");
        BackgroundJobs {
            clock: ticker(TickKind::Clock, GAME_SECOND),
            inspection: ticker(TickKind::Inspection, self.inspection_period),
        }
    }

    fn persist(&self, record: SaveRecord) {
        let store = Arc::clone(&self.collaborators.store);
        let notifier = Arc::clone(&self.collaborators.notifier);
        let stage = record.stage_label.clone();

        self.saves.spawn(
            async move {
                let notification = match store.save(&record).await {
                    Ok(receipt) => {
                        info!(record_id = ?receipt.record_id, "record saved");
                        Notification::SaveSucceeded
                    }
                    Err(AppError::Transport(err)) => {
                        warn!(%err, "record store unreachable");
                        Notification::TransportFailed
                    }
                    Err(AppError::Persistence(reason)) => {
                        warn!(%reason, "record store rejected save");
                        Notification::SaveFailed(reason)
                    }
                    Err(err) => {
                        warn!(%err, "save failed");
                        Notification::SaveFailed(err.to_string())
                    }
                };
                notifier.notify(&notification);
            }
            .instrument(info_span!("save", stage = %stage)),
        );
    }
}

fn log_advisory(findings: Findings) {
    for category in findings.open_categories() {
        match category {
            ReasonCategory::Accessibility => {
                warn!("Accessibility reminder: missing alt attribute");
            }
            ReasonCategory::Validation => warn!("Validation reminder: unvalidated input field"),
            ReasonCategory::Authentication => warn!("Login reminder: no password field"),
            ReasonCategory::Security => warn!("Security reminder: form does not post securely"),
            ReasonCategory::Generic => {}
        }
    }
}
