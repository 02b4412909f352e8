//! Epoch-tagged, pausable background tickers.
//!
//! Each [`Ticker`] is a tokio task that sends one [`SessionEvent`] per
//! period into the runtime's event channel, stamped with the epoch it was
//! spawned for. The runtime owns the returned [`TickerHandle`]s directly:
//! dropping a handle cancels its task, [`pause`](TickerHandle::pause) stops
//! new ticks without giving up the epoch, and [`resume`](TickerHandle::resume)
//! restarts the period from zero.
//!
//! Tickers only hold a weak sender, so they never keep the runtime's event
//! channel open on their own.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info_span, Instrument};

use crate::models::session::SessionEpoch;

use super::machine::SessionEvent;

/// Which event a ticker produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickKind {
    /// One second of session time.
    Clock,
    /// Periodic advisory inspection.
    Inspection,
}

impl TickKind {
    fn event(self, epoch: SessionEpoch) -> SessionEvent {
        match self {
            Self::Clock => SessionEvent::Tick { epoch },
            Self::Inspection => SessionEvent::InspectionDue { epoch },
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Clock => "clock",
            Self::Inspection => "inspection",
        }
    }
}

/// Builder for one background ticker.
///
/// Call [`spawn`](Self::spawn) to start the task.
pub struct Ticker {
    kind: TickKind,
    period: Duration,
    epoch: SessionEpoch,
    events: mpsc::WeakSender<SessionEvent>,
    cancel: CancellationToken,
}

impl Ticker {
    /// Construct a ticker (does not start it yet).
    #[must_use]
    pub fn new(
        kind: TickKind,
        period: Duration,
        epoch: SessionEpoch,
        events: mpsc::WeakSender<SessionEvent>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            kind,
            period,
            epoch,
            events,
            cancel,
        }
    }

    /// Spawn the background task and return a handle for controlling it.
    #[must_use]
    pub fn spawn(self) -> TickerHandle {
        let wake = Arc::new(Notify::new());
        let paused = Arc::new(AtomicBool::new(false));
        let cancel_for_handle = self.cancel.clone();
        let epoch = self.epoch;
        let span = info_span!("ticker", kind = self.kind.name(), epoch = %epoch);

        let task = tokio::spawn(
            Self::run(
                self.kind,
                self.period,
                self.epoch,
                self.events,
                self.cancel,
                Arc::clone(&wake),
                Arc::clone(&paused),
            )
            .instrument(span),
        );

        TickerHandle {
            kind: self.kind,
            epoch,
            wake,
            paused,
            join_handle: Some(task),
            cancel: cancel_for_handle,
        }
    }

    async fn run(
        kind: TickKind,
        period: Duration,
        epoch: SessionEpoch,
        events: mpsc::WeakSender<SessionEvent>,
        cancel: CancellationToken,
        wake: Arc<Notify>,
        paused: Arc<AtomicBool>,
    ) {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if paused.load(Ordering::SeqCst) {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    () = wake.notified() => {}
                }
                if !paused.load(Ordering::SeqCst) {
                    interval.reset();
                }
                continue;
            }

            tokio::select! {
                () = cancel.cancelled() => break,
                // Pause flag changed; re-check it.
                () = wake.notified() => continue,
                _ = interval.tick() => {}
            }

            if paused.load(Ordering::SeqCst) {
                continue;
            }
            let Some(tx) = events.upgrade() else {
                debug!("event channel gone");
                break;
            };
            if tx.send(kind.event(epoch)).await.is_err() {
                debug!("event channel closed");
                break;
            }
        }

        debug!("ticker stopped");
    }
}

/// Handle returned from [`Ticker::spawn`].
pub struct TickerHandle {
    kind: TickKind,
    epoch: SessionEpoch,
    wake: Arc<Notify>,
    paused: Arc<AtomicBool>,
    join_handle: Option<JoinHandle<()>>,
    cancel: CancellationToken,
}

impl Drop for TickerHandle {
    /// Cancel the background task when the handle is dropped.
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl TickerHandle {
    /// Stop producing ticks.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
        self.wake.notify_one();
    }

    /// Produce ticks again, one full period from now.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
        self.wake.notify_one();
    }

    /// Whether ticks are suspended.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Epoch stamped on every tick.
    #[must_use]
    pub fn epoch(&self) -> SessionEpoch {
        self.epoch
    }

    /// Event kind produced.
    #[must_use]
    pub fn kind(&self) -> TickKind {
        self.kind
    }

    /// Cancel the task and wait for it to exit.
    pub async fn await_completion(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.join_handle.take() {
            let _ = handle.await;
        }
    }
}
