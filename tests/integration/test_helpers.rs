//! Shared helpers for runtime integration tests.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use courtroom_drill::config::GlobalConfig;
use courtroom_drill::models::record::{SaveReceipt, SaveRecord};
use courtroom_drill::notify::{Notification, Notifier};
use courtroom_drill::orchestrator::{Collaborators, SessionHandle, SessionRuntime, SessionSnapshot};
use courtroom_drill::persistence::RecordStore;
use courtroom_drill::workspace::SharedDocument;
use courtroom_drill::{AppError, Result};

/// Notifier that keeps every notification.
#[derive(Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn all(&self) -> Vec<Notification> {
        self.seen.lock().unwrap().clone()
    }

    pub fn contains(&self, notification: &Notification) -> bool {
        self.seen.lock().unwrap().contains(notification)
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) {
        self.seen.lock().unwrap().push(notification.clone());
    }
}

/// Record store that keeps every record and answers with a fixed outcome.
pub struct RecordingStore {
    saved: Mutex<Vec<SaveRecord>>,
    outcome: Result<SaveReceipt>,
}

impl RecordingStore {
    pub fn accepting() -> Self {
        Self::answering(Ok(SaveReceipt {
            record_id: Some("rec-1".into()),
        }))
    }

    pub fn answering(outcome: Result<SaveReceipt>) -> Self {
        Self {
            saved: Mutex::default(),
            outcome,
        }
    }

    pub fn saved(&self) -> Vec<SaveRecord> {
        self.saved.lock().unwrap().clone()
    }
}

impl RecordStore for RecordingStore {
    fn save<'a>(
        &'a self,
        record: &'a SaveRecord,
    ) -> Pin<Box<dyn Future<Output = Result<SaveReceipt>> + Send + 'a>> {
        Box::pin(async move {
            self.saved.lock().unwrap().push(record.clone());
            self.outcome.clone()
        })
    }
}

/// A running session plus handles on everything it touches.
pub struct Harness {
    pub session: SessionHandle,
    pub document: SharedDocument,
    pub notifier: Arc<RecordingNotifier>,
    pub store: Arc<RecordingStore>,
    pub cancel: CancellationToken,
    pub task: JoinHandle<()>,
}

impl Harness {
    pub fn spawn(config: &GlobalConfig) -> Self {
        Self::spawn_with_store(config, Arc::new(RecordingStore::accepting()))
    }

    pub fn spawn_with_store(config: &GlobalConfig, store: Arc<RecordingStore>) -> Self {
        let document = SharedDocument::default();
        let notifier = Arc::new(RecordingNotifier::default());
        let cancel = CancellationToken::new();
        let collaborators = Collaborators {
            workspace: Arc::new(document.clone()),
            notifier: Arc::clone(&notifier) as Arc<dyn Notifier>,
            store: Arc::clone(&store) as Arc<dyn RecordStore>,
        };
        let (session, task) = SessionRuntime::spawn(config, collaborators, cancel.clone());
        Self {
            session,
            document,
            notifier,
            store,
            cancel,
            task,
        }
    }

    /// Wait (in session time) until the published snapshot satisfies `pred`.
    pub async fn wait_for(&self, pred: impl FnMut(&SessionSnapshot) -> bool) -> SessionSnapshot {
        let mut rx = self.session.subscribe();
        let snapshot = tokio::time::timeout(Duration::from_secs(600), rx.wait_for(pred))
            .await
            .expect("snapshot condition reached in time")
            .expect("runtime alive")
            .clone();
        snapshot
    }

    /// Poll until the notifier has seen `notification`.
    pub async fn wait_for_notification(&self, notification: &Notification) {
        for _ in 0..500 {
            if self.notifier.contains(notification) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!(
            "never saw {notification:?}; got {:?}",
            self.notifier.all()
        );
    }

    pub async fn shutdown(self) {
        self.cancel.cancel();
        self.task.await.expect("runtime task");
    }
}

/// Defaults with no scripted messages.
pub fn quiet_config() -> GlobalConfig {
    let mut config = GlobalConfig::default();
    config.escalation.messages.clear();
    config
}

/// Convenience for a failing store outcome.
pub fn rejecting(reason: &str) -> Result<SaveReceipt> {
    Err(AppError::Persistence(reason.into()))
}

/// A page with every issue fixed.
pub const FIXED_PAGE: &str = r#"<h1>Project: Example Page</h1>
<img src="logo.png" alt="Company logo">
<form method="post" action="/login">
  <input type="text" name="name" placeholder="Name" required>
  <input type="password" name="password" required>
  <button>Submit</button>
</form>"#;
