//! Workspace editor surface.
//!
//! The editor owns the document text. The orchestrator reads it, replaces it
//! wholesale on start/reset/restart, and toggles whether the learner may edit.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{AppError, Result};

/// Document loaded on `Start` and `Reset`.
pub const STARTING_TEMPLATE: &str = r#"<h1>Project: Example Page</h1>
<img src="logo.png">
<form>
  <input type="text" name="name" placeholder="Name">
  <button>Submit</button>
</form>"#;

/// Document shown before the first start and after a restart.
pub const READY_PLACEHOLDER: &str = "<h1>Ready — set a timer and press Start</h1>";

/// What the orchestrator needs from the editor.
pub trait Workspace: Send + Sync {
    /// Current document text.
    fn text(&self) -> String;

    /// Replace the whole document.
    fn replace(&self, text: &str);

    /// Allow or forbid learner edits.
    fn set_editable(&self, editable: bool);
}

#[derive(Debug)]
struct DocumentState {
    text: String,
    editable: bool,
}

/// In-memory document shared between the front end and the orchestrator.
#[derive(Debug, Clone)]
pub struct SharedDocument {
    inner: Arc<Mutex<DocumentState>>,
}

impl Default for SharedDocument {
    fn default() -> Self {
        Self::new(READY_PLACEHOLDER)
    }
}

impl SharedDocument {
    /// Create a read-only document with the given text.
    #[must_use]
    pub fn new(text: &str) -> Self {
        Self {
            inner: Arc::new(Mutex::new(DocumentState {
                text: text.to_owned(),
                editable: false,
            })),
        }
    }

    /// Learner edit: replace the text if the workspace is editable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ReadOnly` while the session is not running.
    pub fn edit(&self, text: &str) -> Result<()> {
        let mut state = self.lock();
        if !state.editable {
            return Err(AppError::ReadOnly(
                "workspace is locked until the session is running".into(),
            ));
        }
        text.clone_into(&mut state.text);
        Ok(())
    }

    /// Whether learner edits are currently accepted.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        self.lock().editable
    }

    // A poisoned lock still holds a consistent string; keep using it.
    fn lock(&self) -> MutexGuard<'_, DocumentState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Workspace for SharedDocument {
    fn text(&self) -> String {
        self.lock().text.clone()
    }

    fn replace(&self, text: &str) {
        text.clone_into(&mut self.lock().text);
    }

    fn set_editable(&self, editable: bool) {
        self.lock().editable = editable;
    }
}
