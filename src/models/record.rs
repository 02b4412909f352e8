//! Saved-work record handed to the persistence collaborator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Payload of a `Save` action.
///
/// Serialises with the field names the records endpoint expects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SaveRecord {
    /// Learner identifier.
    #[serde(rename = "userName")]
    pub user_identifier: String,
    /// Workspace text at the time of saving.
    #[serde(rename = "caseDocument")]
    pub document_content: String,
    /// Stage label, e.g. `Stage1`.
    #[serde(rename = "sessionStage")]
    pub stage_label: String,
}

/// Confirmation returned by a record store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReceipt {
    /// Identifier assigned by the store, when it reports one.
    pub record_id: Option<String>,
}

/// A record as read back from the local store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct StoredRecord {
    /// Unique record identifier.
    pub id: String,
    /// Learner identifier.
    pub user_identifier: String,
    /// Saved workspace text.
    pub document_content: String,
    /// Stage label at save time.
    pub stage_label: String,
    /// When the record was written.
    pub created_at: DateTime<Utc>,
}
