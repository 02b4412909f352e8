//! Saved-work repository for `SQLite` persistence.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::models::record::{SaveReceipt, SaveRecord, StoredRecord};
use crate::{AppError, Result};

use super::db::Database;
use super::RecordStore;

/// Repository for case records.
#[derive(Clone)]
pub struct RecordRepo {
    db: Arc<Database>,
}

/// Internal row struct for `SQLite` deserialization.
#[derive(sqlx::FromRow)]
struct RecordRow {
    id: String,
    user_name: String,
    case_document: String,
    session_stage: String,
    created_at: String,
}

impl RecordRow {
    fn into_record(self) -> Result<StoredRecord> {
        let created_at = chrono::DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| AppError::Db(format!("invalid created_at: {e}")))?
            .with_timezone(&Utc);

        Ok(StoredRecord {
            id: self.id,
            user_identifier: self.user_name,
            document_content: self.case_document,
            stage_label: self.session_stage,
            created_at,
        })
    }
}

impl RecordRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert a record and return it as stored.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the insert fails.
    pub async fn insert(&self, record: &SaveRecord) -> Result<StoredRecord> {
        let stored = StoredRecord {
            id: Uuid::new_v4().to_string(),
            user_identifier: record.user_identifier.clone(),
            document_content: record.document_content.clone(),
            stage_label: record.stage_label.clone(),
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO case_record (id, user_name, case_document, session_stage, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&stored.id)
        .bind(&stored.user_identifier)
        .bind(&stored.document_content)
        .bind(&stored.stage_label)
        .bind(stored.created_at.to_rfc3339())
        .execute(self.db.as_ref())
        .await?;

        Ok(stored)
    }

    /// Most recent records first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn list_recent(&self, limit: u32) -> Result<Vec<StoredRecord>> {
        let rows: Vec<RecordRow> = sqlx::query_as(
            "SELECT id, user_name, case_document, session_stage, created_at
             FROM case_record
             ORDER BY created_at DESC
             LIMIT ?1",
        )
        .bind(i64::from(limit))
        .fetch_all(self.db.as_ref())
        .await?;

        rows.into_iter().map(RecordRow::into_record).collect()
    }

    /// Number of stored records.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM case_record")
            .fetch_one(self.db.as_ref())
            .await?;
        Ok(count.0)
    }
}

impl RecordStore for RecordRepo {
    fn save<'a>(
        &'a self,
        record: &'a SaveRecord,
    ) -> Pin<Box<dyn Future<Output = Result<SaveReceipt>> + Send + 'a>> {
        Box::pin(async move {
            let stored = self
                .insert(record)
                .await
                .map_err(|err| AppError::Persistence(err.to_string()))?;
            Ok(SaveReceipt {
                record_id: Some(stored.id),
            })
        })
    }
}
