//! Record store backed by a remote records endpoint.
//!
//! Posts the record as JSON (`userName`, `caseDocument`, `sessionStage`).
//! A non-success status becomes `AppError::Persistence` carrying the
//! response's `error` field; a failed round trip becomes
//! `AppError::Transport`.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::models::record::{SaveReceipt, SaveRecord};
use crate::{AppError, Result};

use super::RecordStore;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Default, Deserialize)]
struct RecordsResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// HTTP record store.
#[derive(Clone)]
pub struct HttpRecordStore {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpRecordStore {
    /// Build a store posting to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Transport` if the HTTP client cannot be built.
    pub fn new(endpoint: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_owned(),
        })
    }

    /// Target URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post(&self, record: &SaveRecord) -> Result<SaveReceipt> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(record)
            .send()
            .await?;
        let status = response.status();

        // A missing or malformed body is not itself a failure.
        let body: RecordsResponse = response.json().await.unwrap_or_default();
        debug!(%status, "records endpoint answered");

        if status.is_success() {
            Ok(SaveReceipt { record_id: body.id })
        } else {
            Err(AppError::Persistence(
                body.error.unwrap_or_else(|| "Unknown".into()),
            ))
        }
    }
}

impl RecordStore for HttpRecordStore {
    fn save<'a>(
        &'a self,
        record: &'a SaveRecord,
    ) -> Pin<Box<dyn Future<Output = Result<SaveReceipt>> + Send + 'a>> {
        Box::pin(self.post(record))
    }
}
