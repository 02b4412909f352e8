//! Persistence collaborators for saved work.
//!
//! The orchestrator only knows the [`RecordStore`] trait. Two stores ship
//! with the crate: [`record_repo::RecordRepo`] writes to a local `SQLite`
//! file and [`http::HttpRecordStore`] posts to a records endpoint.

pub mod db;
pub mod http;
pub mod record_repo;
pub mod schema;

use std::future::Future;
use std::pin::Pin;

use crate::models::record::{SaveReceipt, SaveRecord};
use crate::Result;

/// Re-export the database pool type for convenience.
pub use sqlx::SqlitePool;

/// Destination for saved work.
pub trait RecordStore: Send + Sync {
    /// Persist one record.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`](crate::AppError::Persistence) when the
    /// store answers with a failure and
    /// [`AppError::Transport`](crate::AppError::Transport) when it cannot be
    /// reached.
    fn save<'a>(
        &'a self,
        record: &'a SaveRecord,
    ) -> Pin<Box<dyn Future<Output = Result<SaveReceipt>> + Send + 'a>>;
}
