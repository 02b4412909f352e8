//! `SQLite` schema bootstrap logic.
//!
//! Uses `CREATE TABLE IF NOT EXISTS`, so it is safe to run on every start.

use sqlx::SqlitePool;

use crate::Result;

/// Apply all table definitions to the connected database.
///
/// # Errors
///
/// Returns `AppError::Db` if any DDL statement fails.
pub async fn bootstrap_schema(pool: &SqlitePool) -> Result<()> {
    let ddl = r"
CREATE TABLE IF NOT EXISTS case_record (
    id              TEXT PRIMARY KEY NOT NULL,
    user_name       TEXT NOT NULL,
    case_document   TEXT NOT NULL,
    session_stage   TEXT NOT NULL,
    created_at      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_case_record_created ON case_record(created_at);
";

    sqlx::raw_sql(ddl).execute(pool).await?;
    Ok(())
}
