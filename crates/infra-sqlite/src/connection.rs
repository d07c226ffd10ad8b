// SQLite Connection Pool Setup

use crate::error::map_sqlx_error;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tidemq_core::error::{AppError, Result};

/// Create a pool from a database URL (e.g. `sqlite::memory:`)
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| AppError::Config(format!("invalid database url {}: {}", database_url, e)))?;
    connect(options).await
}

/// Create a pool for the database file at `path`
pub async fn create_file_pool(path: &Path) -> Result<SqlitePool> {
    connect(SqliteConnectOptions::new().filename(path)).await
}

// A queue is single-writer behind its own lock, so one connection suffices
// (and keeps in-memory databases shared across calls)
async fn connect(options: SqliteConnectOptions) -> Result<SqlitePool> {
    let options = options
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5))
        .create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(map_sqlx_error("open"))
}
