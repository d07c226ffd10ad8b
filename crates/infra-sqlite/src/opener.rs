// SQLite StorageOpener: one database file per queue directory

use crate::{create_file_pool, run_migrations, SqliteQueueStorage};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tidemq_core::error::{AppError, Result};
use tidemq_core::port::{QueueStorage, StorageOpener};
use tracing::debug;

/// Database file name inside each queue directory
pub const DB_FILE_NAME: &str = "queue.db";

#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteStorageOpener;

impl SqliteStorageOpener {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl StorageOpener for SqliteStorageOpener {
    async fn open(&self, path: &Path) -> Result<Arc<dyn QueueStorage>> {
        tokio::fs::create_dir_all(path)
            .await
            .map_err(|e| AppError::storage("open", format!("{}: {}", path.display(), e)))?;

        let db_path = path.join(DB_FILE_NAME);
        debug!(path = %db_path.display(), "Opening queue database");

        let pool = create_file_pool(&db_path).await?;
        run_migrations(&pool).await?;

        Ok(Arc::new(SqliteQueueStorage::new(pool)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidemq_core::domain::StoredMessage;

    #[tokio::test]
    async fn test_open_creates_directory_and_database() {
        let dir = tempfile::tempdir().unwrap();
        let queue_dir = dir.path().join("orders");

        SqliteStorageOpener::new().open(&queue_dir).await.unwrap();

        assert!(queue_dir.is_dir());
        assert!(queue_dir.join(DB_FILE_NAME).is_file());
    }

    #[tokio::test]
    async fn test_reopen_sees_committed_records() {
        let dir = tempfile::tempdir().unwrap();
        let queue_dir = dir.path().join("orders");

        {
            let storage = SqliteStorageOpener::new().open(&queue_dir).await.unwrap();
            let mut tx = storage.begin_transaction().await.unwrap();
            tx.put(&StoredMessage {
                id: "m1".to_string(),
                payload: "hello".to_string(),
                visible_at: 0,
            })
            .await
            .unwrap();
            tx.commit().await.unwrap();
        }

        let storage = SqliteStorageOpener::new().open(&queue_dir).await.unwrap();
        let counts = storage.count_by_visibility(1).await.unwrap();
        assert_eq!(counts.pending, 1);
    }

    #[tokio::test]
    async fn test_open_under_a_file_fails_with_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();

        let result = SqliteStorageOpener::new().open(&blocker.join("q")).await;
        assert!(matches!(result, Err(AppError::Storage { op: "open", .. })));
    }
}
