// SQLite QueueStorage Implementation

use crate::error::map_sqlx_error;
use crate::SqliteQueueTransaction;
use async_trait::async_trait;
use sqlx::SqlitePool;
use tidemq_core::domain::StoredMessage;
use tidemq_core::error::Result;
use tidemq_core::port::{QueueStorage, QueueTransaction, StorageCounts};

/// Storage for one queue: a single SQLite database
pub struct SqliteQueueStorage {
    pool: SqlitePool,
}

impl SqliteQueueStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QueueStorage for SqliteQueueStorage {
    async fn begin_transaction(&self) -> Result<Box<dyn QueueTransaction>> {
        let tx = self.pool.begin().await.map_err(map_sqlx_error("begin"))?;
        Ok(Box::new(SqliteQueueTransaction::new(tx)))
    }

    async fn count_by_visibility(&self, now_millis: i64) -> Result<StorageCounts> {
        let (pending, total): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(CASE WHEN visible_at <= ? THEN 1 ELSE 0 END), 0),
                   COUNT(*)
            FROM messages
            "#,
        )
        .bind(now_millis)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error("count"))?;

        Ok(StorageCounts {
            pending,
            in_flight: total - pending,
        })
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct MessageRow {
    id: String,
    payload: String,
    visible_at: i64,
}

impl MessageRow {
    pub(crate) fn into_stored(self) -> StoredMessage {
        StoredMessage {
            id: self.id,
            payload: self.payload,
            visible_at: self.visible_at,
        }
    }
}
