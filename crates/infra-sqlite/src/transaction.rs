// SQLite Transaction Implementation

use crate::error::map_sqlx_error;
use crate::queue_storage::MessageRow;
use async_trait::async_trait;
use sqlx::{Sqlite, Transaction as SqlxTransaction};
use tidemq_core::domain::StoredMessage;
use tidemq_core::error::Result;
use tidemq_core::port::{QueueTransaction, Transaction};

pub struct SqliteQueueTransaction {
    tx: SqlxTransaction<'static, Sqlite>,
}

impl SqliteQueueTransaction {
    pub fn new(tx: SqlxTransaction<'static, Sqlite>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl Transaction for SqliteQueueTransaction {
    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await.map_err(map_sqlx_error("commit"))
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx.rollback().await.map_err(map_sqlx_error("rollback"))
    }
}

#[async_trait]
impl QueueTransaction for SqliteQueueTransaction {
    async fn first_visible(&mut self, now_millis: i64) -> Result<Option<StoredMessage>> {
        // No ORDER BY: the engine's native key order stands in for "unordered"
        let row = sqlx::query_as::<_, MessageRow>(
            "SELECT id, payload, visible_at FROM messages WHERE visible_at <= ? LIMIT 1",
        )
        .bind(now_millis)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error("scan"))?;

        Ok(row.map(MessageRow::into_stored))
    }

    async fn put(&mut self, record: &StoredMessage) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO messages (id, payload, visible_at)
            VALUES (?, ?, ?)
            ON CONFLICT(id) DO UPDATE
            SET payload = excluded.payload, visible_at = excluded.visible_at
            "#,
        )
        .bind(&record.id)
        .bind(&record.payload)
        .bind(record.visible_at)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error("write"))?;

        Ok(())
    }

    async fn delete(&mut self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM messages WHERE id = ?")
            .bind(id)
            .execute(&mut *self.tx)
            .await
            .map_err(map_sqlx_error("delete"))?;

        Ok(result.rows_affected() > 0)
    }
}
