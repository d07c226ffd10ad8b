// QueueStore - a single named, persistent queue
//
// Delivery policy:
// - dequeue with a nonzero visibility timeout hides the message until
//   `now + timeout`; it stays stored until acknowledged and is redelivered
//   once the deadline passes (at-least-once)
// - dequeue with a zero timeout deletes the message on read (at-most-once)

use crate::application::constants::{DEFAULT_VISIBILITY_TIMEOUT, WAIT_POLL_INTERVAL};
use crate::domain::{Message, StoredMessage};
use crate::error::{AppError, Result};
use crate::port::{QueueStorage, QueueTransaction, StorageCounts, TimeProvider};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;
use tracing::{debug, warn};

/// Per-queue tuning
#[derive(Debug, Clone)]
pub struct QueueStoreConfig {
    /// Visibility timeout used by `wait_for_message`
    pub default_visibility_timeout: Duration,
    /// Fallback re-poll interval while waiting (picks up expired deadlines)
    pub poll_interval: Duration,
}

impl Default for QueueStoreConfig {
    fn default() -> Self {
        Self {
            default_visibility_timeout: DEFAULT_VISIBILITY_TIMEOUT,
            poll_interval: WAIT_POLL_INTERVAL,
        }
    }
}

pub struct QueueStore {
    name: String,
    storage: Arc<dyn QueueStorage>,
    // Serializes every storage transaction on this queue
    lock: Mutex<()>,
    // Raised after each committed enqueue
    arrivals: Notify,
    time_provider: Arc<dyn TimeProvider>,
    config: QueueStoreConfig,
}

impl std::fmt::Debug for QueueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueStore")
            .field("name", &self.name)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl QueueStore {
    pub fn new(
        name: impl Into<String>,
        storage: Arc<dyn QueueStorage>,
        time_provider: Arc<dyn TimeProvider>,
        config: QueueStoreConfig,
    ) -> Self {
        Self {
            name: name.into(),
            storage,
            lock: Mutex::new(()),
            arrivals: Notify::new(),
            time_provider,
            config,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &QueueStoreConfig {
        &self.config
    }

    /// Persist `message`, visible immediately. Replaces any record with the same id.
    pub async fn enqueue(&self, message: Message) -> Result<()> {
        let record = {
            let _guard = self.lock.lock().await;
            let record = StoredMessage::pending(message, self.time_provider.now_millis());

            let mut tx = self.storage.begin_transaction().await?;
            if let Err(e) = tx.put(&record).await {
                rollback_quietly(&self.name, tx).await;
                warn!(queue = %self.name, error = %e, "Enqueue operation failed");
                return Err(e);
            }
            tx.commit().await?;
            record
        };

        debug!(queue = %self.name, message_id = %record.id, "Message enqueued");
        self.arrivals.notify_waiters();
        Ok(())
    }

    /// Deliver the first visible message, or `None` when nothing is eligible.
    ///
    /// Scan order is the storage engine's native order, not arrival order.
    pub async fn dequeue(&self, visibility_timeout: Duration) -> Result<Option<Message>> {
        let _guard = self.lock.lock().await;
        let now = self.time_provider.now_millis();

        let mut tx = self.storage.begin_transaction().await?;
        match claim_next(tx.as_mut(), now, visibility_timeout).await {
            Ok(claimed) => {
                tx.commit().await?;
                if let Some(message) = &claimed {
                    debug!(
                        queue = %self.name,
                        message_id = %message.id,
                        visibility_timeout_ms = visibility_timeout.as_millis() as u64,
                        "Message delivered"
                    );
                }
                Ok(claimed)
            }
            Err(e) => {
                rollback_quietly(&self.name, tx).await;
                warn!(queue = %self.name, error = %e, "Dequeue operation failed");
                Err(e)
            }
        }
    }

    /// Delete a delivered message so it is never redelivered.
    ///
    /// Returns `false` when no record with `id` exists (already acknowledged,
    /// consumed with a zero timeout, or never enqueued).
    pub async fn acknowledge(&self, id: &str) -> Result<bool> {
        let _guard = self.lock.lock().await;

        let mut tx = self.storage.begin_transaction().await?;
        let deleted = match tx.delete(id).await {
            Ok(deleted) => deleted,
            Err(e) => {
                rollback_quietly(&self.name, tx).await;
                return Err(e);
            }
        };
        tx.commit().await?;

        debug!(queue = %self.name, message_id = %id, deleted, "Message acknowledged");
        Ok(deleted)
    }

    /// Block until a message is delivered or `overall_timeout` elapses,
    /// using the configured default visibility timeout.
    pub async fn wait_for_message(&self, overall_timeout: Duration) -> Result<Message> {
        self.wait_for_message_with(overall_timeout, self.config.default_visibility_timeout)
            .await
    }

    /// Like `wait_for_message` with an explicit visibility timeout.
    ///
    /// Wakes on every enqueue and re-polls every `poll_interval` so that
    /// expired visibility deadlines are noticed. The queue lock is held only
    /// during each dequeue attempt. Storage errors abort the wait.
    pub async fn wait_for_message_with(
        &self,
        overall_timeout: Duration,
        visibility_timeout: Duration,
    ) -> Result<Message> {
        // A timeout too large to represent means no deadline
        let deadline = Instant::now().checked_add(overall_timeout);

        loop {
            // Register interest before probing so an enqueue that lands
            // between the probe and the sleep is not missed
            let arrival = self.arrivals.notified();
            tokio::pin!(arrival);
            arrival.as_mut().enable();

            if let Some(message) = self.dequeue(visibility_timeout).await? {
                return Ok(message);
            }

            let nap = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        debug!(queue = %self.name, timeout_ms = overall_timeout.as_millis() as u64, "Wait timed out");
                        return Err(AppError::Timeout(overall_timeout));
                    }
                    self.config.poll_interval.min(deadline - now)
                }
                None => self.config.poll_interval,
            };
            tokio::select! {
                _ = &mut arrival => {}
                _ = tokio::time::sleep(nap) => {}
            }
        }
    }

    /// Pending / in-flight record counts at the current instant
    pub async fn stats(&self) -> Result<StorageCounts> {
        let _guard = self.lock.lock().await;
        self.storage
            .count_by_visibility(self.time_provider.now_millis())
            .await
    }
}

async fn claim_next(
    tx: &mut dyn QueueTransaction,
    now_millis: i64,
    visibility_timeout: Duration,
) -> Result<Option<Message>> {
    let Some(mut record) = tx.first_visible(now_millis).await? else {
        return Ok(None);
    };

    if visibility_timeout.is_zero() {
        tx.delete(&record.id).await?;
    } else {
        record.hide_until(now_millis.saturating_add(duration_to_millis(visibility_timeout)));
        tx.put(&record).await?;
    }

    Ok(Some(record.into()))
}

// Rounds up so a sub-millisecond timeout still hides the message
fn duration_to_millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_micros().div_ceil(1000)).unwrap_or(i64::MAX)
}

async fn rollback_quietly(queue: &str, tx: Box<dyn QueueTransaction>) {
    if let Err(e) = tx.rollback().await {
        warn!(queue = %queue, error = %e, "Rollback failed");
    }
}
