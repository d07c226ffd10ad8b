// Queue Storage Port (Interface)
//
// One QueueStorage is one persistent key-value namespace owned by exactly
// one QueueStore. Keys are message ids, values are StoredMessage records.

use crate::domain::StoredMessage;
use crate::error::Result;
use async_trait::async_trait;

/// Record counts split by visibility at a given instant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageCounts {
    pub pending: i64,
    pub in_flight: i64,
}

/// Persistent namespace backing a single queue
#[async_trait]
pub trait QueueStorage: Send + Sync {
    /// Begin a new atomic transaction
    async fn begin_transaction(&self) -> Result<Box<dyn QueueTransaction>>;

    /// Count records by visibility at `now_millis`
    async fn count_by_visibility(&self, now_millis: i64) -> Result<StorageCounts>;
}

/// Transaction trait for atomic multi-step operations
#[async_trait]
pub trait Transaction: Send {
    /// Commit the transaction
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Rollback the transaction
    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// Storage operations within a transaction
#[async_trait]
pub trait QueueTransaction: Transaction {
    /// First record with `visible_at <= now_millis`, in the engine's native
    /// iteration order (no FIFO guarantee)
    async fn first_visible(&mut self, now_millis: i64) -> Result<Option<StoredMessage>>;

    /// Insert or replace the record keyed by `record.id`
    async fn put(&mut self, record: &StoredMessage) -> Result<()>;

    /// Delete the record keyed by `id`; returns whether it existed
    async fn delete(&mut self, id: &str) -> Result<bool>;
}

/// In-memory implementations for tests and embedding
pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    type Records = BTreeMap<String, StoredMessage>;

    /// Map-backed storage; transactions stage a copy and swap it in on commit
    #[derive(Default, Clone)]
    pub struct InMemoryQueueStorage {
        records: Arc<Mutex<Records>>,
        fail_ops: Arc<Mutex<Vec<&'static str>>>,
    }

    impl InMemoryQueueStorage {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make every subsequent call of `op` fail with a storage error
        /// (`op` is one of "begin", "first_visible", "put", "delete", "commit")
        pub fn fail_on(&self, op: &'static str) {
            self.fail_ops.lock().unwrap().push(op);
        }

        pub fn clear_failures(&self) {
            self.fail_ops.lock().unwrap().clear();
        }

        /// Snapshot of the committed records
        pub fn records(&self) -> Vec<StoredMessage> {
            self.records.lock().unwrap().values().cloned().collect()
        }

        fn check(fail_ops: &Mutex<Vec<&'static str>>, op: &'static str) -> Result<()> {
            if fail_ops.lock().unwrap().contains(&op) {
                return Err(AppError::storage(op, "injected failure"));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl QueueStorage for InMemoryQueueStorage {
        async fn begin_transaction(&self) -> Result<Box<dyn QueueTransaction>> {
            Self::check(&self.fail_ops, "begin")?;
            let staged = self.records.lock().unwrap().clone();
            Ok(Box::new(InMemoryTransaction {
                committed: Arc::clone(&self.records),
                fail_ops: Arc::clone(&self.fail_ops),
                staged,
            }))
        }

        async fn count_by_visibility(&self, now_millis: i64) -> Result<StorageCounts> {
            let records = self.records.lock().unwrap();
            let pending = records.values().filter(|r| r.is_visible(now_millis)).count() as i64;
            Ok(StorageCounts {
                pending,
                in_flight: records.len() as i64 - pending,
            })
        }
    }

    pub struct InMemoryTransaction {
        committed: Arc<Mutex<Records>>,
        fail_ops: Arc<Mutex<Vec<&'static str>>>,
        staged: Records,
    }

    #[async_trait]
    impl Transaction for InMemoryTransaction {
        async fn commit(self: Box<Self>) -> Result<()> {
            let InMemoryTransaction {
                committed,
                fail_ops,
                staged,
            } = *self;
            InMemoryQueueStorage::check(&fail_ops, "commit")?;
            *committed.lock().unwrap() = staged;
            Ok(())
        }

        async fn rollback(self: Box<Self>) -> Result<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl QueueTransaction for InMemoryTransaction {
        async fn first_visible(&mut self, now_millis: i64) -> Result<Option<StoredMessage>> {
            InMemoryQueueStorage::check(&self.fail_ops, "first_visible")?;
            Ok(self
                .staged
                .values()
                .find(|r| r.is_visible(now_millis))
                .cloned())
        }

        async fn put(&mut self, record: &StoredMessage) -> Result<()> {
            InMemoryQueueStorage::check(&self.fail_ops, "put")?;
            self.staged.insert(record.id.clone(), record.clone());
            Ok(())
        }

        async fn delete(&mut self, id: &str) -> Result<bool> {
            InMemoryQueueStorage::check(&self.fail_ops, "delete")?;
            Ok(self.staged.remove(id).is_some())
        }
    }
}
