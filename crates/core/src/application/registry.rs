// QueueRegistry - directory of QueueStores keyed by name

use crate::application::queue_store::{QueueStore, QueueStoreConfig};
use crate::error::{AppError, Result};
use crate::port::{StorageOpener, TimeProvider};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info};

/// Lazily creates at most one QueueStore per name, each backed by storage
/// at `<base_path>/<name>`.
///
/// Queue names are trusted here; the request layer validates them with
/// `QueueName::parse` before they reach the registry.
pub struct QueueRegistry {
    base_path: PathBuf,
    queues: RwLock<HashMap<String, Arc<QueueStore>>>,
    opener: Arc<dyn StorageOpener>,
    time_provider: Arc<dyn TimeProvider>,
    store_config: QueueStoreConfig,
}

impl QueueRegistry {
    pub fn new(
        base_path: impl Into<PathBuf>,
        opener: Arc<dyn StorageOpener>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Result<Self> {
        let base_path = base_path.into();
        if base_path.as_os_str().is_empty() {
            return Err(AppError::Config("base path cannot be empty".to_string()));
        }

        Ok(Self {
            base_path,
            queues: RwLock::new(HashMap::new()),
            opener,
            time_provider,
            store_config: QueueStoreConfig::default(),
        })
    }

    /// Config applied to every queue created from now on
    pub fn with_store_config(mut self, config: QueueStoreConfig) -> Self {
        self.store_config = config;
        self
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Storage location of queue `name`
    pub fn queue_path(&self, name: &str) -> PathBuf {
        self.base_path.join(name)
    }

    /// Look up an existing queue without creating it
    pub async fn get(&self, name: &str) -> Option<Arc<QueueStore>> {
        self.queues.read().await.get(name).cloned()
    }

    /// Return the queue for `name`, opening its storage on first use.
    ///
    /// Two-phase lookup: a shared-lock probe, then an exclusive-lock
    /// re-check before creating, so racing callers converge on one instance.
    pub async fn get_or_create(&self, name: &str) -> Result<Arc<QueueStore>> {
        if let Some(queue) = self.get(name).await {
            return Ok(queue);
        }

        let mut queues = self.queues.write().await;

        // Another caller may have created it between the two locks
        if let Some(queue) = queues.get(name) {
            return Ok(Arc::clone(queue));
        }

        let path = self.queue_path(name);
        let storage = self.opener.open(&path).await.map_err(|e| {
            error!(queue = %name, path = %path.display(), error = %e, "Failed to create queue");
            AppError::Storage {
                op: "create_queue",
                message: format!("queue '{}': {}", name, e),
            }
        })?;

        let queue = Arc::new(QueueStore::new(
            name,
            storage,
            Arc::clone(&self.time_provider),
            self.store_config.clone(),
        ));
        queues.insert(name.to_string(), Arc::clone(&queue));

        info!(queue = %name, path = %path.display(), "Queue created");
        Ok(queue)
    }

    /// Names of all queues opened so far, sorted
    pub async fn queue_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.queues.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    pub async fn len(&self) -> usize {
        self.queues.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.queues.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Message;
    use crate::port::storage_opener::mocks::InMemoryStorageOpener;
    use crate::port::time_provider::SystemTimeProvider;
    use std::time::Duration;

    fn registry_with(opener: Arc<InMemoryStorageOpener>) -> QueueRegistry {
        QueueRegistry::new("/data/queues", opener, Arc::new(SystemTimeProvider)).unwrap()
    }

    #[test]
    fn test_empty_base_path_is_config_error() {
        let result = QueueRegistry::new(
            "",
            Arc::new(InMemoryStorageOpener::new()),
            Arc::new(SystemTimeProvider),
        );
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let opener = Arc::new(InMemoryStorageOpener::new());
        let registry = registry_with(opener.clone());

        let a = registry.get_or_create("orders").await.unwrap();
        let b = registry.get_or_create("orders").await.unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(opener.open_calls(), 1);
        assert_eq!(a.name(), "orders");
    }

    #[tokio::test]
    async fn test_concurrent_creation_converges_on_one_instance() {
        let opener = Arc::new(InMemoryStorageOpener::with_open_delay(
            Duration::from_millis(20),
        ));
        let registry = Arc::new(registry_with(opener.clone()));

        let mut handles = vec![];
        for _ in 0..32 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move {
                registry.get_or_create("orders").await.unwrap()
            }));
        }

        let mut stores = vec![];
        for handle in handles {
            stores.push(handle.await.unwrap());
        }

        assert!(stores.iter().all(|s| Arc::ptr_eq(s, &stores[0])));
        assert_eq!(opener.open_calls(), 1, "storage must be opened exactly once");
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_storage_lives_under_base_path() {
        let opener = Arc::new(InMemoryStorageOpener::new());
        let registry = registry_with(opener.clone());

        registry.get_or_create("billing").await.unwrap();

        assert!(opener
            .storage_at(Path::new("/data/queues/billing"))
            .is_some());
    }

    #[tokio::test]
    async fn test_creation_failure_leaves_no_entry() {
        let opener = Arc::new(InMemoryStorageOpener::new());
        opener.fail_path("/data/queues/broken");
        let registry = registry_with(opener.clone());

        let err = registry.get_or_create("broken").await.unwrap_err();
        assert!(matches!(err, AppError::Storage { op: "create_queue", .. }));
        assert!(err.to_string().contains("broken"));

        assert!(registry.get("broken").await.is_none());
        assert!(registry.is_empty().await);

        // A later attempt retries the open instead of returning a stale entry
        let _ = registry.get_or_create("broken").await;
        assert_eq!(opener.open_calls(), 2);
    }

    #[tokio::test]
    async fn test_queues_are_isolated() {
        let registry = registry_with(Arc::new(InMemoryStorageOpener::new()));
        let a = registry.get_or_create("a").await.unwrap();
        let b = registry.get_or_create("b").await.unwrap();

        a.enqueue(Message::new("only-in-a", "payload")).await.unwrap();

        assert!(b.dequeue(Duration::ZERO).await.unwrap().is_none());
        let msg = a.dequeue(Duration::ZERO).await.unwrap().unwrap();
        assert_eq!(msg.id, "only-in-a");
        assert_eq!(registry.queue_names().await, vec!["a", "b"]);
    }
}
