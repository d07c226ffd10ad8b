// Storage Opener Port (Interface)

use crate::error::Result;
use crate::port::QueueStorage;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

/// Opens (creating if missing) the persistent namespace at a path
#[async_trait]
pub trait StorageOpener: Send + Sync {
    async fn open(&self, path: &Path) -> Result<Arc<dyn QueueStorage>>;
}

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use crate::port::queue_storage::mocks::InMemoryQueueStorage;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Hands out one in-memory storage per path and counts open calls
    #[derive(Default)]
    pub struct InMemoryStorageOpener {
        opened: Mutex<HashMap<PathBuf, InMemoryQueueStorage>>,
        open_calls: AtomicUsize,
        failing_paths: Mutex<Vec<PathBuf>>,
        open_delay: Option<Duration>,
    }

    impl InMemoryStorageOpener {
        pub fn new() -> Self {
            Self::default()
        }

        /// Simulate slow storage creation (widens registry race windows)
        pub fn with_open_delay(delay: Duration) -> Self {
            Self {
                open_delay: Some(delay),
                ..Self::default()
            }
        }

        pub fn fail_path(&self, path: impl Into<PathBuf>) {
            self.failing_paths.lock().unwrap().push(path.into());
        }

        pub fn open_calls(&self) -> usize {
            self.open_calls.load(Ordering::SeqCst)
        }

        pub fn storage_at(&self, path: &Path) -> Option<InMemoryQueueStorage> {
            self.opened.lock().unwrap().get(path).cloned()
        }
    }

    #[async_trait]
    impl StorageOpener for InMemoryStorageOpener {
        async fn open(&self, path: &Path) -> Result<Arc<dyn QueueStorage>> {
            self.open_calls.fetch_add(1, Ordering::SeqCst);

            if let Some(delay) = self.open_delay {
                tokio::time::sleep(delay).await;
            }

            if self.failing_paths.lock().unwrap().iter().any(|p| p == path) {
                return Err(AppError::storage(
                    "open",
                    format!("cannot open {}", path.display()),
                ));
            }

            let storage = self
                .opened
                .lock()
                .unwrap()
                .entry(path.to_path_buf())
                .or_default()
                .clone();
            Ok(Arc::new(storage))
        }
    }
}
