//! Shared setup: a registry over real SQLite storage in a temp directory

use std::sync::Arc;
use tempfile::TempDir;
use tidemq_core::port::time_provider::SystemTimeProvider;
use tidemq_core::QueueRegistry;
use tidemq_infra_sqlite::SqliteStorageOpener;

pub struct TestEnv {
    pub dir: TempDir,
    pub registry: Arc<QueueRegistry>,
}

pub fn setup() -> TestEnv {
    let dir = tempfile::tempdir().unwrap();
    let registry = open_registry(&dir);
    TestEnv { dir, registry }
}

/// A fresh registry over an existing data directory (simulates a restart)
pub fn open_registry(dir: &TempDir) -> Arc<QueueRegistry> {
    Arc::new(
        QueueRegistry::new(
            dir.path(),
            Arc::new(SqliteStorageOpener::new()),
            Arc::new(SystemTimeProvider),
        )
        .unwrap(),
    )
}
