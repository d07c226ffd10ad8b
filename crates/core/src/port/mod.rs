// Port Layer - Interfaces for external dependencies

pub mod id_provider;
pub mod queue_storage;
pub mod storage_opener;
pub mod time_provider;

// Re-exports
pub use id_provider::IdProvider;
pub use queue_storage::{QueueStorage, QueueTransaction, StorageCounts, Transaction};
pub use storage_opener::StorageOpener;
pub use time_provider::TimeProvider;
