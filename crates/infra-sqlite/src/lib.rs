// tidemq Infrastructure - SQLite Adapter
// Implements: QueueStorage, QueueTransaction, StorageOpener

mod connection;
mod error;
mod migration;
mod opener;
mod queue_storage;
mod transaction;

pub use connection::{create_file_pool, create_pool};
pub use migration::run_migrations;
pub use opener::{SqliteStorageOpener, DB_FILE_NAME};
pub use queue_storage::SqliteQueueStorage;
pub use transaction::SqliteQueueTransaction;

// Note: sqlx::Error conversion is handled by error::map_sqlx_error
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
