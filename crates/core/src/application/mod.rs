// Application Layer - Queue engine and registry

pub mod constants;
pub mod queue_store;
pub mod registry;

// Re-exports
pub use queue_store::{QueueStore, QueueStoreConfig};
pub use registry::QueueRegistry;
