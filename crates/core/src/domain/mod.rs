// Domain Layer - Pure business logic and entities

pub mod error;
pub mod message;
pub mod queue;

// Re-exports
pub use error::DomainError;
pub use message::{Message, MessageId, MessageState, StoredMessage};
pub use queue::{QueueName, MAX_QUEUE_NAME_LEN};
