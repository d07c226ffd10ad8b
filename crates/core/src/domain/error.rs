// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("Queue name cannot be empty")]
    EmptyQueueName,

    #[error("Queue name too long: {len} characters (max {max})")]
    QueueNameTooLong { len: usize, max: usize },

    #[error("Queue name must be alphanumeric, '_' or '-': {0}")]
    InvalidQueueName(String),

    #[error("Message id cannot be empty")]
    EmptyMessageId,
}

pub type Result<T> = std::result::Result<T, DomainError>;
