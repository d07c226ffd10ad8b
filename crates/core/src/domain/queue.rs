// Queue Domain Model

use crate::domain::error::{DomainError, Result};

/// Maximum queue name length (names become directory names)
pub const MAX_QUEUE_NAME_LEN: usize = 64;

/// Validated queue name, safe to use as a path component
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueueName(String);

impl QueueName {
    pub fn parse(name: impl Into<String>) -> Result<Self> {
        let name = name.into();

        if name.is_empty() {
            return Err(DomainError::EmptyQueueName);
        }

        let len = name.chars().count();
        if len > MAX_QUEUE_NAME_LEN {
            return Err(DomainError::QueueNameTooLong {
                len,
                max: MAX_QUEUE_NAME_LEN,
            });
        }

        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(DomainError::InvalidQueueName(name));
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for QueueName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for QueueName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
