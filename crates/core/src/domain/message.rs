// Message Domain Model

use serde::{Deserialize, Serialize};

/// Message ID (caller-supplied, unique within its queue)
pub type MessageId = String;

/// Message as seen by producers and consumers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub payload: String,
}

impl Message {
    pub fn new(id: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            payload: payload.into(),
        }
    }

    /// Reject messages that cannot be used as a storage key
    pub fn validate(&self) -> crate::domain::error::Result<()> {
        if self.id.is_empty() {
            return Err(crate::domain::DomainError::EmptyMessageId);
        }
        Ok(())
    }
}

/// Delivery state of a stored message at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageState {
    /// Eligible for delivery (`visible_at <= now`)
    Pending,
    /// Delivered and hidden until its visibility deadline
    InFlight,
}

impl std::fmt::Display for MessageState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageState::Pending => write!(f, "PENDING"),
            MessageState::InFlight => write!(f, "IN_FLIGHT"),
        }
    }
}

/// Persisted record: the message plus its internal visibility instant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: MessageId,
    pub payload: String,
    pub visible_at: i64, // epoch ms
}

impl StoredMessage {
    /// Freshly enqueued record, visible immediately
    pub fn pending(message: Message, now_millis: i64) -> Self {
        Self {
            id: message.id,
            payload: message.payload,
            visible_at: now_millis,
        }
    }

    pub fn is_visible(&self, now_millis: i64) -> bool {
        self.visible_at <= now_millis
    }

    pub fn state(&self, now_millis: i64) -> MessageState {
        if self.is_visible(now_millis) {
            MessageState::Pending
        } else {
            MessageState::InFlight
        }
    }

    /// Hide the record from delivery until `deadline_millis`
    pub fn hide_until(&mut self, deadline_millis: i64) {
        self.visible_at = deadline_millis;
    }

    pub fn to_message(&self) -> Message {
        Message::new(self.id.clone(), self.payload.clone())
    }
}

impl From<StoredMessage> for Message {
    fn from(stored: StoredMessage) -> Self {
        Message {
            id: stored.id,
            payload: stored.payload,
        }
    }
}
