//! RPC Request/Response Types

use serde::{Deserialize, Serialize};
use tidemq_core::Message;

/// queue.enqueue.v1 - Store a message (id generated when omitted)
#[derive(Debug, Deserialize)]
pub struct EnqueueRequest {
    pub queue: String,
    #[serde(default)]
    pub id: Option<String>,
    pub payload: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnqueueResponse {
    pub queue: String,
    pub id: String,
}

/// queue.dequeue.v1 - Single delivery attempt; 0 ms consumes the message,
/// omitted uses the queue's default visibility timeout
#[derive(Debug, Deserialize)]
pub struct DequeueRequest {
    pub queue: String,
    #[serde(default)]
    pub visibility_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DequeueResponse {
    pub queue: String,
    pub message: Option<Message>,
}

/// queue.wait.v1 - Block until a message arrives or `timeout_ms` elapses
#[derive(Debug, Deserialize)]
pub struct WaitRequest {
    pub queue: String,
    pub timeout_ms: u64,
    #[serde(default)]
    pub visibility_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WaitResponse {
    pub queue: String,
    pub message: Message,
}

/// queue.ack.v1 - Delete a delivered message
#[derive(Debug, Deserialize)]
pub struct AckRequest {
    pub queue: String,
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AckResponse {
    pub queue: String,
    pub id: String,
    pub deleted: bool,
}

/// queue.stats.v1
#[derive(Debug, Deserialize)]
pub struct QueueStatsRequest {
    pub queue: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueueStatsResponse {
    pub queue: String,
    pub pending: i64,
    pub in_flight: i64,
}

/// admin.queues.v1
#[derive(Debug, Deserialize)]
pub struct ListQueuesRequest {
    // No parameters needed
}

#[derive(Debug, Clone, Serialize)]
pub struct ListQueuesResponse {
    pub queues: Vec<String>,
    pub uptime_seconds: i64,
}
