//! RPC Method Handlers
//!
//! Validates inputs, resolves the queue through the registry and calls into
//! the core. Everything else (locking, visibility, persistence) lives there.

use crate::error::to_rpc_error;
use crate::types::{
    AckRequest, AckResponse, DequeueRequest, DequeueResponse, EnqueueRequest, EnqueueResponse,
    ListQueuesRequest, ListQueuesResponse, QueueStatsRequest, QueueStatsResponse, WaitRequest,
    WaitResponse,
};
use jsonrpsee::types::ErrorObjectOwned;
use std::sync::Arc;
use std::time::Duration;
use tidemq_core::error::AppError;
use tidemq_core::domain::DomainError;
use tidemq_core::port::{IdProvider, StorageCounts};
use tidemq_core::{Message, QueueName, QueueRegistry, QueueStore};
use tracing::warn;

/// Upper bound for a single `queue.wait.v1` call
pub const MAX_WAIT_TIMEOUT_MS: u64 = 60_000;

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    registry: Arc<QueueRegistry>,
    id_provider: Arc<dyn IdProvider>,
    start_time: std::time::Instant,
}

impl RpcHandler {
    pub fn new(registry: Arc<QueueRegistry>, id_provider: Arc<dyn IdProvider>) -> Self {
        Self {
            registry,
            id_provider,
            start_time: std::time::Instant::now(),
        }
    }

    fn parse_name(queue: &str) -> Result<QueueName, ErrorObjectOwned> {
        QueueName::parse(queue).map_err(|e| to_rpc_error(e.into()))
    }

    /// Validated lookup that opens the queue on first use
    async fn resolve(&self, queue: &str) -> Result<Arc<QueueStore>, ErrorObjectOwned> {
        let name = Self::parse_name(queue)?;
        self.registry
            .get_or_create(name.as_str())
            .await
            .map_err(|e| {
                warn!(queue = %name, error = %e, "Error getting or creating queue");
                to_rpc_error(e)
            })
    }

    /// Validated lookup that never creates storage (read-only and ack paths)
    async fn existing(&self, queue: &str) -> Result<Option<Arc<QueueStore>>, ErrorObjectOwned> {
        let name = Self::parse_name(queue)?;
        Ok(self.registry.get(name.as_str()).await)
    }

    /// queue.enqueue.v1
    pub async fn enqueue(
        &self,
        params: EnqueueRequest,
    ) -> Result<EnqueueResponse, ErrorObjectOwned> {
        let id = params
            .id
            .unwrap_or_else(|| self.id_provider.generate_id());
        let message = Message::new(id, params.payload);
        message.validate().map_err(|e| to_rpc_error(e.into()))?;

        let queue = self.resolve(&params.queue).await?;
        let id = message.id.clone();
        queue.enqueue(message).await.map_err(to_rpc_error)?;

        Ok(EnqueueResponse {
            queue: params.queue,
            id,
        })
    }

    /// queue.dequeue.v1
    pub async fn dequeue(
        &self,
        params: DequeueRequest,
    ) -> Result<DequeueResponse, ErrorObjectOwned> {
        let queue = self.resolve(&params.queue).await?;
        let visibility_timeout = params
            .visibility_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(queue.config().default_visibility_timeout);
        let message = queue
            .dequeue(visibility_timeout)
            .await
            .map_err(to_rpc_error)?;

        Ok(DequeueResponse {
            queue: params.queue,
            message,
        })
    }

    /// queue.wait.v1
    pub async fn wait(&self, params: WaitRequest) -> Result<WaitResponse, ErrorObjectOwned> {
        if params.timeout_ms > MAX_WAIT_TIMEOUT_MS {
            return Err(to_rpc_error(AppError::Validation(format!(
                "timeout_ms {} exceeds maximum of {}",
                params.timeout_ms, MAX_WAIT_TIMEOUT_MS
            ))));
        }

        let queue = self.resolve(&params.queue).await?;
        let overall = Duration::from_millis(params.timeout_ms);
        let message = match params.visibility_timeout_ms {
            Some(ms) => {
                queue
                    .wait_for_message_with(overall, Duration::from_millis(ms))
                    .await
            }
            None => queue.wait_for_message(overall).await,
        }
        .map_err(to_rpc_error)?;

        Ok(WaitResponse {
            queue: params.queue,
            message,
        })
    }

    /// queue.ack.v1
    pub async fn ack(&self, params: AckRequest) -> Result<AckResponse, ErrorObjectOwned> {
        if params.id.is_empty() {
            return Err(to_rpc_error(AppError::Domain(DomainError::EmptyMessageId)));
        }

        let deleted = match self.existing(&params.queue).await? {
            Some(queue) => queue.acknowledge(&params.id).await.map_err(to_rpc_error)?,
            None => false,
        };

        Ok(AckResponse {
            queue: params.queue,
            id: params.id,
            deleted,
        })
    }

    /// queue.stats.v1
    pub async fn queue_stats(
        &self,
        params: QueueStatsRequest,
    ) -> Result<QueueStatsResponse, ErrorObjectOwned> {
        let counts = match self.existing(&params.queue).await? {
            Some(queue) => queue.stats().await.map_err(to_rpc_error)?,
            None => StorageCounts::default(),
        };

        Ok(QueueStatsResponse {
            queue: params.queue,
            pending: counts.pending,
            in_flight: counts.in_flight,
        })
    }

    /// admin.queues.v1
    pub async fn list_queues(
        &self,
        _params: ListQueuesRequest,
    ) -> Result<ListQueuesResponse, ErrorObjectOwned> {
        Ok(ListQueuesResponse {
            queues: self.registry.queue_names().await,
            uptime_seconds: self.start_time.elapsed().as_secs() as i64,
        })
    }
}
