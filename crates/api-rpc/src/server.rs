//! JSON-RPC Server
//!
//! Serves JSON-RPC 2.0 over HTTP/WebSocket on a TCP address.

use crate::auth::BearerAuthLayer;
use crate::handler::RpcHandler;
use crate::types::{
    AckRequest, DequeueRequest, EnqueueRequest, ListQueuesRequest, QueueStatsRequest,
    WaitRequest,
};
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::RpcModule;
use std::net::SocketAddr;
use std::sync::Arc;
use tidemq_core::port::IdProvider;
use tidemq_core::QueueRegistry;
use tracing::info;

const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 8080;

/// RPC Server Configuration
#[derive(Debug, Clone)]
pub struct RpcServerConfig {
    pub host: String,
    pub port: u16,
    /// Bearer token required on every request; `None` leaves the server open
    pub auth_token: Option<String>,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
            auth_token: None,
        }
    }
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<RpcHandler>,
}

impl RpcServer {
    pub fn new(
        config: RpcServerConfig,
        registry: Arc<QueueRegistry>,
        id_provider: Arc<dyn IdProvider>,
    ) -> Self {
        Self {
            config,
            handler: Arc::new(RpcHandler::new(registry, id_provider)),
        }
    }

    /// Start the JSON-RPC server, returning the bound address and its handle
    pub async fn start(self) -> Result<(SocketAddr, ServerHandle), String> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        let http_middleware = tower::ServiceBuilder::new()
            .layer(BearerAuthLayer::new(self.config.auth_token.clone()));

        let server = Server::builder()
            .set_http_middleware(http_middleware)
            .build(&addr)
            .await
            .map_err(|e| format!("Failed to build server on {}: {}", addr, e))?;
        let local_addr = server
            .local_addr()
            .map_err(|e| format!("Failed to read bound address: {}", e))?;

        let mut module = RpcModule::new(());

        // Register methods
        let handler = self.handler.clone();
        module
            .register_async_method("queue.enqueue.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: EnqueueRequest = params.parse()?;
                    handler.enqueue(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("queue.dequeue.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: DequeueRequest = params.parse()?;
                    handler.dequeue(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("queue.wait.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: WaitRequest = params.parse()?;
                    handler.wait(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("queue.ack.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: AckRequest = params.parse()?;
                    handler.ack(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("queue.stats.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: QueueStatsRequest = params.parse()?;
                    handler.queue_stats(req).await
                }
            })
            .map_err(|e| e.to_string())?;

        let handler = self.handler.clone();
        module
            .register_async_method("admin.queues.v1", move |_, _, _| {
                let handler = handler.clone();
                // Takes no parameters; callers may omit them entirely
                async move { handler.list_queues(ListQueuesRequest {}).await }
            })
            .map_err(|e| e.to_string())?;

        info!(
            addr = %local_addr,
            auth = self.config.auth_token.is_some(),
            "JSON-RPC server listening"
        );

        let handle = server.start(module);
        Ok((local_addr, handle))
    }
}
