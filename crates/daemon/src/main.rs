//! tidemq - Main Entry Point
//! Durable named queues served over JSON-RPC

mod config;
mod logging;

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

// Import workspace crates
use config::DaemonConfig;
use tidemq_api_rpc::RpcServer;
use tidemq_core::port::id_provider::UuidProvider;
use tidemq_core::port::time_provider::SystemTimeProvider;
use tidemq_core::{QueueRegistry, QueueStoreConfig};
use tidemq_infra_sqlite::SqliteStorageOpener;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration
    let config = DaemonConfig::from_env()?;

    // 2. Initialize logging
    let _log_guard = logging::init_logging(&config.log)?;

    info!("tidemq v{} starting...", VERSION);

    // 3. Prepare data directory (queues are created beneath it on demand)
    info!(data_dir = %config.data_dir.display(), "Preparing data directory...");
    tokio::fs::create_dir_all(&config.data_dir).await?;

    // 4. Setup dependencies (DI wiring)
    let time_provider = Arc::new(SystemTimeProvider);
    let registry = Arc::new(
        QueueRegistry::new(
            config.data_dir.clone(),
            Arc::new(SqliteStorageOpener::new()),
            time_provider,
        )?
        .with_store_config(QueueStoreConfig {
            default_visibility_timeout: config.visibility_timeout,
            ..QueueStoreConfig::default()
        }),
    );

    // 5. Start JSON-RPC server
    let rpc_server = RpcServer::new(config.rpc.clone(), registry, Arc::new(UuidProvider));
    let (addr, rpc_handle) = rpc_server
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {}", e))?;

    info!(addr = %addr, "System ready. Press Ctrl+C to shutdown");

    // 6. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received. Exiting gracefully...");

    // 7. Graceful shutdown
    rpc_handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;
    rpc_handle.stopped().await;

    info!("Shutdown complete.");

    Ok(())
}
