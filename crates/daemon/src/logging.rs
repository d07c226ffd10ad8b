//! Logging setup: stdout (pretty or JSON) plus an optional rolling file

use crate::config::{LogConfig, LogFormat};
use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "tidemq=info,tidemq_core=info,tidemq_infra_sqlite=info,tidemq_api_rpc=info";
const LOG_FILE_PREFIX: &str = "tidemq.log";

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop; keep it alive for
/// the lifetime of the process.
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))?;

    let (file_layer, guard) = match &config.dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer);

    match config.format {
        // Production: JSON structured logging
        LogFormat::Json => registry.with(fmt::layer().json()).try_init()?,
        // Development: Pretty formatting with colors
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init()?,
    }

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses_and_targets_workspace_crates() {
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
        for directive in DEFAULT_FILTER.split(',') {
            assert!(directive.starts_with("tidemq"), "{directive}");
            assert!(!directive.starts_with("tidemq_daemon"), "{directive}");
        }
    }
}
