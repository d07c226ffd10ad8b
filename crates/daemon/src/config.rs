//! Daemon configuration, read from `TIDEMQ_*` environment variables

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tidemq_api_rpc::RpcServerConfig;
use tidemq_core::error::{AppError, Result};

const DEFAULT_DATA_DIR: &str = "~/.tidemq/data";
const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 8080;
const DEFAULT_VISIBILITY_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
    /// Daily-rolling log files are written here when set
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub data_dir: PathBuf,
    pub rpc: RpcServerConfig,
    pub visibility_timeout: Duration,
    pub log: LogConfig,
}

impl DaemonConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let data_dir = expand_path(
            &lookup("TIDEMQ_DATA_DIR").unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()),
        );

        let rpc = RpcServerConfig {
            host: lookup("TIDEMQ_RPC_HOST").unwrap_or_else(|| DEFAULT_RPC_HOST.to_string()),
            port: parse_or(&lookup, "TIDEMQ_RPC_PORT", DEFAULT_RPC_PORT)?,
            auth_token: lookup("TIDEMQ_AUTH_TOKEN").filter(|t| !t.trim().is_empty()),
        };

        let visibility_timeout = Duration::from_millis(parse_or(
            &lookup,
            "TIDEMQ_VISIBILITY_TIMEOUT_MS",
            DEFAULT_VISIBILITY_TIMEOUT_MS,
        )?);

        let format = match lookup("TIDEMQ_LOG_FORMAT").as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(AppError::Config(format!(
                    "TIDEMQ_LOG_FORMAT must be 'pretty' or 'json', got '{}'",
                    other
                )))
            }
        };
        let dir = lookup("TIDEMQ_LOG_DIR").map(|d| expand_path(&d));

        Ok(Self {
            data_dir,
            rpc,
            visibility_timeout,
            log: LogConfig { format, dir },
        })
    }
}

fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{} has invalid value '{}': {}", key, raw, e))),
    }
}
