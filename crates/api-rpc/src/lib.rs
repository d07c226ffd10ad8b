//! JSON-RPC API Layer
//!
//! Exposes the queue registry over JSON-RPC 2.0: queue names and message ids
//! are validated here, then each method calls straight into the core.

pub mod auth;
pub mod error;
pub mod handler;
pub mod server;
pub mod types;

pub use server::{RpcServer, RpcServerConfig};
