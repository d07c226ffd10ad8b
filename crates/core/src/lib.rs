// tidemq Core - Queue storage engine, registry & ports
// NO infrastructure dependencies (hexagonal architecture)

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use application::{QueueRegistry, QueueStore, QueueStoreConfig};
pub use domain::{Message, QueueName};
pub use error::{AppError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
