// Central Error Type for the Application

use std::time::Duration;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Failure of the underlying persistence engine, tagged with the
    /// operation that was running when it failed.
    #[error("Storage error during {op}: {message}")]
    Storage { op: &'static str, message: String },

    #[error("Timed out after {0:?} waiting for a message")]
    Timeout(Duration),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Wrap any displayable storage failure with the operation name
    pub fn storage(op: &'static str, err: impl std::fmt::Display) -> Self {
        AppError::Storage {
            op,
            message: err.to_string(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, AppError::Timeout(_))
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

// Note: sqlx::Error conversion is handled in infra-sqlite crate
// by converting to AppError::Storage with the failing operation

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_carries_operation() {
        let err = AppError::storage("enqueue", "disk I/O error");
        assert_eq!(
            err.to_string(),
            "Storage error during enqueue: disk I/O error"
        );
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_timeout_is_distinct() {
        let err = AppError::Timeout(Duration::from_millis(250));
        assert!(err.is_timeout());
        assert!(err.to_string().contains("250ms"));
    }
}
