//! Common Error Types for zDrop
//!
//! Provides unified error handling across all modules.

use thiserror::Error;

/// Root error type for the zDrop service
#[derive(Debug, Error)]
pub enum ZDropError {
    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Logging errors
    #[error("logging error: {0}")]
    Logging(#[from] crate::logging::LoggingError),

    /// Storage errors
    #[error("storage error: {0}")]
    Storage(#[from] crate::storage::StorageError),

    /// Custody errors
    #[error("custody error: {0}")]
    Custody(#[from] crate::custody::CustodyError),

    /// Lifecycle controller errors
    #[error("distributor error: {0}")]
    Distributor(#[from] crate::distributor::DistributorError),

    /// API errors
    #[error("API error: {0}")]
    Api(String),

    /// Internal errors
    #[error("internal error: {0}")]
    Internal(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ZDropError {
    /// Create an API error
    pub fn api(msg: impl Into<String>) -> Self {
        Self::Api(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            ZDropError::Config(_) => "CONFIG_ERROR",
            ZDropError::Logging(_) => "LOGGING_ERROR",
            ZDropError::Storage(_) => "STORAGE_ERROR",
            ZDropError::Custody(_) => "CUSTODY_ERROR",
            ZDropError::Distributor(err) => err.error_code(),
            ZDropError::Api(_) => "API_ERROR",
            ZDropError::Internal(_) => "INTERNAL_ERROR",
            ZDropError::Io(_) => "IO_ERROR",
        }
    }
}

/// Result type alias using ZDropError
pub type Result<T> = std::result::Result<T, ZDropError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributor::DistributorError;

    #[test]
    fn test_error_creation() {
        let err = ZDropError::api("bad payload");
        assert!(err.to_string().contains("bad payload"));
        assert_eq!(err.error_code(), "API_ERROR");
    }

    #[test]
    fn test_distributor_codes_pass_through() {
        let err: ZDropError = DistributorError::AlreadyClaimed.into();
        assert_eq!(err.error_code(), "ALREADY_CLAIMED");
    }
}
