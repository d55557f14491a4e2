//! Shared error type across shardmetrics crates.

use thiserror::Error;

/// Stable error codes surfaced to callers and operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Mutation attempted on a read-only view.
    NotPermitted,
    /// Rejected configuration value.
    InvalidConfig,
    /// Malformed input.
    BadRequest,
    /// Internal failure.
    Internal,
}

impl ErrorCode {
    /// String representation used in logs and HTTP responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::NotPermitted => "NOT_PERMITTED",
            ErrorCode::InvalidConfig => "INVALID_CONFIG",
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Unified error type used by the engine and the exporter.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// A read-only histogram view was asked to mutate. Always a caller bug.
    #[error("operation not permitted: {0}")]
    NotPermitted(&'static str),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl MetricsError {
    /// Map an error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            MetricsError::NotPermitted(_) => ErrorCode::NotPermitted,
            MetricsError::InvalidConfig(_) => ErrorCode::InvalidConfig,
            MetricsError::BadRequest(_) => ErrorCode::BadRequest,
            MetricsError::Internal(_) => ErrorCode::Internal,
        }
    }
}
