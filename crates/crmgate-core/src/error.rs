//! Gateway error taxonomy shared by every transport front-end

use serde::Serialize;
use thiserror::Error;

/// Result alias used across the gateway
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Message returned to callers in place of internal diagnostics
pub const GENERIC_INTERNAL_MESSAGE: &str = "Internal server error";

/// Stable, transport-independent error kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnknownTool,
    InvalidArgument,
    Unauthorized,
    RateLimited,
    BackendUnavailable,
    BackendError,
    InternalError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UnknownTool => "unknown_tool",
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::BackendUnavailable => "backend_unavailable",
            ErrorKind::BackendError => "backend_error",
            ErrorKind::InternalError => "internal_error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed failure of a tool invocation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid argument '{field}': {reason}")]
    InvalidArgument { field: String, reason: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Backend error: {0}")]
    BackendError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument { field: field.into(), reason: reason.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::UnknownTool(_) => ErrorKind::UnknownTool,
            GatewayError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            GatewayError::Unauthorized(_) => ErrorKind::Unauthorized,
            GatewayError::RateLimited { .. } => ErrorKind::RateLimited,
            GatewayError::BackendUnavailable(_) => ErrorKind::BackendUnavailable,
            GatewayError::BackendError(_) => ErrorKind::BackendError,
            GatewayError::Internal(_) => ErrorKind::InternalError,
        }
    }

    /// Message safe to hand back to a caller.
    ///
    /// Internal failures are replaced by a generic message; the full text
    /// stays in the server log.
    pub fn public_message(&self) -> String {
        match self {
            GatewayError::Internal(_) => GENERIC_INTERNAL_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Internal(format!("serialization failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_errors_hide_details() {
        let err = GatewayError::internal("db pool exploded at line 42");
        assert_eq!(err.kind(), ErrorKind::InternalError);
        assert_eq!(err.public_message(), GENERIC_INTERNAL_MESSAGE);
        assert!(err.to_string().contains("line 42"));
    }

    #[test]
    fn typed_errors_keep_their_message() {
        let err = GatewayError::invalid_argument("query", "must not be empty");
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(err.public_message(), "Invalid argument 'query': must not be empty");

        let err = GatewayError::RateLimited { retry_after_secs: 12 };
        assert_eq!(err.kind().as_str(), "rate_limited");
        assert!(err.public_message().contains("12s"));
    }
}
