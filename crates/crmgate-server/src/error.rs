//! Server error types

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use crmgate_core::{ErrorKind, GatewayError};
use serde::Serialize;

pub type ServerResult<T> = Result<T, ServerError>;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No route for {0}")]
    NotFound(String),

    #[error("Request body too large: {0}")]
    PayloadTooLarge(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("MCP error: {0}")]
    Mcp(#[from] crmgate_mcp::McpError),
}

/// Body of every error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// HTTP status for each gateway error kind
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::UnknownTool | ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        ErrorKind::BackendError => StatusCode::BAD_GATEWAY,
        ErrorKind::BackendUnavailable => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ServerError {
    pub fn to_http_response(&self, request_id: &str) -> Response {
        let (status, message) = match self {
            ServerError::Gateway(e) => (status_for(e.kind()), e.public_message()),
            ServerError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ServerError::NotFound(_) => (StatusCode::NOT_FOUND, "Not Found".to_string()),
            ServerError::PayloadTooLarge(_) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "Request body exceeds the configured limit".to_string())
            }
            ServerError::Config(_) | ServerError::Internal(_) | ServerError::Mcp(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, crmgate_core::GENERIC_INTERNAL_MESSAGE.to_string())
            }
        };

        if status.is_server_error() {
            tracing::error!(request_id = %request_id, status = status.as_u16(), error = %self, "request failed");
        } else {
            tracing::debug!(request_id = %request_id, status = status.as_u16(), error = %self, "request rejected");
        }

        let mut response = (status, Json(ErrorResponse { error: message })).into_response();
        if let ServerError::Gateway(GatewayError::RateLimited { retry_after_secs }) = self {
            if let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_statuses() {
        let cases = [
            (GatewayError::UnknownTool("x".into()), StatusCode::BAD_REQUEST),
            (GatewayError::invalid_argument("query", "is required"), StatusCode::BAD_REQUEST),
            (GatewayError::Unauthorized("no".into()), StatusCode::UNAUTHORIZED),
            (GatewayError::RateLimited { retry_after_secs: 3 }, StatusCode::TOO_MANY_REQUESTS),
            (GatewayError::BackendError("boom".into()), StatusCode::BAD_GATEWAY),
            (GatewayError::BackendUnavailable("timeout".into()), StatusCode::GATEWAY_TIMEOUT),
            (GatewayError::internal("secret detail"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ServerError::from(err).to_http_response("req").status(), status);
        }
    }

    #[test]
    fn rate_limit_sets_retry_after() {
        let response = ServerError::from(GatewayError::RateLimited { retry_after_secs: 42 }).to_http_response("req");
        assert_eq!(response.headers()[header::RETRY_AFTER], "42");
    }
}
