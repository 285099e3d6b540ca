use crmgate_core::GatewayError;

pub type ClientResult<T> = Result<T, ClientError>;

/// Failures talking to the backend CRM API
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    #[error("Backend rejected credential (HTTP {status}): {message}")]
    Unauthorized { status: u16, message: String },

    #[error("Backend rejected request (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Backend failed (HTTP {status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("Malformed backend response: {0}")]
    MalformedResponse(String),

    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ClientError {
    /// Classify a non-success HTTP status
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 | 403 => ClientError::Unauthorized { status, message },
            400..=499 => ClientError::Rejected { status, message },
            _ => ClientError::Upstream { status, message },
        }
    }
}

impl From<ClientError> for GatewayError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Connection(_) | ClientError::Timeout(_) => {
                GatewayError::BackendUnavailable(err.to_string())
            }
            ClientError::Unauthorized { message, .. } => GatewayError::Unauthorized(message),
            ClientError::Rejected { message, .. } => GatewayError::invalid_argument("arguments", message),
            ClientError::Upstream { .. } => GatewayError::BackendError(err.to_string()),
            ClientError::MalformedResponse(_) | ClientError::InvalidConfig(_) => {
                GatewayError::Internal(err.to_string())
            }
            ClientError::Http(ref e) if e.is_timeout() || e.is_connect() => {
                GatewayError::BackendUnavailable(err.to_string())
            }
            ClientError::Http(ref e) if e.is_decode() || e.is_builder() => {
                GatewayError::Internal(err.to_string())
            }
            ClientError::Http(_) => GatewayError::BackendUnavailable(err.to_string()),
        }
    }
}
