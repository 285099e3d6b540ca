//! Error types for the CLI

use thiserror::Error;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] crmgate_config::ConfigError),

    #[error("Schema error: {0}")]
    Schema(#[from] crmgate_openapi::OpenApiError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("General error: {0}")]
    General(String),
}

/// Server commands report through anyhow; their context chain is kept.
impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        Self::General(format!("{:#}", err))
    }
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
