use thiserror::Error;

pub type OpenApiResult<T> = Result<T, OpenApiError>;

#[derive(Debug, Error)]
pub enum OpenApiError {
    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported document format '{0}' (expected yaml or json)")]
    UnsupportedFormat(String),
}
