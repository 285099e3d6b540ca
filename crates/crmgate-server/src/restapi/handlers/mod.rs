//! REST API handlers

pub mod docs;
pub mod health;
pub mod query;
pub mod tools;

use crate::error::ServerError;
use crate::middleware::RequestId;
use axum::body::Bytes;
use axum::extract::{rejection::BytesRejection, Extension};
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::Response;
use serde::de::DeserializeOwned;

/// Decode a JSON body; an empty body reads as `T::default()`
pub(crate) fn parse_body<T: DeserializeOwned + Default>(
    body: Result<Bytes, BytesRejection>,
) -> Result<T, ServerError> {
    let body = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ServerError::PayloadTooLarge(rejection.body_text())
        } else {
            ServerError::InvalidInput(format!("Failed to read request body: {}", rejection.body_text()))
        }
    })?;
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(&body).map_err(|e| ServerError::InvalidInput(format!("Invalid JSON body: {}", e)))
}

pub(crate) fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

pub(crate) fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Fallback for paths no route matches
pub async fn not_found(Extension(request_id): Extension<RequestId>, uri: Uri) -> Response {
    ServerError::NotFound(uri.path().to_string()).to_http_response(request_id.as_str())
}
