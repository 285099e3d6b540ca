//! Natural-language query handler

use crate::dto::{QueryRequest, QueryResponse};
use crate::error::ServerError;
use crate::middleware::RequestId;
use crate::restapi::handlers::{now_rfc3339, parse_body};
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Extension, State},
    response::{Json, Response},
};
use crmgate_core::{Credential, GatewayError, ResponseFormat};

/// POST /query
pub async fn natural_language_query(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Extension(credential): Extension<Credential>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<QueryResponse>, Response> {
    let request: QueryRequest = parse_body(body).map_err(|e| e.to_http_response(request_id.as_str()))?;

    let query = request.query.unwrap_or_default();
    if query.trim().is_empty() {
        let err = GatewayError::invalid_argument("query", "Query parameter is required");
        return Err(ServerError::from(err).to_http_response(request_id.as_str()));
    }
    let format = match request.response_format.as_deref() {
        None => ResponseFormat::default(),
        Some(f) => f
            .parse::<ResponseFormat>()
            .map_err(|e| ServerError::from(e).to_http_response(request_id.as_str()))?,
    };

    let result = state
        .gateway
        .query(&query, format, credential)
        .await
        .map_err(|e| ServerError::from(e).to_http_response(request_id.as_str()))?;

    Ok(Json(QueryResponse {
        query,
        result: result.text,
        response_format: format.to_string(),
        timestamp: now_rfc3339(),
        success: result.succeeded,
    }))
}
