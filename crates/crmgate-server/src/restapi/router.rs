//! REST API router

use crate::{
    middleware::{BearerAuthLayer, RequestIdLayer},
    AppState,
};
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{docs, health, not_found, query, tools};

/// Create REST API router
///
/// `/query` and `/tools*` require a bearer token; discovery and health
/// routes are public. Unmatched paths and oversized bodies still answer
/// with the JSON error body.
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/query", post(query::natural_language_query))
        .route("/tools", get(tools::list_tools).post(tools::execute_tool))
        .route("/tools/:tool", post(tools::execute_named_tool))
        .route_layer(BearerAuthLayer);

    let public = Router::new()
        .route("/", get(docs::root_docs))
        .route("/health", get(health::health_check))
        .route("/openapi.json", get(docs::openapi_json))
        .route("/openapi.yaml", get(docs::openapi_yaml))
        .route("/.well-known/ai-plugin.json", get(docs::ai_plugin));

    let body_limit = state.config.max_request_body_bytes;
    let cors = cors_layer(&state.config.cors_origins);

    public
        .merge(protected)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(RequestIdLayer)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }

    let list: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(AllowOrigin::list(list))
}
