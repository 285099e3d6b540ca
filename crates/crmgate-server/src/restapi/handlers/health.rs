//! Health check handler

use crate::dto::{DeploymentInfo, HealthResponse};
use crate::restapi::handlers::now_rfc3339;
use crate::AppState;
use axum::{extract::State, response::Json};

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let version = env!("CARGO_PKG_VERSION").to_string();
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: now_rfc3339(),
        available_tools: state.gateway.registry().names(),
        server_type: "openapi_actions".to_string(),
        version: version.clone(),
        deployment_info: DeploymentInfo {
            version,
            started_at: state.started_at.to_rfc3339(),
            uptime_secs: state.uptime_secs(),
        },
    })
}
