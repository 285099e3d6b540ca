//! REST API module

pub mod handlers;
pub mod router;

pub use router::create_router;

use crate::{AppState, ServerError, ServerResult};
use crmgate_core::RateLimiter;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Serve REST API until ctrl-c
pub async fn serve(app_state: AppState, addr: &str) -> ServerResult<()> {
    let addr: SocketAddr = addr
        .parse()
        .map_err(|e| ServerError::InvalidInput(format!("Invalid address: {}", e)))?;

    let limiter = app_state.gateway.rate_limiter().clone();
    let period = Duration::from_secs(app_state.config.rate_limit.window_secs.max(1));
    let app = create_router(app_state);

    tracing::info!("Starting REST API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Internal(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());
    let result = tokio::select! {
        res = server.into_future() => res.map_err(|e| ServerError::Internal(format!("Server error: {}", e))),
        _ = sweep_idle_windows(limiter, period) => Ok(()),
    };

    tracing::info!("REST API server stopped");
    result
}

/// Drop idle rate-limit windows once per window length
async fn sweep_idle_windows(limiter: Arc<RateLimiter>, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.tick().await;
    loop {
        ticker.tick().await;
        let evicted = limiter.evict_idle();
        if evicted > 0 {
            tracing::debug!(evicted, "Evicted idle rate-limit entries");
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
