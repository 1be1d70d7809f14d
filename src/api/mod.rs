//! REST API for running estimates.
//!
//! Provides three endpoints:
//! - `POST /estimate` — full scenario in, estimate response out
//! - `GET /batteries` — built-in battery catalog
//! - `GET /plans` — built-in rate plans

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

use crate::config::ScenarioConfig;

/// Immutable application state shared across all request handlers.
///
/// Wrapped in `Arc` — no locks needed since estimates are computed per
/// request from the posted scenario and this state is read-only.
pub struct AppState {
    /// Server's base scenario, returned by `GET /scenario`.
    pub scenario: ScenarioConfig,
}

/// Builds the axum router with all API routes.
///
/// # Arguments
///
/// * `state` - Shared application state
///
/// # Returns
///
/// Configured `Router` ready to serve.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/estimate", post(handlers::post_estimate))
        .route("/batteries", get(handlers::get_batteries))
        .route("/plans", get(handlers::get_plans))
        .route("/scenario", get(handlers::get_scenario))
        .with_state(state)
}

/// Binds to the given address and serves the API.
///
/// # Arguments
///
/// * `state` - Shared application state
/// * `addr` - Socket address to bind to
///
/// # Panics
///
/// Panics if the TCP listener cannot bind to `addr`.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind to {addr}: {e}"));
    eprintln!("API server listening on http://{addr}");
    axum::serve(listener, app)
        .await
        .unwrap_or_else(|e| panic!("server error: {e}"));
}
