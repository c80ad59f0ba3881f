// =============================================================================
// REST API: read-only dashboard endpoints
// =============================================================================
//
// Routes (all GET, no auth):
//   /api/v1/health                     liveness + current state version
//   /api/v1/state                      full feed snapshot
//   /api/v1/assets/:symbol             one asset with presentation hints
//   /api/v1/assets/:symbol/history     that asset's sparkline points
//   /api/v1/ws                         WebSocket push feed (see ws.rs)
//
// CORS is wide open; the feed carries nothing but simulated prices.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::debug;

use crate::app_state::AppState;

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/state", get(full_state))
        .route("/api/v1/prices", get(prices))
        .route("/api/v1/assets/:symbol", get(asset))
        .route("/api/v1/assets/:symbol/history", get(asset_history))
        .route("/api/v1/ws", get(crate::api::ws::ws_handler))
        .layer(cors)
        .with_state(state)
}

fn unknown_symbol(symbol: &str) -> Response {
    debug!(symbol = %symbol, "lookup for untracked symbol");
    let body = serde_json::json!({
        "error": "unknown symbol",
        "symbol": symbol,
    });
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    state_version: u64,
    server_time: i64,
    simulator_running: bool,
    seeded: bool,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let running = state.simulator.is_running();
    let resp = HealthResponse {
        status: if running { "ok" } else { "stopped" },
        state_version: state.current_state_version(),
        server_time: chrono::Utc::now().timestamp_millis(),
        simulator_running: running,
        seeded: state.runtime_config.seed.is_some(),
    };
    Json(resp)
}

// =============================================================================
// Full snapshot
// =============================================================================

async fn full_state(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.build_snapshot())
}

/// Bare symbol → asset mapping, without presentation hints.
async fn prices(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.simulator.current_state())
}

// =============================================================================
// Single asset
// =============================================================================

async fn asset(State(state): State<Arc<AppState>>, Path(symbol): Path<String>) -> Response {
    match state.asset_view(&symbol) {
        Some(view) => Json(view).into_response(),
        None => unknown_symbol(&symbol),
    }
}

async fn asset_history(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Response {
    match state.simulator.get_asset(&symbol) {
        Some(asset) => Json(asset.history).into_response(),
        None => unknown_symbol(&symbol),
    }
}
