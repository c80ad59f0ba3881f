// =============================================================================
// Green Alpha Live Price Feed: Main Entry Point
// =============================================================================
//
// Starts the price simulator on its tick interval and serves its state to the
// dashboard over REST and WebSocket. Nothing is persisted; every start seeds a
// fresh history.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod app_state;
mod error;
mod runtime_config;
mod simulator;
mod types;

use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::runtime_config::RuntimeConfig;

const DEFAULT_CONFIG_PATH: &str = "simulator_config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Green Alpha live price feed starting up");

    let config_path =
        std::env::var("GREEN_ALPHA_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());

    let mut config = RuntimeConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });

    for key in config.apply_env(|key| std::env::var(key).ok()) {
        warn!(variable = %key, "Ignoring unparsable environment override");
    }

    for asset in &config.assets {
        info!(
            symbol = %asset.symbol,
            base_price = asset.base_price,
            volatility = asset.volatility,
            model = %asset.model,
            session = %asset.session,
            "Configured asset"
        );
    }

    // ── 2. Simulator ─────────────────────────────────────────────────────
    let simulator =
        simulator::create_simulator(config.assets.clone(), config.interval_ms, config.seed)
            .map_err(|e| {
                error!(code = e.code(), error = %e, "Invalid simulator configuration");
                e
            })
            .context("failed to start price simulator")?;

    info!(
        assets = config.assets.len(),
        interval_ms = config.interval_ms,
        seeded = config.seed.is_some(),
        "Price simulator running"
    );

    // ── 3. Shared state ──────────────────────────────────────────────────
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(config, simulator));

    // ── 4. API server ────────────────────────────────────────────────────
    let app = api::rest::router(state.clone());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind API server on {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening");

    let server = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!(error = %e, "API server failed");
        }
    });

    info!("All subsystems running. Press Ctrl+C to stop.");

    // ── 5. Graceful shutdown ─────────────────────────────────────────────
    tokio::signal::ctrl_c().await?;
    warn!("Shutdown signal received, stopping gracefully");

    state.simulator.dispose();
    server.abort();

    info!(
        ticks = state.current_state_version(),
        "Green Alpha price feed shut down complete."
    );
    Ok(())
}
