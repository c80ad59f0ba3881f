// =============================================================================
// Central Application State: Green Alpha price feed
// =============================================================================
//
// Ties the running simulator to the dashboard API. REST handlers and the
// WebSocket pusher only read; the simulator's own timer task is the single
// writer.
//
// Thread safety:
//   - Atomic counters for connection and message bookkeeping.
//   - The simulator sits behind parking_lot::RwLock inside SimulatorHandle;
//     every snapshot is built under one read guard, so it reflects exactly
//     one completed tick.
// =============================================================================

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use chrono::Utc;
use serde::Serialize;

use crate::runtime_config::RuntimeConfig;
use crate::simulator::SimulatorHandle;
use crate::types::{AssetConfig, LiveAsset, MarketSession, MoveModel, Trend};

/// Central application state shared across all async tasks via `Arc<AppState>`.
pub struct AppState {
    /// WebSocket message sequence number (incremented per message sent).
    pub ws_sequence_number: AtomicU64,

    /// Currently connected WebSocket clients.
    pub ws_clients: AtomicUsize,

    pub runtime_config: RuntimeConfig,

    pub simulator: SimulatorHandle,

    /// Instant when the feed was started. Used for uptime calculations.
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(config: RuntimeConfig, simulator: SimulatorHandle) -> Self {
        Self {
            ws_sequence_number: AtomicU64::new(0),
            ws_clients: AtomicUsize::new(0),
            runtime_config: config,
            simulator,
            start_time: std::time::Instant::now(),
        }
    }

    /// Completed simulator ticks. The WebSocket feed pushes when this moves.
    pub fn current_state_version(&self) -> u64 {
        self.simulator.version()
    }

    /// Build the full dashboard payload from a single tick.
    pub fn build_snapshot(&self) -> FeedSnapshot {
        let sim = self.simulator.read();

        let assets = sim
            .iter_ordered()
            .map(|(cfg, asset)| AssetView::new(cfg, asset))
            .collect();

        FeedSnapshot {
            state_version: sim.ticks(),
            ws_sequence_number: self.ws_sequence_number.load(Ordering::Relaxed),
            server_time: Utc::now().timestamp_millis(),
            uptime_s: self.start_time.elapsed().as_secs(),
            interval_ms: self.simulator.interval().as_millis() as u64,
            last_update: sim.last_update().map(str::to_string),
            ws_clients: self.ws_clients.load(Ordering::Relaxed),
            assets,
        }
    }

    /// View of one asset, or `None` for an untracked symbol.
    pub fn asset_view(&self, symbol: &str) -> Option<AssetView> {
        let sim = self.simulator.read();
        let cfg = sim.config(symbol)?;
        let asset = sim.get_asset(symbol)?;
        Some(AssetView::new(cfg, asset))
    }
}

// =============================================================================
// Serialisable snapshot types
// =============================================================================

/// Full feed snapshot sent to the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct FeedSnapshot {
    pub state_version: u64,
    /// Feed messages sent across all WebSocket clients, this one included.
    pub ws_sequence_number: u64,
    pub server_time: i64,
    pub uptime_s: u64,
    pub interval_ms: u64,
    /// `HH:MM:SS` of the last tick; absent before the first one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update: Option<String>,
    pub ws_clients: usize,
    pub assets: Vec<AssetView>,
}

/// A live asset plus the presentation hints the cards need.
#[derive(Debug, Clone, Serialize)]
pub struct AssetView {
    #[serde(flatten)]
    pub asset: LiveAsset,
    pub model: MoveModel,
    pub session: MarketSession,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<Trend>,
}

impl AssetView {
    fn new(cfg: &AssetConfig, asset: &LiveAsset) -> Self {
        Self {
            asset: asset.clone(),
            model: cfg.model,
            session: cfg.session,
            trend: asset.trend(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::create_simulator;
    use crate::simulator::engine::HISTORY_LENGTH;

    fn state() -> AppState {
        let cfg = RuntimeConfig {
            seed: Some(5),
            ..RuntimeConfig::default()
        };
        let sim = create_simulator(cfg.assets.clone(), cfg.interval_ms, cfg.seed).unwrap();
        AppState::new(cfg, sim)
    }

    #[tokio::test]
    async fn snapshot_lists_assets_in_config_order() {
        let state = state();
        let snap = state.build_snapshot();

        let symbols: Vec<&str> = snap.assets.iter().map(|a| a.asset.symbol.as_str()).collect();
        let expected: Vec<&str> = state
            .runtime_config
            .assets
            .iter()
            .map(|a| a.symbol.as_str())
            .collect();
        assert_eq!(symbols, expected);
        assert_eq!(snap.state_version, 0);
        assert_eq!(snap.ws_sequence_number, 0);
        assert_eq!(snap.interval_ms, 2000);
        assert!(snap.last_update.is_none());
        assert!(snap.assets.iter().all(|a| a.trend.is_some()));
        assert!(snap.assets.iter().all(|a| a.asset.history.len() == HISTORY_LENGTH));
    }

    #[tokio::test]
    async fn snapshot_publishes_message_sequence() {
        let state = state();
        state.ws_sequence_number.fetch_add(1, Ordering::Relaxed);
        state.ws_sequence_number.fetch_add(1, Ordering::Relaxed);

        let json = serde_json::to_value(state.build_snapshot()).unwrap();
        assert_eq!(json["ws_sequence_number"], 2);
    }

    #[tokio::test]
    async fn asset_view_flattens_live_fields() {
        let state = state();
        let view = state.asset_view("XAU").unwrap();
        assert_eq!(view.model, MoveModel::Drift);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["symbol"], "XAU");
        assert_eq!(json["base_price"], 2345.80);
        assert_eq!(json["model"], "drift");
        assert_eq!(json["session"], "open");
        assert_eq!(json["history"].as_array().unwrap().len(), HISTORY_LENGTH);
        assert_eq!(json["history"][0]["time"], "T-60");

        assert!(state.asset_view("DAX").is_none());
    }
}
