// =============================================================================
// Runtime Configuration: simulated assets, tick period and bind address
// =============================================================================
//
// Loaded once at startup from a JSON file. Every field carries a serde default
// so a missing or partial file still yields a runnable feed. Environment
// overrides are applied on top in `main.rs`.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::simulator::DEFAULT_INTERVAL_MS;
use crate::types::{AssetConfig, MarketSession, MoveModel};

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_interval_ms() -> u64 {
    DEFAULT_INTERVAL_MS
}

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

fn default_assets() -> Vec<AssetConfig> {
    vec![
        AssetConfig::new("TCS.NS", 4125.50, 0.003),
        AssetConfig::new("INFY.NS", 1876.30, 0.003),
        AssetConfig::new("RELIANCE.NS", 2945.80, 0.0025),
        AssetConfig::new("HDFCBANK.NS", 1654.25, 0.002),
        AssetConfig::new("WIPRO.NS", 467.85, 0.004),
        AssetConfig::new("SPX", 5234.18, 0.0015).with_model(MoveModel::Drift),
        AssetConfig::new("FTSE", 7687.45, 0.0015)
            .with_model(MoveModel::Drift)
            .with_session(MarketSession::Closed),
        AssetConfig::new("XAU", 2345.80, 0.001).with_model(MoveModel::Drift),
        AssetConfig::new("XAG", 27.85, 0.001).with_model(MoveModel::Drift),
    ]
}

// =============================================================================
// RuntimeConfig
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Tick period in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Fixed RNG seed for a reproducible feed. Unset means OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Address the dashboard API listens on.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Instruments to simulate, in display order.
    #[serde(default = "default_assets")]
    pub assets: Vec<AssetConfig>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            seed: None,
            bind_addr: default_bind_addr(),
            assets: default_assets(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// A missing file is an error so the caller can fall back to defaults with
    /// a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        info!(
            path = %path.display(),
            assets = config.assets.len(),
            interval_ms = config.interval_ms,
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Apply `GREEN_ALPHA_*` overrides from the given lookup.
    ///
    /// Values that fail to parse are ignored and reported back by name.
    pub fn apply_env<F>(&mut self, lookup: F) -> Vec<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut rejected = Vec::new();

        if let Some(raw) = lookup("GREEN_ALPHA_INTERVAL_MS") {
            match raw.trim().parse::<u64>() {
                Ok(ms) => self.interval_ms = ms,
                Err(_) => rejected.push("GREEN_ALPHA_INTERVAL_MS".to_string()),
            }
        }
        if let Some(raw) = lookup("GREEN_ALPHA_SEED") {
            match raw.trim().parse::<u64>() {
                Ok(seed) => self.seed = Some(seed),
                Err(_) => rejected.push("GREEN_ALPHA_SEED".to_string()),
            }
        }
        if let Some(addr) = lookup("GREEN_ALPHA_BIND_ADDR") {
            let addr = addr.trim();
            if !addr.is_empty() {
                self.bind_addr = addr.to_string();
            }
        }

        rejected
    }
}
