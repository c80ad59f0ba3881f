// =============================================================================
// Shared types used across the Green Alpha price feed
// =============================================================================

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// How a tracked asset moves on every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveModel {
    /// Random walk with mean reversion toward the base price and a slight
    /// upward momentum bias. Used by the stock cards.
    MeanReverting,
    /// Plain proportional drift around the current price. Used by the index
    /// and commodity ticker.
    Drift,
}

impl Default for MoveModel {
    fn default() -> Self {
        Self::MeanReverting
    }
}

impl std::fmt::Display for MoveModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MeanReverting => write!(f, "mean_reverting"),
            Self::Drift => write!(f, "drift"),
        }
    }
}

/// Whether the asset's market is trading. Closed assets are frozen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketSession {
    Open,
    Closed,
}

impl Default for MarketSession {
    fn default() -> Self {
        Self::Open
    }
}

impl std::fmt::Display for MarketSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// Static description of one simulated instrument, supplied once at start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetConfig {
    pub symbol: String,
    /// Anchor for mean reversion and for `change` / `change_percent`.
    pub base_price: f64,
    /// Relative step size, e.g. 0.001 for a calm index, 0.005 for a volatile
    /// stock. Must lie strictly between 0 and 1.
    pub volatility: f64,
    #[serde(default)]
    pub model: MoveModel,
    #[serde(default)]
    pub session: MarketSession,
}

impl AssetConfig {
    pub fn new(symbol: impl Into<String>, base_price: f64, volatility: f64) -> Self {
        Self {
            symbol: symbol.into(),
            base_price,
            volatility,
            model: MoveModel::default(),
            session: MarketSession::default(),
        }
    }

    pub fn with_model(mut self, model: MoveModel) -> Self {
        self.model = model;
        self
    }

    pub fn with_session(mut self, session: MarketSession) -> Self {
        self.session = session;
        self
    }
}

/// One point on a sparkline. `time` is `HH:MM:SS` for live ticks and
/// `T-n` for the synthetic seed history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub time: String,
    pub price: f64,
}

/// Direction of the visible history window, used for chart colouring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
}

/// Live state of one simulated asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveAsset {
    pub symbol: String,
    pub price: f64,
    /// Deviation from `base_price`, not from the previous tick.
    pub change: f64,
    pub change_percent: f64,
    pub base_price: f64,
    /// Oldest first, bounded by the simulator's history length.
    pub history: VecDeque<PricePoint>,
}

impl LiveAsset {
    /// `Up` when the newest point is at or above the oldest one.
    ///
    /// Returns `None` with fewer than two points, where a chart has nothing to
    /// draw.
    pub fn trend(&self) -> Option<Trend> {
        if self.history.len() < 2 {
            return None;
        }
        let first = self.history.front()?.price;
        let last = self.history.back()?.price;
        Some(if last >= first { Trend::Up } else { Trend::Down })
    }
}
