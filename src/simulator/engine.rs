// =============================================================================
// Price Simulator: seeded history + per-tick batch update
// =============================================================================
//
// Owns the symbol → LiveAsset mapping. Each asset starts with a synthetic
// history of HISTORY_LENGTH points labelled "T-60" .. "T-1", generated by
// walking the move function forward from the base price. Every `tick()` then
// advances all open assets once, appends an `HH:MM:SS` point and trims the
// ring to HISTORY_LENGTH.
//
// The simulator is plain owned data with no timer; `SimulatorHandle` drives it
// on an interval. A tick runs to completion on `&mut self`, so any reader
// holding the surrounding lock sees either the whole batch or none of it.
// =============================================================================

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::SimulatorError;
use crate::simulator::clock::Clock;
use crate::simulator::price_move::{change_from_base, next_price};
use crate::simulator::random::UniformSource;
use crate::types::{AssetConfig, LiveAsset, MarketSession, PricePoint};

/// Points kept per asset.
pub const HISTORY_LENGTH: usize = 60;

/// Reject configurations that cannot be simulated.
///
/// Runs before any seeding, so a failed build draws no random numbers.
pub fn validate_configs(configs: &[AssetConfig]) -> Result<(), SimulatorError> {
    let mut seen = HashSet::with_capacity(configs.len());

    for (index, cfg) in configs.iter().enumerate() {
        if cfg.symbol.trim().is_empty() {
            return Err(SimulatorError::EmptySymbol { index });
        }
        if !cfg.base_price.is_finite() || cfg.base_price <= 0.0 {
            return Err(SimulatorError::InvalidBasePrice {
                symbol: cfg.symbol.clone(),
                value: cfg.base_price,
            });
        }
        if !cfg.volatility.is_finite() || cfg.volatility <= 0.0 || cfg.volatility >= 1.0 {
            return Err(SimulatorError::InvalidVolatility {
                symbol: cfg.symbol.clone(),
                value: cfg.volatility,
            });
        }
        if !seen.insert(cfg.symbol.as_str()) {
            return Err(SimulatorError::DuplicateSymbol(cfg.symbol.clone()));
        }
    }

    Ok(())
}

/// Build the initial mapping: one LiveAsset per config with a full seed
/// history and zero change. Closed-session assets are seeded flat at their
/// base price, which keeps `price == base_price` while they never tick.
pub fn initialize(
    configs: &[AssetConfig],
    rng: &mut dyn UniformSource,
) -> Result<HashMap<String, LiveAsset>, SimulatorError> {
    validate_configs(configs)?;

    let mut assets = HashMap::with_capacity(configs.len());
    for cfg in configs {
        let mut history = VecDeque::with_capacity(HISTORY_LENGTH + 1);
        let mut price = cfg.base_price;
        for n in (1..=HISTORY_LENGTH).rev() {
            // A closed market sits flat at its base quote and draws nothing.
            if cfg.session == MarketSession::Open {
                price = next_price(cfg.model, price, cfg.base_price, cfg.volatility, rng);
            }
            history.push_back(PricePoint {
                time: format!("T-{n}"),
                price,
            });
        }

        assets.insert(
            cfg.symbol.clone(),
            LiveAsset {
                symbol: cfg.symbol.clone(),
                price,
                change: 0.0,
                change_percent: 0.0,
                base_price: cfg.base_price,
                history,
            },
        );
    }

    Ok(assets)
}

/// In-memory simulator for a fixed set of assets.
pub struct PriceSimulator {
    configs: Vec<AssetConfig>,
    assets: HashMap<String, LiveAsset>,
    clock: Arc<dyn Clock>,
    rng: Box<dyn UniformSource>,
    ticks: u64,
    last_update: Option<String>,
}

impl PriceSimulator {
    /// Validate `configs` and seed every asset's history.
    pub fn new(
        configs: Vec<AssetConfig>,
        clock: Arc<dyn Clock>,
        mut rng: Box<dyn UniformSource>,
    ) -> Result<Self, SimulatorError> {
        let assets = initialize(&configs, rng.as_mut())?;

        info!(
            assets = configs.len(),
            history = HISTORY_LENGTH,
            "price simulator seeded"
        );

        Ok(Self {
            configs,
            assets,
            clock,
            rng,
            ticks: 0,
            last_update: None,
        })
    }

    /// Advance every open asset by one step.
    ///
    /// When nothing is open the tick is a no-op: no label is recorded and
    /// the tick count (the published state version) stays put.
    pub fn tick(&mut self) {
        let label = self.clock.label();
        let mut moved = 0usize;

        for cfg in &self.configs {
            if cfg.session == MarketSession::Closed {
                continue;
            }
            let Some(asset) = self.assets.get_mut(&cfg.symbol) else {
                continue;
            };

            let price = next_price(
                cfg.model,
                asset.price,
                cfg.base_price,
                cfg.volatility,
                self.rng.as_mut(),
            );
            let (change, change_percent) = change_from_base(price, asset.base_price);

            asset.price = price;
            asset.change = change;
            asset.change_percent = change_percent;
            asset.history.push_back(PricePoint {
                time: label.clone(),
                price,
            });
            while asset.history.len() > HISTORY_LENGTH {
                asset.history.pop_front();
            }
            moved += 1;
        }

        if moved == 0 {
            debug!(at = %label, "simulator tick skipped, no open assets");
            return;
        }

        self.ticks += 1;
        debug!(tick = self.ticks, moved, at = %label, "simulator tick");
        self.last_update = Some(label);
    }

    /// Lookup by symbol. Unknown symbols are `None`, never an error.
    pub fn get_asset(&self, symbol: &str) -> Option<&LiveAsset> {
        self.assets.get(symbol)
    }

    /// The full symbol → asset mapping.
    pub fn assets(&self) -> &HashMap<String, LiveAsset> {
        &self.assets
    }

    /// Assets paired with their config, in configuration order.
    pub fn iter_ordered(&self) -> impl Iterator<Item = (&AssetConfig, &LiveAsset)> {
        self.configs
            .iter()
            .filter_map(|cfg| self.assets.get(&cfg.symbol).map(|asset| (cfg, asset)))
    }

    pub fn config(&self, symbol: &str) -> Option<&AssetConfig> {
        self.configs.iter().find(|cfg| cfg.symbol == symbol)
    }

    /// Number of completed ticks.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Wall-clock label of the most recent tick.
    pub fn last_update(&self) -> Option<&str> {
        self.last_update.as_deref()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
