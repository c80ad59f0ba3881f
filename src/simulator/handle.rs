// =============================================================================
// Simulator Handle: interval driver with scoped release
// =============================================================================
//
// Wraps a PriceSimulator in `Arc<RwLock<_>>` and ticks it from a tokio task on
// a fixed period. The tick holds the write lock for the whole batch, so
// readers only ever see complete ticks.
//
// `dispose()` aborts the task; dropping the handle does the same, so a
// forgotten handle never leaves a timer running against stale state.
// =============================================================================

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock, RwLockReadGuard};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::info;

use crate::error::SimulatorError;
use crate::simulator::clock::SystemClock;
use crate::simulator::engine::PriceSimulator;
use crate::simulator::random::rng_from_seed;
use crate::types::{AssetConfig, LiveAsset};

/// Tick period used when the caller does not choose one.
pub const DEFAULT_INTERVAL_MS: u64 = 2000;

/// Running simulator. Must be created inside a tokio runtime.
pub struct SimulatorHandle {
    shared: Arc<RwLock<PriceSimulator>>,
    interval: Duration,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SimulatorHandle {
    /// Start ticking `simulator` every `interval`. The first tick fires one
    /// full interval after the call.
    pub fn spawn(simulator: PriceSimulator, interval: Duration) -> Result<Self, SimulatorError> {
        if interval.is_zero() {
            return Err(SimulatorError::InvalidInterval);
        }

        let shared = Arc::new(RwLock::new(simulator));
        let ticking = shared.clone();

        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                ticking.write().tick();
            }
        });

        info!(interval_ms = interval.as_millis() as u64, "simulator timer started");

        Ok(Self {
            shared,
            interval,
            task: Mutex::new(Some(task)),
        })
    }

    /// Copy of the full symbol → asset mapping.
    pub fn current_state(&self) -> HashMap<String, LiveAsset> {
        self.shared.read().assets().clone()
    }

    pub fn get_asset(&self, symbol: &str) -> Option<LiveAsset> {
        self.shared.read().get_asset(symbol).cloned()
    }

    /// Read access to the simulator for building several views from one tick.
    pub fn read(&self) -> RwLockReadGuard<'_, PriceSimulator> {
        self.shared.read()
    }

    /// Completed ticks; changes exactly when the published state changes.
    pub fn version(&self) -> u64 {
        self.shared.read().ticks()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .map_or(false, |task| !task.is_finished())
    }

    /// Stop the timer. Safe to call more than once; state stays readable.
    pub fn dispose(&self) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
            info!(ticks = self.version(), "simulator timer stopped");
        }
    }
}

impl Drop for SimulatorHandle {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Build and start a simulator on the host clock.
///
/// `seed` makes the price series reproducible; `None` draws from OS entropy.
pub fn create_simulator(
    configs: Vec<AssetConfig>,
    interval_ms: u64,
    seed: Option<u64>,
) -> Result<SimulatorHandle, SimulatorError> {
    if interval_ms == 0 {
        return Err(SimulatorError::InvalidInterval);
    }
    let simulator = PriceSimulator::new(configs, Arc::new(SystemClock), rng_from_seed(seed))?;
    SimulatorHandle::spawn(simulator, Duration::from_millis(interval_ms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::clock::SteppingClock;
    use crate::simulator::engine::HISTORY_LENGTH;
    use chrono::NaiveTime;

    fn simulator() -> PriceSimulator {
        PriceSimulator::new(
            vec![
                AssetConfig::new("X", 100.0, 0.01),
                AssetConfig::new("Y", 27.85, 0.002),
            ],
            Arc::new(SteppingClock::new(NaiveTime::from_hms_opt(12, 0, 0).unwrap(), 2)),
            rng_from_seed(Some(1)),
        )
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_interval() {
        let handle = SimulatorHandle::spawn(simulator(), Duration::from_millis(2000)).unwrap();
        assert_eq!(handle.version(), 0);

        tokio::time::sleep(Duration::from_millis(1999)).await;
        assert_eq!(handle.version(), 0);

        tokio::time::sleep(Duration::from_millis(8_500)).await;
        assert_eq!(handle.version(), 5);

        let state = handle.current_state();
        assert_eq!(state.len(), 2);
        let x = &state["X"];
        assert_eq!(x.history.len(), HISTORY_LENGTH);
        assert_eq!(x.history.back().unwrap().time, "12:00:08");
        assert_eq!(x.price, x.history.back().unwrap().price);
    }

    #[tokio::test(start_paused = true)]
    async fn dispose_stops_ticking() {
        let handle = SimulatorHandle::spawn(simulator(), Duration::from_millis(2000)).unwrap();
        tokio::time::sleep(Duration::from_millis(4_100)).await;
        assert_eq!(handle.version(), 2);
        assert!(handle.is_running());

        handle.dispose();
        handle.dispose();
        assert!(!handle.is_running());

        tokio::time::sleep(Duration::from_millis(20_000)).await;
        assert_eq!(handle.version(), 2);
        // State remains readable after disposal.
        assert!(handle.get_asset("Y").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn drop_releases_the_timer() {
        let handle = SimulatorHandle::spawn(simulator(), Duration::from_millis(2000)).unwrap();
        let shared = Arc::downgrade(&handle.shared);
        drop(handle);

        // The aborted task drops its clone of the state once it is reaped.
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(shared.upgrade().is_none());
    }

    #[tokio::test]
    async fn zero_interval_is_rejected() {
        let err = SimulatorHandle::spawn(simulator(), Duration::ZERO).err().unwrap();
        assert_eq!(err, SimulatorError::InvalidInterval);

        let err = create_simulator(vec![AssetConfig::new("X", 100.0, 0.01)], 0, None)
            .err()
            .unwrap();
        assert_eq!(err, SimulatorError::InvalidInterval);
    }

    #[tokio::test]
    async fn create_simulator_rejects_bad_config() {
        let err = create_simulator(vec![AssetConfig::new("X", -1.0, 0.01)], 2000, Some(3))
            .err()
            .unwrap();
        assert_eq!(err.code(), "invalid_base_price");
    }

    #[tokio::test]
    async fn lookup_of_unknown_symbol_is_none() {
        let handle = create_simulator(
            vec![AssetConfig::new("TCS.NS", 4125.50, 0.003)],
            DEFAULT_INTERVAL_MS,
            Some(11),
        )
        .unwrap();
        assert!(handle.get_asset("TCS.NS").is_some());
        assert!(handle.get_asset("WIPRO.NS").is_none());
        assert_eq!(handle.interval(), Duration::from_millis(DEFAULT_INTERVAL_MS));
    }
}
