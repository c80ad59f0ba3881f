pub mod clock;
pub mod engine;
pub mod handle;
pub mod price_move;
pub mod random;

pub use handle::{create_simulator, SimulatorHandle, DEFAULT_INTERVAL_MS};
