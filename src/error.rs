use thiserror::Error;

/// Rejections raised while building a simulator. Nothing is seeded when any
/// of these is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulatorError {
    #[error("asset at position {index} has an empty symbol")]
    EmptySymbol { index: usize },

    #[error("duplicate asset symbol: {0}")]
    DuplicateSymbol(String),

    #[error("invalid base price for {symbol}: {value} (must be finite and > 0)")]
    InvalidBasePrice { symbol: String, value: f64 },

    #[error("invalid volatility for {symbol}: {value} (must be finite and in (0, 1))")]
    InvalidVolatility { symbol: String, value: f64 },

    #[error("tick interval must be greater than zero")]
    InvalidInterval,
}

impl SimulatorError {
    /// Stable machine-readable code for logs and API bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptySymbol { .. } => "empty_symbol",
            Self::DuplicateSymbol(_) => "duplicate_symbol",
            Self::InvalidBasePrice { .. } => "invalid_base_price",
            Self::InvalidVolatility { .. } => "invalid_volatility",
            Self::InvalidInterval => "invalid_interval",
        }
    }
}
