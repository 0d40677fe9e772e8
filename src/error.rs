use derive_more::{Display, Error};

#[derive(Debug, Display, Error)]
pub enum ConfigError {
    #[display("failed to read config file")]
    ReadFile,
    #[display("failed to parse config: {reason}")]
    Parse { reason: String },
    #[display("invalid config: {field}")]
    Validation { field: String },
}

#[derive(Debug, Display, Error)]
pub enum MarketDataError {
    #[display("market data unavailable from {endpoint}")]
    Unavailable { endpoint: String },
    #[display("too few candles: need {required}, got {available}")]
    TooFewCandles { required: usize, available: usize },
}

#[derive(Debug, Display, Error)]
pub enum ForecastError {
    #[display("insufficient data: need {required}, got {available}")]
    InsufficientData { required: usize, available: usize },
}

/// Outcome of a failed forecast run. Both variants are terminal for the run
/// and never retried within it.
#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum RunError {
    #[display("no market data available")]
    DataUnavailable,
    #[display("not enough samples to forecast")]
    InsufficientData,
}
