use error_stack::Report;

use crate::error::ForecastError;
use crate::indicator::ma::sma;
use crate::indicator::require;

/// Volume-Weighted Moving Average of closes.
///
/// Falls back to the simple average when the window carries no volume at
/// all. `prices` and `volumes` are paired by index; extra entries in the
/// longer slice are ignored.
pub fn vwma(prices: &[f64], volumes: &[f64]) -> Result<f64, Report<ForecastError>> {
    require(prices.len(), 1)?;

    let total_volume: f64 = volumes.iter().take(prices.len()).sum();
    if total_volume <= 0.0 {
        return sma(prices);
    }

    let weighted: f64 = prices.iter().zip(volumes).map(|(&p, &v)| p * v).sum();
    Ok(weighted / total_volume)
}
