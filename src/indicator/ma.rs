use error_stack::Report;

use crate::error::ForecastError;
use crate::indicator::require;

/// Simple Moving Average over the whole window.
pub fn sma(prices: &[f64]) -> Result<f64, Report<ForecastError>> {
    require(prices.len(), 1)?;
    Ok(prices.iter().sum::<f64>() / prices.len() as f64)
}

/// Linearly recency-weighted moving average: the sample at index `i` carries
/// weight `i + 1`, so the newest close weighs `n` and the oldest weighs 1.
pub fn wma(prices: &[f64]) -> Result<f64, Report<ForecastError>> {
    require(prices.len(), 1)?;
    let (weighted, total_weight) = prices
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(sum, weights), (i, &p)| {
            let w = (i + 1) as f64;
            (sum + p * w, weights + w)
        });
    Ok(weighted / total_weight)
}
