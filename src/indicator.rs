pub mod ma;
pub mod rsi;
pub mod trend;
pub mod volatility;
pub mod volume;

use error_stack::{Report, bail};

use crate::error::ForecastError;
use crate::model::Candle;

/// Extract close prices from a slice of candles.
pub fn close_prices(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

/// Extract volumes from a slice of candles.
pub fn volumes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.volume).collect()
}

/// Fail with `InsufficientData` unless at least `required` values are present.
pub fn require(available: usize, required: usize) -> Result<(), Report<ForecastError>> {
    if available < required {
        bail!(ForecastError::InsufficientData {
            required,
            available,
        });
    }
    Ok(())
}

/// Highest and lowest close in the window, as `(high, low)`.
pub fn close_range(prices: &[f64]) -> Result<(f64, f64), Report<ForecastError>> {
    require(prices.len(), 1)?;
    let high = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let low = prices.iter().copied().fold(f64::INFINITY, f64::min);
    Ok((high, low))
}

#[cfg(test)]
pub(crate) fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
    candles_from_closes_and_volumes(closes, &vec![1.0; closes.len()])
}

#[cfg(test)]
pub(crate) fn candles_from_closes_and_volumes(closes: &[f64], vols: &[f64]) -> Vec<Candle> {
    use chrono::{TimeZone, Utc};

    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    closes
        .iter()
        .zip(vols)
        .enumerate()
        .map(|(i, (&c, &v))| Candle {
            open_time: start + chrono::Duration::minutes(i as i64),
            open: c,
            high: c,
            low: c,
            close: c,
            volume: v,
        })
        .collect()
}
