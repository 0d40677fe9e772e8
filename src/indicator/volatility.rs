use error_stack::Report;

use crate::error::ForecastError;
use crate::indicator::ma::sma;

/// Population standard deviation of the window's closes.
pub fn population_std_dev(prices: &[f64]) -> Result<f64, Report<ForecastError>> {
    let mean = sma(prices)?;
    let variance =
        prices.iter().map(|&p| (p - mean).powi(2)).sum::<f64>() / prices.len() as f64;
    Ok(variance.sqrt())
}
