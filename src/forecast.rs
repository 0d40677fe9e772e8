//! The forecast engine.
//!
//! A pure transformation from a window of candles and the live price into a
//! [`ForecastResult`]. Nothing here performs I/O or logs; every division is
//! guarded so the only failure is a window shorter than
//! [`ForecastSettings::minimum_required`].
//!
//! The blended prediction is the unweighted mean of the enabled estimators.
//! This is a robustness heuristic that keeps one diverging estimator from
//! dominating, not a fitted combination.

use error_stack::Report;
use serde::Serialize;

use crate::error::ForecastError;
use crate::indicator::ma::{sma, wma};
use crate::indicator::rsi::{MomentumBand, momentum_index};
use crate::indicator::trend::{LinearTrend, TrendDirection};
use crate::indicator::volatility::population_std_dev;
use crate::indicator::volume::vwma;
use crate::indicator::{close_prices, close_range, require, volumes};
use crate::model::Candle;

pub const DEFAULT_HORIZON: usize = 5;
pub const DEFAULT_MINIMUM_REQUIRED: usize = 3;

/// Engine parameters. Built from the `[forecast]` config section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastSettings {
    /// Steps ahead, in candle intervals.
    pub horizon: usize,
    pub minimum_required: usize,
    /// Include the volume-weighted average in the blend.
    pub volume_weighted: bool,
    pub momentum: bool,
    pub volatility: bool,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            horizon: DEFAULT_HORIZON,
            minimum_required: DEFAULT_MINIMUM_REQUIRED,
            volume_weighted: true,
            momentum: true,
            volatility: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    pub current_price: f64,
    pub blended_prediction: f64,
    pub sma: f64,
    pub linear_trend: f64,
    pub weighted_ma: f64,
    pub volume_weighted_ma: Option<f64>,
    pub trend_slope: f64,
    pub trend_intercept: f64,
    pub trend_direction: TrendDirection,
    pub momentum_index: Option<f64>,
    pub volatility: Option<f64>,
    pub window_high: f64,
    pub window_low: f64,
    pub horizon: usize,
    pub sample_count: usize,
}

impl ForecastResult {
    /// Predicted move relative to the live price.
    pub fn change(&self) -> f64 {
        self.blended_prediction - self.current_price
    }

    /// Predicted move as a percentage of the live price. Zero when the live
    /// price is zero.
    pub fn change_pct(&self) -> f64 {
        if self.current_price == 0.0 {
            return 0.0;
        }
        self.change() / self.current_price * 100.0
    }

    pub fn momentum_band(&self) -> Option<MomentumBand> {
        self.momentum_index.map(MomentumBand::classify)
    }
}

/// Run every estimator over `window` and blend them into one forecast.
pub fn forecast(
    window: &[Candle],
    current_price: f64,
    settings: &ForecastSettings,
) -> Result<ForecastResult, Report<ForecastError>> {
    require(window.len(), settings.minimum_required.max(1))?;

    let closes = close_prices(window);

    let sma = sma(&closes)?;
    let trend = LinearTrend::fit(&closes)?;
    let linear_trend = trend.project(settings.horizon);
    let weighted_ma = wma(&closes)?;
    let volume_weighted_ma = if settings.volume_weighted {
        Some(vwma(&closes, &volumes(window))?)
    } else {
        None
    };

    let estimates: Vec<f64> = [Some(sma), Some(linear_trend), Some(weighted_ma)]
        .into_iter()
        .chain([volume_weighted_ma])
        .flatten()
        .collect();
    let blended_prediction = estimates.iter().sum::<f64>() / estimates.len() as f64;

    // Fewer than two samples has no price change to measure.
    let momentum_index = if settings.momentum && closes.len() >= 2 {
        Some(momentum_index(&closes)?)
    } else {
        None
    };
    let volatility = if settings.volatility {
        Some(population_std_dev(&closes)?)
    } else {
        None
    };

    let (window_high, window_low) = close_range(&closes)?;

    Ok(ForecastResult {
        current_price,
        blended_prediction,
        sma,
        linear_trend,
        weighted_ma,
        volume_weighted_ma,
        trend_slope: trend.slope,
        trend_intercept: trend.intercept,
        trend_direction: trend.direction(),
        momentum_index,
        volatility,
        window_high,
        window_low,
        horizon: settings.horizon,
        sample_count: window.len(),
    })
}
