use std::fmt;

use error_stack::Report;
use serde::Serialize;

use crate::error::ForecastError;
use crate::indicator::require;

/// Direction of the fitted trend line.
///
/// A slope of exactly zero is reported as `Down`; there is no flat state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrendDirection {
    Up,
    Down,
}

impl TrendDirection {
    pub fn from_slope(slope: f64) -> Self {
        if slope > 0.0 { Self::Up } else { Self::Down }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "UP"),
            Self::Down => write!(f, "DOWN"),
        }
    }
}

/// Ordinary least-squares line of close against sample index `0..n`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTrend {
    pub slope: f64,
    pub intercept: f64,
    samples: usize,
}

impl LinearTrend {
    pub fn fit(prices: &[f64]) -> Result<Self, Report<ForecastError>> {
        require(prices.len(), 1)?;

        let n = prices.len() as f64;
        let x_mean = (n - 1.0) / 2.0;
        let y_mean = prices.iter().sum::<f64>() / n;

        let (num, den) = prices
            .iter()
            .enumerate()
            .fold((0.0, 0.0), |(num, den), (i, &y)| {
                let dx = i as f64 - x_mean;
                (num + dx * (y - y_mean), den + dx * dx)
            });

        // Single sample: no spread in x, so no slope.
        let slope = if den == 0.0 { 0.0 } else { num / den };

        Ok(Self {
            slope,
            intercept: y_mean - slope * x_mean,
            samples: prices.len(),
        })
    }

    /// Extrapolate the line to index `n + horizon`.
    pub fn project(&self, horizon: usize) -> f64 {
        self.slope * (self.samples + horizon) as f64 + self.intercept
    }

    pub fn direction(&self) -> TrendDirection {
        TrendDirection::from_slope(self.slope)
    }
}
