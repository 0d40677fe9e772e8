use std::fmt;

use error_stack::Report;

use crate::error::ForecastError;
use crate::indicator::require;

pub const OVERBOUGHT_LEVEL: f64 = 70.0;
pub const OVERSOLD_LEVEL: f64 = 30.0;

/// RSI-style momentum index over the whole window.
///
/// Average gain and loss are flat means over every consecutive pair rather
/// than Wilder-smoothed running averages.
pub fn momentum_index(prices: &[f64]) -> Result<f64, Report<ForecastError>> {
    require(prices.len(), 2)?;

    let pairs = (prices.len() - 1) as f64;
    let (gains, losses) = prices.windows(2).fold((0.0, 0.0), |(g, l), w| {
        let delta = w[1] - w[0];
        (g + delta.max(0.0), l + (-delta).max(0.0))
    });

    Ok(rsi_value(gains / pairs, losses / pairs))
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

/// Display band of a momentum reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MomentumBand {
    Overbought,
    Oversold,
    Neutral,
}

impl MomentumBand {
    pub fn classify(index: f64) -> Self {
        if index > OVERBOUGHT_LEVEL {
            Self::Overbought
        } else if index < OVERSOLD_LEVEL {
            Self::Oversold
        } else {
            Self::Neutral
        }
    }
}

impl fmt::Display for MomentumBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overbought => write!(f, "Overbought"),
            Self::Oversold => write!(f, "Oversold"),
            Self::Neutral => write!(f, "Normal"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn momentum_needs_two_samples() {
        assert!(momentum_index(&[1.0]).is_err());
        assert!(momentum_index(&[1.0, 1.0]).is_ok());
    }

    #[test]
    fn all_gains_returns_100() {
        assert_eq!(momentum_index(&[1.0, 2.0, 3.0, 4.0]).unwrap(), 100.0);
    }

    #[test]
    fn all_losses_returns_0() {
        let value = momentum_index(&[4.0, 3.0, 2.0, 1.0]).unwrap();
        assert!(value.abs() < 1e-9);
    }

    #[test]
    fn flat_window_has_no_loss() {
        assert_eq!(momentum_index(&[10.0; 5]).unwrap(), 100.0);
    }

    #[test]
    fn mixed_moves_use_flat_means() {
        // deltas +2, -1, +1, -2: avg_gain = 3/4, avg_loss = 3/4, rs = 1
        let value = momentum_index(&[10.0, 12.0, 11.0, 12.0, 10.0]).unwrap();
        assert!((value - 50.0).abs() < 1e-9);
    }

    #[test]
    fn value_stays_within_bounds() {
        let prices = [5.0, 9.0, 2.0, 8.5, 8.4, 1.0, 30.0, 29.0];
        let value = momentum_index(&prices).unwrap();
        assert!((0.0..=100.0).contains(&value));
    }

    #[test]
    fn band_thresholds() {
        assert_eq!(MomentumBand::classify(70.1), MomentumBand::Overbought);
        assert_eq!(MomentumBand::classify(70.0), MomentumBand::Neutral);
        assert_eq!(MomentumBand::classify(30.0), MomentumBand::Neutral);
        assert_eq!(MomentumBand::classify(29.9), MomentumBand::Oversold);
        assert_eq!(MomentumBand::Neutral.to_string(), "Normal");
    }
}
