pub mod binance;

use error_stack::{Report, bail};
use futures::future::BoxFuture;

use crate::config::ForecastConfig;
use crate::error::MarketDataError;
use crate::model::{Candle, TimeFrame};

/// Source of live prices and historical candles for one market.
///
/// Uses `BoxFuture` (from `futures` crate) instead of `async fn` in trait
/// to keep the trait object-safe (`dyn Exchange`).
pub trait Exchange: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch the latest traded price. Always positive and finite on success.
    fn fetch_price(&self, symbol: &str) -> BoxFuture<'_, Result<f64, Report<MarketDataError>>>;

    /// Fetch up to `limit` most recent candles, oldest first.
    fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: TimeFrame,
        limit: usize,
    ) -> BoxFuture<'_, Result<Vec<Candle>, Report<MarketDataError>>>;
}

/// Fetch the forecast window described by `config`.
///
/// Fails with `TooFewCandles` when the exchange returns fewer than
/// `minimum_required` candles, and with `Unavailable` when any candle breaks
/// the OHLC ordering or carries a non-positive price.
pub async fn fetch_window(
    exchange: &dyn Exchange,
    config: &ForecastConfig,
) -> Result<Vec<Candle>, Report<MarketDataError>> {
    let mut candles = exchange
        .fetch_candles(&config.symbol, config.timeframe(), config.history_count)
        .await?;

    if candles.len() < config.minimum_required {
        bail!(MarketDataError::TooFewCandles {
            required: config.minimum_required,
            available: candles.len(),
        });
    }

    if let Some(bad) = candles.iter().find(|c| !c.is_consistent()) {
        return Err(Report::new(MarketDataError::Unavailable {
            endpoint: exchange.name().to_owned(),
        })
        .attach(format!("malformed candle at {}", bad.open_time)));
    }

    candles.sort_by_key(|c| c.open_time);
    Ok(candles)
}


#[cfg(test)]
mod tests {
    use super::stub::StubExchange;
    use super::*;
    use crate::indicator::candles_from_closes;

    fn config(history_count: usize, minimum_required: usize) -> ForecastConfig {
        ForecastConfig {
            history_count,
            minimum_required,
            ..ForecastConfig::default()
        }
    }

    #[tokio::test]
    async fn fetch_window_returns_most_recent_candles() {
        let candles = candles_from_closes(&[1.0, 2.0, 3.0, 4.0]);
        let exchange = StubExchange::new(Some(1.0), Some(candles));
        let window = fetch_window(&exchange, &config(3, 3)).await.unwrap();
        let closes: Vec<f64> = window.iter().map(|c| c.close).collect();
        assert_eq!(closes, vec![2.0, 3.0, 4.0]);
    }

    #[tokio::test]
    async fn fetch_window_orders_oldest_first() {
        let mut candles = candles_from_closes(&[1.0, 2.0, 3.0]);
        candles.reverse();
        let exchange = StubExchange::new(Some(1.0), Some(candles));
        let window = fetch_window(&exchange, &config(3, 3)).await.unwrap();
        assert!(window.windows(2).all(|w| w[0].open_time < w[1].open_time));
    }

    #[tokio::test]
    async fn fetch_window_signals_short_history() {
        let exchange = StubExchange::new(Some(1.0), Some(candles_from_closes(&[1.0, 2.0])));
        let err = fetch_window(&exchange, &config(20, 3)).await.unwrap_err();
        assert!(matches!(
            err.current_context(),
            MarketDataError::TooFewCandles {
                required: 3,
                available: 2
            }
        ));
    }

    #[tokio::test]
    async fn fetch_window_rejects_malformed_candle() {
        let mut candles = candles_from_closes(&[1.0, 2.0, 3.0]);
        candles[1].close = -2.0;
        let exchange = StubExchange::new(Some(1.0), Some(candles));
        let err = fetch_window(&exchange, &config(3, 3)).await.unwrap_err();
        assert!(matches!(
            err.current_context(),
            MarketDataError::Unavailable { .. }
        ));
    }

    #[tokio::test]
    async fn fetch_window_propagates_unavailable() {
        let exchange = StubExchange::new(Some(1.0), None);
        let err = fetch_window(&exchange, &config(20, 3)).await.unwrap_err();
        assert!(matches!(
            err.current_context(),
            MarketDataError::Unavailable { .. }
        ));
    }
}
