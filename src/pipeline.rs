use std::time::Duration;

use chrono::Utc;
use error_stack::{Report, ResultExt};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ForecastConfig;
use crate::error::{MarketDataError, RunError};
use crate::exchange::{Exchange, fetch_window};
use crate::forecast::forecast;
use crate::report::{ForecastReport, Reporter};

/// Fetch the live price and the candle window, then run the forecast engine.
///
/// An unavailable price skips the candle request entirely. Either a complete
/// report comes back or nothing does.
pub async fn run_once(
    exchange: &dyn Exchange,
    config: &ForecastConfig,
) -> Result<ForecastReport, Report<RunError>> {
    let current_price = exchange
        .fetch_price(&config.symbol)
        .await
        .change_context(RunError::DataUnavailable)?;

    let window = fetch_window(exchange, config).await.map_err(|report| {
        let context = match report.current_context() {
            MarketDataError::TooFewCandles { .. } => RunError::InsufficientData,
            MarketDataError::Unavailable { .. } => RunError::DataUnavailable,
        };
        report.change_context(context)
    })?;

    debug!(
        symbol = %config.symbol,
        samples = window.len(),
        current_price,
        "running forecast"
    );

    let result = forecast(&window, current_price, &config.settings())
        .change_context(RunError::InsufficientData)?;

    info!(
        symbol = %config.symbol,
        prediction = result.blended_prediction,
        direction = %result.trend_direction,
        "forecast complete"
    );

    Ok(ForecastReport {
        symbol: config.symbol.clone(),
        exchange: exchange.name().to_owned(),
        timeframe: config.timeframe(),
        history_count: config.history_count,
        generated_at: Utc::now(),
        result,
    })
}

/// Run a forecast every `every` until `cancel` fires.
///
/// The first run starts immediately. A failed run is logged and the loop
/// carries on with the next tick.
pub async fn run_scheduled(
    exchange: &dyn Exchange,
    config: &ForecastConfig,
    reporter: &dyn Reporter,
    every: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(symbol = %config.symbol, interval = ?every, "scheduled forecasting started");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("scheduler cancelled");
                break;
            }
            _ = ticker.tick() => {
                match run_once(exchange, config).await {
                    Ok(report) => reporter.publish(&report),
                    Err(e) => warn!(error = ?e, "forecast run failed (continuing)"),
                }
            }
        }
    }
}
