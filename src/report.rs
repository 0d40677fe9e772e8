pub mod json;
pub mod terminal;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::forecast::ForecastResult;
use crate::model::TimeFrame;

/// A forecast together with the run parameters it was produced under.
#[derive(Debug, Clone, Serialize)]
pub struct ForecastReport {
    pub symbol: String,
    pub exchange: String,
    pub timeframe: TimeFrame,
    pub history_count: usize,
    pub generated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub result: ForecastResult,
}

/// Sink for finished forecasts.
pub trait Reporter: Send + Sync {
    fn publish(&self, report: &ForecastReport);
}

#[cfg(test)]
pub(crate) fn sample_report() -> ForecastReport {
    use chrono::TimeZone;

    use crate::forecast::{ForecastSettings, forecast};
    use crate::indicator::candles_from_closes;

    let candles = candles_from_closes(&[100.0, 101.0, 102.0, 103.0, 104.0]);
    let result = forecast(&candles, 104.5, &ForecastSettings::default()).unwrap();
    ForecastReport {
        symbol: "BTCUSDT".into(),
        exchange: "binance".into(),
        timeframe: TimeFrame::Min1,
        history_count: 5,
        generated_at: Utc.with_ymd_and_hms(2024, 1, 1, 12, 30, 0).unwrap(),
        result,
    }
}
