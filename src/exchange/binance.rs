use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use chrono::DateTime;
use error_stack::{Report, ResultExt};
use futures::future::BoxFuture;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::config::MarketConfig;
use crate::error::MarketDataError;
use crate::exchange::Exchange;
use crate::model::{Candle, TimeFrame};

const TICKER_PRICE_PATH: &str = "/api/v3/ticker/price";
const KLINES_PATH: &str = "/api/v3/klines";
const MAX_CANDLES_PER_REQUEST: usize = 1000;
const FALLBACK_REQUESTS_PER_SECOND: NonZeroU32 = nonzero!(10u32);

pub struct BinanceExchange {
    client: reqwest::Client,
    base_url: String,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
}

impl BinanceExchange {
    pub fn new(config: &MarketConfig) -> Result<Self, Report<MarketDataError>> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .change_context(MarketDataError::Unavailable {
                endpoint: config.base_url.clone(),
            })
            .attach("failed to build HTTP client")?;

        let rps =
            NonZeroU32::new(config.requests_per_second).unwrap_or(FALLBACK_REQUESTS_PER_SECOND);

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            rate_limiter: Arc::new(RateLimiter::direct(Quota::per_second(rps))),
        })
    }

    /// GET `path` and decode the JSON body. Transport failures, non-2xx
    /// statuses and malformed bodies all surface as `Unavailable`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, Report<MarketDataError>> {
        self.rate_limiter.until_ready().await;

        let unavailable = || MarketDataError::Unavailable {
            endpoint: path.to_owned(),
        };
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .change_context_lazy(unavailable)?;

        if !response.status().is_success() {
            return Err(Report::new(unavailable())
                .attach(format!("HTTP status: {}", response.status())));
        }

        response.json().await.change_context_lazy(unavailable)
    }
}

impl Exchange for BinanceExchange {
    fn name(&self) -> &str {
        "binance"
    }

    fn fetch_price(&self, symbol: &str) -> BoxFuture<'_, Result<f64, Report<MarketDataError>>> {
        let symbol = symbol.to_owned();
        Box::pin(async move {
            let ticker: BinanceTickerPrice = self
                .get_json(TICKER_PRICE_PATH, &[("symbol", symbol.as_str())])
                .await?;

            let price = ticker.into_price()?;
            debug!(symbol = %symbol, price, "binance price fetched");
            Ok(price)
        })
    }

    fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: TimeFrame,
        limit: usize,
    ) -> BoxFuture<'_, Result<Vec<Candle>, Report<MarketDataError>>> {
        let symbol = symbol.to_owned();
        Box::pin(async move {
            let limit_str = limit.min(MAX_CANDLES_PER_REQUEST).to_string();
            let params = [
                ("symbol", symbol.as_str()),
                ("interval", timeframe.as_str()),
                ("limit", limit_str.as_str()),
            ];

            let raw: Vec<BinanceKlineRow> = self.get_json(KLINES_PATH, &params).await?;

            info!(
                symbol = %symbol,
                timeframe = %timeframe,
                fetched = raw.len(),
                "binance candle fetch complete"
            );

            raw.into_iter()
                .map(BinanceKlineRow::into_candle)
                .collect::<Result<Vec<_>, _>>()
        })
    }
}

// ── REST response types ───────────────────────────────────────────────────────

/// `{ "symbol": "BTCUSDT", "price": "42000.01000000" }`
#[derive(Debug, Deserialize)]
struct BinanceTickerPrice {
    #[allow(dead_code)]
    symbol: String,
    price: String,
}

impl BinanceTickerPrice {
    fn into_price(self) -> Result<f64, Report<MarketDataError>> {
        let price = parse_f64(&self.price, TICKER_PRICE_PATH)?;
        if !price.is_finite() || price <= 0.0 {
            return Err(Report::new(MarketDataError::Unavailable {
                endpoint: TICKER_PRICE_PATH.into(),
            })
            .attach(format!("non-positive price: {}", self.price)));
        }
        Ok(price)
    }
}

/// Binance kline row: 12-element array
/// [open_time, open, high, low, close, volume, close_time, ...]
#[derive(Debug, Deserialize)]
struct BinanceKlineRow(
    i64,                        // 0: open_time (ms)
    String,                     // 1: open
    String,                     // 2: high
    String,                     // 3: low
    String,                     // 4: close
    String,                     // 5: volume
    #[allow(dead_code)] i64,    // 6: close_time
    #[allow(dead_code)] String, // 7: quote asset volume
    #[allow(dead_code)] i64,    // 8: number of trades
    #[allow(dead_code)] String, // 9: taker buy base volume
    #[allow(dead_code)] String, // 10: taker buy quote volume
    #[allow(dead_code)] String, // 11: ignore
);

impl BinanceKlineRow {
    fn into_candle(self) -> Result<Candle, Report<MarketDataError>> {
        let open_time = DateTime::from_timestamp_millis(self.0).ok_or_else(|| {
            Report::new(MarketDataError::Unavailable {
                endpoint: KLINES_PATH.into(),
            })
            .attach(format!("invalid open_time: {}", self.0))
        })?;

        Ok(Candle {
            open_time,
            open: parse_f64(&self.1, KLINES_PATH)?,
            high: parse_f64(&self.2, KLINES_PATH)?,
            low: parse_f64(&self.3, KLINES_PATH)?,
            close: parse_f64(&self.4, KLINES_PATH)?,
            volume: parse_f64(&self.5, KLINES_PATH)?,
        })
    }
}

fn parse_f64(s: &str, endpoint: &str) -> Result<f64, Report<MarketDataError>> {
    s.parse::<f64>()
        .change_context_lazy(|| MarketDataError::Unavailable {
            endpoint: endpoint.to_owned(),
        })
        .attach_with(|| format!("value: {s:?}"))
}
