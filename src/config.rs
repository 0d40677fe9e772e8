use std::path::Path;

use error_stack::{Report, ResultExt};
use serde::Deserialize;

use crate::error::ConfigError;
use crate::forecast::{DEFAULT_HORIZON, DEFAULT_MINIMUM_REQUIRED, ForecastSettings};
use crate::model::TimeFrame;

/// Binance caps `/api/v3/klines` at 1000 rows per request.
pub const MAX_HISTORY_COUNT: usize = 1000;

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "text".into()
}

fn default_base_url() -> String {
    "https://api.binance.com".into()
}

fn default_request_timeout_secs() -> u64 {
    5
}

fn default_requests_per_second() -> u32 {
    10
}

fn default_symbol() -> String {
    "BTCUSDT".into()
}

fn default_candle_interval() -> String {
    "1m".into()
}

fn default_history_count() -> usize {
    20
}

fn default_horizon() -> usize {
    DEFAULT_HORIZON
}

fn default_minimum_required() -> usize {
    DEFAULT_MINIMUM_REQUIRED
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub market: MarketConfig,
    #[serde(default)]
    pub forecast: ForecastConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Accepted values: `"text"` | `"json"`
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MarketConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            requests_per_second: default_requests_per_second(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForecastConfig {
    #[serde(default = "default_symbol")]
    pub symbol: String,
    #[serde(default = "default_candle_interval")]
    pub candle_interval: String,
    /// Number of candles in the window.
    #[serde(default = "default_history_count")]
    pub history_count: usize,
    /// Forecast distance, in candle intervals.
    #[serde(default = "default_horizon")]
    pub horizon: usize,
    #[serde(default = "default_minimum_required")]
    pub minimum_required: usize,
    #[serde(default = "default_true")]
    pub volume_weighted: bool,
    #[serde(default = "default_true")]
    pub momentum: bool,
    #[serde(default = "default_true")]
    pub volatility: bool,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            candle_interval: default_candle_interval(),
            history_count: default_history_count(),
            horizon: default_horizon(),
            minimum_required: default_minimum_required(),
            volume_weighted: true,
            momentum: true,
            volatility: true,
        }
    }
}

impl ForecastConfig {
    /// Parsed candle interval. Falls back to one-minute bars for unvalidated
    /// configs.
    pub fn timeframe(&self) -> TimeFrame {
        TimeFrame::from_str(&self.candle_interval).unwrap_or(TimeFrame::Min1)
    }

    pub fn settings(&self) -> ForecastSettings {
        ForecastSettings {
            horizon: self.horizon,
            minimum_required: self.minimum_required,
            volume_weighted: self.volume_weighted,
            momentum: self.momentum,
            volatility: self.volatility,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ScheduleConfig {
    /// Seconds between runs; `0` runs once and exits.
    #[serde(default)]
    pub interval_secs: u64,
}

/// Load and validate an `AppConfig` from a TOML file at `path`.
pub fn load(path: &Path) -> Result<AppConfig, Report<ConfigError>> {
    let content = std::fs::read_to_string(path)
        .change_context(ConfigError::ReadFile)
        .attach_with(|| format!("path: {}", path.display()))?;

    let config: AppConfig = toml::from_str(&content).change_context(ConfigError::Parse {
        reason: "invalid TOML syntax or schema mismatch".into(),
    })?;

    validate(&config)?;

    Ok(config)
}

pub fn validate(config: &AppConfig) -> Result<(), Report<ConfigError>> {
    validate_general(&config.general)?;
    validate_market(&config.market)?;
    validate_forecast(&config.forecast)?;
    Ok(())
}

fn invalid(field: String) -> Report<ConfigError> {
    Report::new(ConfigError::Validation { field })
}

fn validate_general(general: &GeneralConfig) -> Result<(), Report<ConfigError>> {
    if !matches!(general.log_format.as_str(), "text" | "json") {
        return Err(invalid(format!(
            "general.log_format \"{}\" must be \"text\" or \"json\"",
            general.log_format
        )));
    }
    Ok(())
}

fn validate_market(market: &MarketConfig) -> Result<(), Report<ConfigError>> {
    if market.base_url.trim().is_empty() {
        return Err(invalid("market.base_url must not be empty".into()));
    }
    if market.request_timeout_secs == 0 {
        return Err(invalid("market.request_timeout_secs must be > 0".into()));
    }
    if market.requests_per_second == 0 {
        return Err(invalid("market.requests_per_second must be > 0".into()));
    }
    Ok(())
}

fn validate_forecast(forecast: &ForecastConfig) -> Result<(), Report<ConfigError>> {
    if forecast.symbol.trim().is_empty() {
        return Err(invalid("forecast.symbol must not be empty".into()));
    }
    if TimeFrame::from_str(&forecast.candle_interval).is_none() {
        return Err(invalid(format!(
            "forecast.candle_interval: unknown interval \"{}\"",
            forecast.candle_interval
        )));
    }
    if forecast.minimum_required == 0 {
        return Err(invalid("forecast.minimum_required must be > 0".into()));
    }
    if forecast.history_count < forecast.minimum_required {
        return Err(invalid(format!(
            "forecast.history_count ({}) is below minimum_required ({})",
            forecast.history_count, forecast.minimum_required
        )));
    }
    if forecast.history_count > MAX_HISTORY_COUNT {
        return Err(invalid(format!(
            "forecast.history_count ({}) exceeds {MAX_HISTORY_COUNT}",
            forecast.history_count
        )));
    }
    if forecast.horizon == 0 {
        return Err(invalid("forecast.horizon must be > 0".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> AppConfig {
        toml::from_str(toml).expect("parse failed")
    }

    #[test]
    fn valid_full_config_parses() {
        let toml = r#"
[general]
log_level = "debug"
log_format = "json"

[market]
base_url = "https://api.binance.us"
request_timeout_secs = 3
requests_per_second = 4

[forecast]
symbol = "ETHUSDT"
candle_interval = "5m"
history_count = 50
horizon = 3
minimum_required = 10
volume_weighted = false
momentum = true
volatility = false

[schedule]
interval_secs = 60
"#;
        let config = parse(toml);
        assert!(validate(&config).is_ok());
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.market.base_url, "https://api.binance.us");
        assert_eq!(config.forecast.timeframe(), TimeFrame::Min5);
        assert_eq!(config.schedule.interval_secs, 60);

        let settings = config.forecast.settings();
        assert_eq!(settings.horizon, 3);
        assert_eq!(settings.minimum_required, 10);
        assert!(!settings.volume_weighted);
        assert!(!settings.volatility);
    }

    #[test]
    fn defaults_applied_when_sections_omitted() {
        let config = parse("");
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.log_format, "text");
        assert_eq!(config.market.base_url, "https://api.binance.com");
        assert_eq!(config.market.request_timeout_secs, 5);
        assert_eq!(config.forecast.symbol, "BTCUSDT");
        assert_eq!(config.forecast.candle_interval, "1m");
        assert_eq!(config.forecast.history_count, 20);
        assert_eq!(config.forecast.horizon, 5);
        assert_eq!(config.forecast.minimum_required, 3);
        assert!(config.forecast.momentum);
        assert_eq!(config.schedule.interval_secs, 0);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn default_impl_matches_empty_file() {
        let config = AppConfig::default();
        assert_eq!(config.forecast.settings(), parse("").forecast.settings());
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn unknown_interval_rejected() {
        let config = parse(
            r#"
[forecast]
candle_interval = "2m"
"#,
        );
        assert!(validate(&config).is_err());
    }

    #[test]
    fn history_below_minimum_rejected() {
        let config = parse(
            r#"
[forecast]
history_count = 2
minimum_required = 3
"#,
        );
        assert!(validate(&config).is_err());
    }

    #[test]
    fn history_above_page_size_rejected() {
        let config = parse(
            r#"
[forecast]
history_count = 1500
"#,
        );
        assert!(validate(&config).is_err());
    }

    #[test]
    fn zero_horizon_rejected() {
        let config = parse(
            r#"
[forecast]
horizon = 0
"#,
        );
        assert!(validate(&config).is_err());
    }

    #[test]
    fn zero_minimum_rejected() {
        let config = parse(
            r#"
[forecast]
minimum_required = 0
"#,
        );
        assert!(validate(&config).is_err());
    }

    #[test]
    fn unknown_log_format_rejected() {
        let config = parse(
            r#"
[general]
log_format = "xml"
"#,
        );
        assert!(validate(&config).is_err());
    }

    #[test]
    fn zero_timeout_rejected() {
        let config = parse(
            r#"
[market]
request_timeout_secs = 0
"#,
        );
        assert!(validate(&config).is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = load(Path::new("/nonexistent/price-forecaster.toml")).unwrap_err();
        assert!(matches!(err.current_context(), ConfigError::ReadFile));
    }
}
