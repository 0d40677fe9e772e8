mod config;
mod error;
mod exchange;
mod forecast;
mod indicator;
mod model;
mod pipeline;
mod report;

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use derive_more::{Display, Error};
use error_stack::{Report, ResultExt};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::AppConfig;
use exchange::binance::BinanceExchange;
use report::Reporter;
use report::json::JsonReporter;
use report::terminal::TerminalReporter;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Display, Error)]
pub enum AppError {
    #[display("configuration error")]
    Config,
    #[display("market data error")]
    MarketData,
    #[display("forecast run failed")]
    Forecast,
}

#[derive(Parser)]
#[command(
    name = "price-forecaster",
    about = "Short-horizon price forecast from recent candles"
)]
struct Cli {
    /// Path to the TOML configuration file. Built-in defaults are used when
    /// the default path does not exist.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Run a single forecast even if a schedule is configured
    #[arg(long)]
    once: bool,
    /// Print reports as JSON instead of text
    #[arg(long)]
    json: bool,
    /// Override `forecast.symbol`
    #[arg(long)]
    symbol: Option<String>,
    /// Override `forecast.horizon`
    #[arg(long)]
    horizon: Option<usize>,
}

#[tokio::main]
async fn main() {
    if let Err(report) = run().await {
        eprintln!("{report:?}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Report<AppError>> {
    let cli = Cli::parse();
    let (mut config, from_file) = load_config(&cli.config)?;

    if let Some(symbol) = cli.symbol {
        config.forecast.symbol = symbol;
    }
    if let Some(horizon) = cli.horizon {
        config.forecast.horizon = horizon;
    }
    config::validate(&config).change_context(AppError::Config)?;

    init_tracing(&config);
    if !from_file {
        info!(path = %cli.config.display(), "config file not found, using defaults");
    }

    let exchange = BinanceExchange::new(&config.market).change_context(AppError::MarketData)?;
    let reporter: Box<dyn Reporter> = if cli.json {
        Box::new(JsonReporter)
    } else {
        Box::new(TerminalReporter)
    };

    let forecast_config = &config.forecast;
    let interval_secs = config.schedule.interval_secs;

    if cli.once || interval_secs == 0 {
        let report = pipeline::run_once(&exchange, forecast_config)
            .await
            .change_context(AppError::Forecast)?;
        reporter.publish(&report);
        return Ok(());
    }

    // ── Scheduled runs ────────────────────────────────────────────────────────
    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl+c");
            return;
        }
        info!("ctrl+c received, shutting down");
        ctrl_c_cancel.cancel();
    });

    pipeline::run_scheduled(
        &exchange,
        forecast_config,
        reporter.as_ref(),
        Duration::from_secs(interval_secs),
        cancel,
    )
    .await;

    info!("shutdown complete");
    Ok(())
}

/// Load the config file, or fall back to defaults when the default path is
/// missing. Returns whether the config came from a file.
fn load_config(path: &Path) -> Result<(AppConfig, bool), Report<AppError>> {
    if path == Path::new(DEFAULT_CONFIG_PATH) && !path.exists() {
        return Ok((AppConfig::default(), false));
    }
    let config = config::load(path).change_context(AppError::Config)?;
    Ok((config, true))
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::new(&config.general.log_level);
    // Logs go to stderr so stdout carries only the reports.
    match config.general.log_format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
