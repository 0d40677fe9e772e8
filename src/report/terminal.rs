use std::fmt::Write as _;

use crate::report::{ForecastReport, Reporter};

const RULE_WIDTH: usize = 50;
const DISCLAIMER: &str = "Disclaimer: informational only, not trading advice.";

/// Prints the human-readable report to stdout.
pub struct TerminalReporter;

impl Reporter for TerminalReporter {
    fn publish(&self, report: &ForecastReport) {
        print!("{}", render_text(report));
    }
}

/// Render `report` as the multi-line text shown to the operator.
pub fn render_text(report: &ForecastReport) -> String {
    let r = &report.result;
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);
    let span = format!("{}x{}", report.history_count, report.timeframe);
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "{heavy}");
    let _ = writeln!(out, "Price Forecast: {}", report.symbol);
    let _ = writeln!(out, "{heavy}");
    let _ = writeln!(
        out,
        "Time        : {}",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(
        out,
        "Data        : {} {} ({} x {})",
        report.exchange, report.symbol, report.timeframe, report.history_count
    );
    let _ = writeln!(out, "{light}");

    let _ = writeln!(out);
    let _ = writeln!(out, "Live price  : ${}", money(r.current_price));
    let _ = writeln!(
        out,
        "Forecast    : ${}  (+{} x {})",
        money(r.blended_prediction),
        r.horizon,
        report.timeframe
    );
    let _ = writeln!(
        out,
        "Change      : {:+.2} ({:+.3}%)",
        r.change(),
        r.change_pct()
    );

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{} trend (slope: {:.2}/{})",
        r.trend_direction,
        r.trend_slope,
        report.timeframe.unit_label()
    );
    let _ = writeln!(out, "Low  ({span}) : ${}", money(r.window_low));
    let _ = writeln!(out, "High ({span}) : ${}", money(r.window_high));
    let _ = writeln!(
        out,
        "Volatility  : {}",
        r.volatility
            .map(|v| format!("${}", money(v)))
            .unwrap_or_else(|| "n/a".into())
    );
    let momentum = match (r.momentum_index, r.momentum_band()) {
        (Some(index), Some(band)) => format!("{index:.1} ({band})"),
        _ => "n/a".into(),
    };
    let _ = writeln!(out, "Momentum    : {momentum}");

    let _ = writeln!(out);
    let _ = writeln!(out, "Estimators:");
    let _ = writeln!(out, "   SMA    : ${}", money(r.sma));
    let _ = writeln!(out, "   Linear : ${}", money(r.linear_trend));
    let _ = writeln!(out, "   WMA    : ${}", money(r.weighted_ma));
    let vwma = r
        .volume_weighted_ma
        .map(|v| format!("${}", money(v)))
        .unwrap_or_else(|| "n/a".into());
    let _ = writeln!(out, "   VWMA   : {vwma}");

    let _ = writeln!(out);
    let _ = writeln!(out, "{heavy}");
    let _ = writeln!(out, "{DISCLAIMER}");
    let _ = writeln!(out, "{heavy}");
    out
}

/// Two decimals with `,` thousands separators, e.g. `64,123.45`.
fn money(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}
