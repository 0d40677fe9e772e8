use crate::report::{ForecastReport, Reporter};

/// Writes each report to stdout as one JSON document per line.
pub struct JsonReporter;

impl Reporter for JsonReporter {
    fn publish(&self, report: &ForecastReport) {
        match serde_json::to_string(report) {
            Ok(line) => println!("{line}"),
            Err(e) => {
                tracing::warn!(error = %e, symbol = %report.symbol, "report serialization failed")
            }
        }
    }
}
