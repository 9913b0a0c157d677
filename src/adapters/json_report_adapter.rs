//! JSON report adapter: serializes the backtest result verbatim.
//!
//! The emitted document is the wire contract. All collections inside
//! `BacktestResult` iterate in a fixed order, so two runs over identical
//! inputs produce byte-identical files.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::ChaindexError;
use crate::ports::report_port::ReportPort;
use std::fs;

pub struct JsonReportAdapter;

impl ReportPort for JsonReportAdapter {
    fn write(&self, result: &BacktestResult, output_path: &str) -> Result<(), ChaindexError> {
        let mut json =
            serde_json::to_string_pretty(result).map_err(|e| ChaindexError::Report {
                reason: format!("serialization failed: {e}"),
            })?;
        json.push('\n');
        fs::write(output_path, json)?;
        Ok(())
    }
}
