//! Report output port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::ChaindexError;

/// Port for writing the finished backtest report.
pub trait ReportPort {
    fn write(&self, result: &BacktestResult, output_path: &str) -> Result<(), ChaindexError>;
}
