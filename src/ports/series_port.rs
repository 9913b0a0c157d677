//! Daily series access port trait.

use crate::domain::error::ChaindexError;
use crate::domain::series::DailyAssetSeries;
use chrono::NaiveDate;

pub trait SeriesPort {
    fn fetch_series(&self, symbol: &str) -> Result<DailyAssetSeries, ChaindexError>;

    fn list_symbols(&self) -> Result<Vec<String>, ChaindexError>;

    /// First date, last date and bar count for one symbol; `None` when no
    /// data exists.
    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, ChaindexError>;
}
