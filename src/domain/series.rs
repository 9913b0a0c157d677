//! Daily per-asset series and calendar alignment.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One calendar day of market data for a single asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub price: f64,
    pub market_cap: f64,
    pub volume: f64,
}

/// Ordered daily history for one asset: strictly increasing dates,
/// no duplicates. Owned by the data-acquisition side; the engine only
/// reads it.
#[derive(Debug, Clone)]
pub struct DailyAssetSeries {
    pub symbol: String,
    pub bars: Vec<DailyBar>,
    date_index: HashMap<NaiveDate, usize>,
}

impl DailyAssetSeries {
    /// Build a series. Bars are sorted by date; later duplicates of the
    /// same date replace earlier ones.
    pub fn new(symbol: String, mut bars: Vec<DailyBar>) -> Self {
        bars.sort_by_key(|b| b.date);
        bars.dedup_by(|later, earlier| {
            if later.date == earlier.date {
                *earlier = later.clone();
                true
            } else {
                false
            }
        });
        let date_index = bars
            .iter()
            .enumerate()
            .map(|(i, bar)| (bar.date, i))
            .collect();
        Self {
            symbol,
            bars,
            date_index,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn get_bar(&self, date: NaiveDate) -> Option<&DailyBar> {
        self.date_index.get(&date).map(|&i| &self.bars[i])
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }
}

/// Project a series onto a master calendar: a single-pass left join with
/// carry-forward. Dates missing from the series reuse the last known bar;
/// a leading gap is seeded with the asset's first known bar. Returns one
/// bar per calendar date, `None` when the series is empty.
pub fn align_to_calendar(series: &DailyAssetSeries, calendar: &[NaiveDate]) -> Option<Vec<DailyBar>> {
    let first = series.bars.first()?;
    let mut out = Vec::with_capacity(calendar.len());
    let mut cursor = 0usize;
    let mut carried = first;

    for &date in calendar {
        while cursor < series.bars.len() && series.bars[cursor].date <= date {
            carried = &series.bars[cursor];
            cursor += 1;
        }
        out.push(DailyBar {
            date,
            price: carried.price,
            market_cap: carried.market_cap,
            volume: carried.volume,
        });
    }

    Some(out)
}
