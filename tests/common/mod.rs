#![allow(dead_code)]

use chaindex::domain::asset::{AssetCategory, AssetDefinition, Universe};
use chaindex::domain::backtest::{BacktestConfig, BacktestWindow, DateRange, RebalanceCadence};
use chaindex::domain::error::ChaindexError;
pub use chaindex::domain::series::{DailyAssetSeries, DailyBar};
use chaindex::ports::series_port::SeriesPort;
use chrono::NaiveDate;
use std::collections::BTreeMap;

pub struct MockSeriesPort {
    pub data: BTreeMap<String, Vec<DailyBar>>,
    pub errors: BTreeMap<String, String>,
}

impl MockSeriesPort {
    pub fn new() -> Self {
        Self {
            data: BTreeMap::new(),
            errors: BTreeMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<DailyBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl SeriesPort for MockSeriesPort {
    fn fetch_series(&self, symbol: &str) -> Result<DailyAssetSeries, ChaindexError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(ChaindexError::Data {
                reason: reason.clone(),
            });
        }
        match self.data.get(symbol) {
            Some(bars) => Ok(DailyAssetSeries::new(symbol.to_string(), bars.clone())),
            None => Err(ChaindexError::NoData {
                symbol: symbol.to_string(),
            }),
        }
    }

    fn list_symbols(&self) -> Result<Vec<String>, ChaindexError> {
        Ok(self.data.keys().cloned().collect())
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, ChaindexError> {
        match self.data.get(symbol) {
            Some(bars) if !bars.is_empty() => {
                let min = bars.iter().map(|b| b.date).min().unwrap();
                let max = bars.iter().map(|b| b.date).max().unwrap();
                Ok(Some((min, max, bars.len())))
            }
            _ => Ok(None),
        }
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(day: NaiveDate, price: f64, market_cap: f64) -> DailyBar {
    DailyBar {
        date: day,
        price,
        market_cap,
        volume: 1_000_000.0,
    }
}

/// `days` flat bars starting at 2024-01-01.
pub fn flat_series(days: usize, price: f64, market_cap: f64) -> Vec<DailyBar> {
    (0..days)
        .map(|i| make_bar(date(2024, 1, 1) + chrono::Duration::days(i as i64), price, market_cap))
        .collect()
}

/// `prices[i]` becomes the bar for day `i`; market cap scales with price.
pub fn priced_series(prices: &[f64], base_market_cap: f64) -> Vec<DailyBar> {
    prices
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            make_bar(
                date(2024, 1, 1) + chrono::Duration::days(i as i64),
                p,
                base_market_cap * p / prices[0],
            )
        })
        .collect()
}

pub fn make_asset(symbol: &str, category: AssetCategory) -> AssetDefinition {
    AssetDefinition {
        symbol: symbol.to_string(),
        name: symbol.to_string(),
        category,
        is_native: true,
        launched_or_nexus: true,
        primary_network: true,
        unresolved_audit_finding: false,
    }
}

/// Benchmark plus three ordinary defi/infra tokens.
pub fn sample_universe() -> Universe {
    Universe::new(vec![
        make_asset("SOL", AssetCategory::Benchmark),
        make_asset("RAY", AssetCategory::Defi),
        make_asset("JTO", AssetCategory::Infrastructure),
        make_asset("ORCA", AssetCategory::Defi),
    ])
}

pub fn sample_config() -> BacktestConfig {
    BacktestConfig {
        cadence: RebalanceCadence::Weekly,
        num_assets: 3,
        max_weight: 0.5,
        min_weight: 0.0,
        range: DateRange::Trailing(BacktestWindow::Full),
        fixed_weights: None,
    }
}

/// Fetch every universe symbol through the port, dropping NoData symbols
/// the same way the CLI does.
pub fn load_series_map(
    port: &dyn SeriesPort,
    universe: &Universe,
) -> BTreeMap<String, DailyAssetSeries> {
    let mut map = BTreeMap::new();
    for asset in universe.assets() {
        if let Ok(series) = port.fetch_series(&asset.symbol) {
            map.insert(asset.symbol.clone(), series);
        }
    }
    map
}
