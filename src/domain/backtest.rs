//! Backtest orchestration: configuration types, calendar construction,
//! series alignment, simulation, and report assembly.
//!
//! The benchmark asset's series defines the master calendar. Every other
//! asset is projected onto it with carry-forward, so a missing day never
//! aborts a run; only a missing benchmark series does.

use crate::domain::asset::Universe;
use crate::domain::error::ChaindexError;
use crate::domain::screening::{screen, MarketRow};
use crate::domain::series::{align_to_calendar, DailyAssetSeries, DailyBar};
use crate::domain::simulator::{simulate, RebalanceEvent, INDEX_BASIS};
use crate::domain::stats::FinancialStats;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

/// How often the basket is rebuilt, in calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RebalanceCadence {
    Weekly,
    Biweekly,
    Monthly,
}

impl RebalanceCadence {
    pub fn days(self) -> usize {
        match self {
            RebalanceCadence::Weekly => 7,
            RebalanceCadence::Biweekly => 14,
            RebalanceCadence::Monthly => 30,
        }
    }
}

impl FromStr for RebalanceCadence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weekly" => Ok(RebalanceCadence::Weekly),
            "biweekly" => Ok(RebalanceCadence::Biweekly),
            "monthly" => Ok(RebalanceCadence::Monthly),
            other => Err(format!("unknown rebalance cadence: {other}")),
        }
    }
}

/// Trailing evaluation window, measured in calendar entries from the end
/// of the benchmark series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BacktestWindow {
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    Full,
}

impl BacktestWindow {
    /// Number of trailing calendar entries; `None` means the whole series.
    pub fn days(self) -> Option<usize> {
        match self {
            BacktestWindow::OneMonth => Some(30),
            BacktestWindow::ThreeMonths => Some(90),
            BacktestWindow::SixMonths => Some(180),
            BacktestWindow::OneYear => Some(365),
            BacktestWindow::Full => None,
        }
    }
}

impl FromStr for BacktestWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1m" => Ok(BacktestWindow::OneMonth),
            "3m" => Ok(BacktestWindow::ThreeMonths),
            "6m" => Ok(BacktestWindow::SixMonths),
            "1y" => Ok(BacktestWindow::OneYear),
            "all" | "full" => Ok(BacktestWindow::Full),
            other => Err(format!("unknown backtest window: {other}")),
        }
    }
}

/// Evaluation period: a trailing window or an explicit half-open
/// `[start, end)` date pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateRange {
    Trailing(BacktestWindow),
    Explicit { start: NaiveDate, end: NaiveDate },
}

/// Strategy parameters for one run. Validation lives in
/// [`crate::domain::config_validation`]; the orchestrator assumes a
/// validated config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    pub cadence: RebalanceCadence,
    /// Target constituent count.
    pub num_assets: usize,
    /// Per-asset weight cap applied at allocation.
    pub max_weight: f64,
    /// Advisory floor, reported but never enforced.
    pub min_weight: f64,
    pub range: DateRange,
    /// When set, switches the engine to static-allocation mode and the
    /// screening pipeline is bypassed.
    pub fixed_weights: Option<BTreeMap<String, f64>>,
}

/// A dated value series with its performance statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesReport {
    pub dates: Vec<NaiveDate>,
    pub values: Vec<f64>,
    pub stats: FinancialStats,
}

/// Full per-asset history for an asset that ever held weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstituentRecord {
    /// 1-based position in registry order, stable across runs.
    pub id: usize,
    pub symbol: String,
    pub name: String,
    /// Weight on the final simulated date.
    pub current_weight: f64,
    pub dates: Vec<NaiveDate>,
    pub prices: Vec<f64>,
    pub market_caps: Vec<f64>,
    pub weights: Vec<f64>,
    pub stats: FinancialStats,
}

/// Aggregate screening outcome over the whole window, computed from each
/// asset's window-average volume rather than any single rebalance date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniverseStats {
    pub evaluated: usize,
    pub rejected_volume: usize,
    pub rejected_native: usize,
    /// Passed every eligibility rule, whether or not ranked in.
    pub eligible: usize,
    pub selected: usize,
}

/// The complete backtest report. This is the wire contract: serialized
/// verbatim by the report adapter, byte-identical across identical runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub config: BacktestConfig,
    pub benchmark_symbol: String,
    pub index: SeriesReport,
    /// Benchmark price normalized to the index basis for comparison.
    pub benchmark: SeriesReport,
    pub constituents: Vec<ConstituentRecord>,
    pub rebalances: Vec<RebalanceEvent>,
    pub universe_stats: UniverseStats,
}

/// Run a full backtest over the given universe and raw series.
pub fn run_backtest(
    config: &BacktestConfig,
    universe: &Universe,
    series_map: &BTreeMap<String, DailyAssetSeries>,
) -> Result<BacktestResult, ChaindexError> {
    let benchmark = universe.benchmark().ok_or_else(|| ChaindexError::Universe {
        reason: "registry has no benchmark entry".to_string(),
    })?;
    let benchmark_series = series_map
        .get(&benchmark.symbol)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ChaindexError::MissingBenchmark {
            symbol: benchmark.symbol.clone(),
        })?;

    let calendar = build_calendar(benchmark_series, &config.range);
    if calendar.is_empty() {
        return Err(ChaindexError::Data {
            reason: "no benchmark dates fall inside the configured range".to_string(),
        });
    }

    // Assets without any series simply never enter the aligned map and
    // screen out as volume failures with the missing-data flag set.
    let mut aligned: BTreeMap<String, Vec<DailyBar>> = BTreeMap::new();
    for asset in universe.assets() {
        if let Some(series) = series_map.get(&asset.symbol) {
            if let Some(bars) = align_to_calendar(series, &calendar) {
                aligned.insert(asset.symbol.clone(), bars);
            }
        }
    }

    let output = simulate(universe, &calendar, &aligned, config);

    let index = SeriesReport {
        dates: calendar.clone(),
        values: output.nav.clone(),
        stats: FinancialStats::from_series(&output.nav),
    };

    let benchmark_values = normalize_to_basis(
        &aligned[&benchmark.symbol]
            .iter()
            .map(|b| b.price)
            .collect::<Vec<f64>>(),
    );
    let benchmark_report = SeriesReport {
        stats: FinancialStats::from_series(&benchmark_values),
        dates: calendar.clone(),
        values: benchmark_values,
    };

    let constituents = build_constituents(universe, &calendar, &aligned, &output.weight_history);
    let universe_stats = build_universe_stats(universe, &aligned, config.num_assets);

    Ok(BacktestResult {
        config: config.clone(),
        benchmark_symbol: benchmark.symbol.clone(),
        index,
        benchmark: benchmark_report,
        constituents,
        rebalances: output.rebalances,
        universe_stats,
    })
}

fn build_calendar(benchmark: &DailyAssetSeries, range: &DateRange) -> Vec<NaiveDate> {
    let dates: Vec<NaiveDate> = benchmark.bars.iter().map(|b| b.date).collect();
    match range {
        DateRange::Trailing(window) => match window.days() {
            Some(days) if days < dates.len() => dates[dates.len() - days..].to_vec(),
            _ => dates,
        },
        DateRange::Explicit { start, end } => dates
            .into_iter()
            .filter(|d| d >= start && d < end)
            .collect(),
    }
}

fn normalize_to_basis(prices: &[f64]) -> Vec<f64> {
    match prices.first() {
        Some(&first) if first > 0.0 => prices.iter().map(|p| p / first * INDEX_BASIS).collect(),
        _ => prices.to_vec(),
    }
}

/// One record per asset that ever held non-zero weight, in registry order.
fn build_constituents(
    universe: &Universe,
    calendar: &[NaiveDate],
    aligned: &BTreeMap<String, Vec<DailyBar>>,
    weight_history: &BTreeMap<String, Vec<f64>>,
) -> Vec<ConstituentRecord> {
    let mut records = Vec::new();
    for (idx, asset) in universe.assets().iter().enumerate() {
        let Some(weights) = weight_history.get(&asset.symbol) else {
            continue;
        };
        if !weights.iter().any(|w| *w != 0.0) {
            continue;
        }
        let bars = &aligned[&asset.symbol];
        let prices: Vec<f64> = bars.iter().map(|b| b.price).collect();
        records.push(ConstituentRecord {
            id: idx + 1,
            symbol: asset.symbol.clone(),
            name: asset.name.clone(),
            current_weight: weights.last().copied().unwrap_or(0.0),
            dates: calendar.to_vec(),
            stats: FinancialStats::from_series(&prices),
            market_caps: bars.iter().map(|b| b.market_cap).collect(),
            weights: weights.clone(),
            prices,
        });
    }
    records
}

/// Aggregate counts from one screening pass over whole-window averages.
/// Deliberately independent of any single rebalance date.
fn build_universe_stats(
    universe: &Universe,
    aligned: &BTreeMap<String, Vec<DailyBar>>,
    num_assets: usize,
) -> UniverseStats {
    let market: HashMap<String, MarketRow> = aligned
        .iter()
        .filter(|(_, bars)| !bars.is_empty())
        .map(|(symbol, bars)| {
            let avg_volume = bars.iter().map(|b| b.volume).sum::<f64>() / bars.len() as f64;
            let last = &bars[bars.len() - 1];
            (
                symbol.clone(),
                MarketRow {
                    price: last.price,
                    market_cap: last.market_cap,
                    avg_volume,
                },
            )
        })
        .collect();

    let items = screen(universe.assets(), &market, num_assets);

    use crate::domain::screening::AssetStatus;
    let mut stats = UniverseStats {
        evaluated: items.len(),
        rejected_volume: 0,
        rejected_native: 0,
        eligible: 0,
        selected: 0,
    };
    for item in &items {
        match item.status {
            AssetStatus::FailedVolumeCriterion => stats.rejected_volume += 1,
            AssetStatus::NotNative => stats.rejected_native += 1,
            AssetStatus::Included => {
                stats.eligible += 1;
                stats.selected += 1;
            }
            AssetStatus::OutsideRank => stats.eligible += 1,
            _ => {}
        }
    }
    stats
}
