//! Time-stepped index simulation over an aligned calendar.
//!
//! The walk is strictly sequential. Each day the index level is updated
//! from the *previous* day's closing weights and today's returns, so a
//! rebalance never sees its own day's gains (no look-ahead). Rebalance
//! days then rebuild the basket; the days between let it drift.

use crate::domain::allocation;
use crate::domain::asset::Universe;
use crate::domain::backtest::BacktestConfig;
use crate::domain::portfolio::Portfolio;
use crate::domain::screening::{screen, AssetStatus, MarketRow, SnapshotItem};
use crate::domain::series::DailyBar;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Index level on the first simulated date.
pub const INDEX_BASIS: f64 = 100.0;

/// Trailing window for average daily volume at screening time.
pub const VOLUME_WINDOW_DAYS: usize = 30;

/// One rebalance date's audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebalanceEvent {
    pub date: NaiveDate,
    pub snapshot: Vec<SnapshotItem>,
    /// Combined market cap of the selected constituents.
    pub total_market_cap: f64,
    /// Half the L1 distance between this target and the previous one;
    /// 0.5 at the first event (the whole basket is bought).
    pub turnover: f64,
}

impl RebalanceEvent {
    pub fn included(&self) -> impl Iterator<Item = &SnapshotItem> {
        self.snapshot.iter().filter(|i| i.status.is_included())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOutput {
    /// Index NAV, basis 100, one entry per calendar date.
    pub nav: Vec<f64>,
    /// End-of-day weight per tracked symbol, zero when not held.
    pub weight_history: BTreeMap<String, Vec<f64>>,
    pub rebalances: Vec<RebalanceEvent>,
}

/// Walk the calendar. `aligned` must hold one bar per calendar date for
/// every tracked symbol (see [`crate::domain::series::align_to_calendar`]).
pub fn simulate(
    universe: &Universe,
    calendar: &[NaiveDate],
    aligned: &BTreeMap<String, Vec<DailyBar>>,
    config: &BacktestConfig,
) -> SimulationOutput {
    let cadence_days = config.cadence.days();
    let mut nav: Vec<f64> = Vec::with_capacity(calendar.len());
    let mut weight_history: BTreeMap<String, Vec<f64>> = aligned
        .keys()
        .map(|s| (s.clone(), vec![0.0; calendar.len()]))
        .collect();
    let mut rebalances: Vec<RebalanceEvent> = Vec::new();
    let mut portfolio = Portfolio::default();
    let mut prev_target: BTreeMap<String, f64> = BTreeMap::new();

    for (d, &date) in calendar.iter().enumerate() {
        // Index update first, from yesterday's closing weights.
        if d == 0 {
            nav.push(INDEX_BASIS);
        } else {
            let mut day_return = 0.0;
            for (symbol, history) in &weight_history {
                let w = history[d - 1];
                if w == 0.0 {
                    continue;
                }
                let bars = &aligned[symbol];
                let prev_price = bars[d - 1].price;
                if prev_price > 0.0 {
                    day_return += w * (bars[d].price / prev_price - 1.0);
                }
            }
            nav.push(nav[d - 1] * (1.0 + day_return));
        }

        match &config.fixed_weights {
            Some(map) => {
                // Static-allocation mode: the target is set once and the
                // simulator holds weights constant day over day, an
                // implicit daily rebalance back to target. No drift.
                if d == 0 {
                    let weights = allocation::fixed_weights(map);
                    portfolio = Portfolio::from_weights(&weights, &prices_at(aligned, d));
                    rebalances.push(fixed_rebalance_event(universe, date, map, aligned, d));
                    prev_target = weights;
                }
                for (symbol, history) in weight_history.iter_mut() {
                    history[d] = map.get(symbol).copied().unwrap_or(0.0);
                }
            }
            None => {
                if d % cadence_days == 0 {
                    let market = market_rows(aligned, d);
                    let mut items = screen(universe.assets(), &market, config.num_assets);

                    let included_caps: BTreeMap<String, f64> = items
                        .iter()
                        .filter(|i| i.status.is_included())
                        .map(|i| (i.symbol.clone(), i.market_cap))
                        .collect();
                    let weights =
                        allocation::market_cap_weights(&included_caps, config.max_weight);
                    for item in items.iter_mut() {
                        item.weight = weights.get(&item.symbol).copied().unwrap_or(0.0);
                    }

                    portfolio = Portfolio::from_weights(&weights, &prices_at(aligned, d));

                    rebalances.push(RebalanceEvent {
                        date,
                        snapshot: items,
                        total_market_cap: included_caps.values().sum(),
                        turnover: half_l1_turnover(&prev_target, &weights),
                    });
                    prev_target = weights;
                } else {
                    portfolio.drift(&prices_at(aligned, d));
                }
                for (symbol, history) in weight_history.iter_mut() {
                    history[d] = portfolio.weight(symbol);
                }
            }
        }
    }

    SimulationOutput {
        nav,
        weight_history,
        rebalances,
    }
}

fn prices_at(aligned: &BTreeMap<String, Vec<DailyBar>>, day: usize) -> BTreeMap<String, f64> {
    aligned
        .iter()
        .map(|(symbol, bars)| (symbol.clone(), bars[day].price))
        .collect()
}

/// Screening inputs for one day: spot price and market cap plus the
/// trailing 30-day (or available-window) average volume.
fn market_rows(aligned: &BTreeMap<String, Vec<DailyBar>>, day: usize) -> HashMap<String, MarketRow> {
    aligned
        .iter()
        .map(|(symbol, bars)| {
            let start = (day + 1).saturating_sub(VOLUME_WINDOW_DAYS);
            let window = &bars[start..=day];
            let avg_volume =
                window.iter().map(|b| b.volume).sum::<f64>() / window.len() as f64;
            (
                symbol.clone(),
                MarketRow {
                    price: bars[day].price,
                    market_cap: bars[day].market_cap,
                    avg_volume,
                },
            )
        })
        .collect()
}

fn half_l1_turnover(prev: &BTreeMap<String, f64>, next: &BTreeMap<String, f64>) -> f64 {
    let symbols: std::collections::BTreeSet<&String> = prev.keys().chain(next.keys()).collect();
    let l1: f64 = symbols
        .into_iter()
        .map(|s| {
            let a = prev.get(s).copied().unwrap_or(0.0);
            let b = next.get(s).copied().unwrap_or(0.0);
            (b - a).abs()
        })
        .sum();
    l1 / 2.0
}

/// Snapshot for the single static-allocation event: the fixed symbols are
/// recorded as included at their target weights.
fn fixed_rebalance_event(
    universe: &Universe,
    date: NaiveDate,
    map: &BTreeMap<String, f64>,
    aligned: &BTreeMap<String, Vec<DailyBar>>,
    day: usize,
) -> RebalanceEvent {
    let mut snapshot = Vec::with_capacity(map.len());
    let mut total_market_cap = 0.0;
    for (symbol, &weight) in map {
        let bar = aligned.get(symbol).map(|bars| &bars[day]);
        let market_cap = bar.map_or(0.0, |b| b.market_cap);
        total_market_cap += market_cap;
        snapshot.push(SnapshotItem {
            symbol: symbol.clone(),
            name: universe
                .get(symbol)
                .map_or_else(|| symbol.clone(), |a| a.name.clone()),
            price: bar.map_or(0.0, |b| b.price),
            market_cap,
            avg_volume: bar.map_or(0.0, |b| b.volume),
            is_native: universe.get(symbol).is_some_and(|a| a.is_native),
            status: AssetStatus::Included,
            weight,
            missing_data: bar.is_none(),
        });
    }
    RebalanceEvent {
        date,
        snapshot,
        total_market_cap,
        turnover: map.values().map(|w| w.abs()).sum::<f64>() / 2.0,
    }
}
