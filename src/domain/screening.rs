//! Universe screening: classify every candidate for one evaluation date.
//!
//! Criteria run in strict priority order and the first failing rule
//! determines the rejection status, so every audit record traces to
//! exactly one rule.

use crate::domain::asset::{AssetCategory, AssetDefinition};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Minimum trailing average daily volume, in USD.
pub const MIN_AVG_DAILY_VOLUME_USD: f64 = 200_000.0;

/// Screening outcome for one asset on one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetStatus {
    Included,
    /// Stablecoin or benchmark category, or a surplus liquid-staking
    /// token demoted by the one-LST rule.
    ExcludedCategory,
    FailedLaunchCriterion,
    FailedPrimaryNetwork,
    NotNative,
    FailedVolumeCriterion,
    FailedAuditCriterion,
    /// Passed every rule but ranked below the target constituent count.
    OutsideRank,
}

impl AssetStatus {
    pub fn is_included(self) -> bool {
        self == AssetStatus::Included
    }
}

/// Market inputs for one asset on the evaluation date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketRow {
    pub price: f64,
    pub market_cap: f64,
    /// Trailing 30-day (or available-window) average daily volume.
    pub avg_volume: f64,
}

/// Per-asset screening record for one evaluation date. Produced fresh at
/// each rebalance and archived as-is; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotItem {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub market_cap: f64,
    pub avg_volume: f64,
    pub is_native: bool,
    pub status: AssetStatus,
    /// Assigned portfolio weight; 0 for anything rejected.
    pub weight: f64,
    /// No market data was available for this asset at all.
    pub missing_data: bool,
}

/// First failing rule wins; `None` market data fails the volume rule.
fn base_status(asset: &AssetDefinition, market: Option<&MarketRow>) -> AssetStatus {
    let excluded_category = matches!(
        asset.category,
        AssetCategory::Stablecoin | AssetCategory::Benchmark
    );
    let below_volume = market.is_none_or(|m| m.avg_volume < MIN_AVG_DAILY_VOLUME_USD);

    let rules = [
        (excluded_category, AssetStatus::ExcludedCategory),
        (!asset.launched_or_nexus, AssetStatus::FailedLaunchCriterion),
        (!asset.primary_network, AssetStatus::FailedPrimaryNetwork),
        (!asset.is_native, AssetStatus::NotNative),
        (below_volume, AssetStatus::FailedVolumeCriterion),
        (
            asset.unresolved_audit_finding,
            AssetStatus::FailedAuditCriterion,
        ),
    ];

    rules
        .iter()
        .find(|(failed, _)| *failed)
        .map(|&(_, status)| status)
        .unwrap_or(AssetStatus::Included)
}

/// Screen every asset for one evaluation date. Returns one item per
/// asset in registry order, with at most `num_assets` marked Included.
/// Weights are assigned later by the allocation step.
pub fn screen(
    assets: &[AssetDefinition],
    market: &HashMap<String, MarketRow>,
    num_assets: usize,
) -> Vec<SnapshotItem> {
    let mut items: Vec<SnapshotItem> = assets
        .iter()
        .map(|asset| {
            let row = market.get(&asset.symbol);
            SnapshotItem {
                symbol: asset.symbol.clone(),
                name: asset.name.clone(),
                price: row.map_or(0.0, |m| m.price),
                market_cap: row.map_or(0.0, |m| m.market_cap),
                avg_volume: row.map_or(0.0, |m| m.avg_volume),
                is_native: asset.is_native,
                status: base_status(asset, row),
                weight: 0.0,
                missing_data: row.is_none(),
            }
        })
        .collect();

    enforce_single_lst(assets, &mut items);
    enforce_rank(&mut items, num_assets);

    items
}

/// At most one liquid-staking token stays included: keep the highest
/// market cap, demote the rest. Runs after the base rules, so an LST
/// can be rejected here despite passing everything else.
fn enforce_single_lst(assets: &[AssetDefinition], items: &mut [SnapshotItem]) {
    let best = items
        .iter()
        .zip(assets)
        .filter(|(item, asset)| {
            item.status.is_included() && asset.category == AssetCategory::LiquidStaking
        })
        .max_by(|(a, _), (b, _)| a.market_cap.total_cmp(&b.market_cap))
        .map(|(item, _)| item.symbol.clone());

    let Some(best) = best else { return };

    for (item, asset) in items.iter_mut().zip(assets) {
        if item.status.is_included()
            && asset.category == AssetCategory::LiquidStaking
            && item.symbol != best
        {
            item.status = AssetStatus::ExcludedCategory;
        }
    }
}

/// Keep the top `num_assets` included items by market cap (symbol breaks
/// ties) and demote the remainder to OutsideRank.
fn enforce_rank(items: &mut [SnapshotItem], num_assets: usize) {
    let mut ranked: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.status.is_included())
        .map(|(i, _)| i)
        .collect();

    ranked.sort_by(|&a, &b| {
        items[b]
            .market_cap
            .total_cmp(&items[a].market_cap)
            .then_with(|| items[a].symbol.cmp(&items[b].symbol))
    });

    for &idx in ranked.iter().skip(num_assets) {
        items[idx].status = AssetStatus::OutsideRank;
    }
}
