//! Target weight construction.
//!
//! Dynamic mode caps market-cap weights with a single-pass surplus
//! redistribution; fixed mode passes a caller map through verbatim.

use std::collections::BTreeMap;

/// Market-cap-proportional weights with a per-asset cap.
///
/// Raw weight = mcap / Σ mcap. Weights above `max_weight` are clipped and
/// the combined surplus is split **equally** across the uncapped assets in
/// one pass. An asset pushed over the cap by the redistribution itself is
/// not re-clipped; this single-iteration policy is intentional and must
/// not be replaced with iterative water-filling, because historical audit
/// numbers depend on it. With no uncapped assets the surplus is dropped
/// and the result sums below one.
pub fn market_cap_weights(market_caps: &BTreeMap<String, f64>, max_weight: f64) -> BTreeMap<String, f64> {
    let total: f64 = market_caps.values().sum();
    if total <= 0.0 {
        return BTreeMap::new();
    }

    let mut weights: BTreeMap<String, f64> = market_caps
        .iter()
        .map(|(symbol, mcap)| (symbol.clone(), mcap / total))
        .collect();

    let mut surplus = 0.0;
    let mut uncapped: Vec<String> = Vec::new();
    for (symbol, weight) in weights.iter_mut() {
        if *weight > max_weight {
            surplus += *weight - max_weight;
            *weight = max_weight;
        } else {
            uncapped.push(symbol.clone());
        }
    }

    if surplus > 0.0 && !uncapped.is_empty() {
        let bonus = surplus / uncapped.len() as f64;
        for symbol in &uncapped {
            if let Some(weight) = weights.get_mut(symbol) {
                *weight += bonus;
            }
        }
    }

    weights
}

/// Fixed mode: the caller-supplied map is the target, taken verbatim.
/// It is assumed to already sum to ≈1 and is neither re-normalized nor
/// capped.
pub fn fixed_weights(map: &BTreeMap<String, f64>) -> BTreeMap<String, f64> {
    map.clone()
}
