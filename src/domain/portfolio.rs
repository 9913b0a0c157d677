//! Held basket state during simulation.
//!
//! The portfolio is scratch state: discarded and rebuilt from target
//! weights on every rebalance date, drifted in place on the days between.
//! `BTreeMap` keeps every float accumulation in a fixed symbol order so
//! repeated runs are bit-identical.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Holding {
    pub shares: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Portfolio {
    holdings: BTreeMap<String, Holding>,
}

impl Portfolio {
    /// Build a fresh basket from target weights at today's prices, on a
    /// unit-value basis: `shares = weight / price`. Symbols without a
    /// positive price or weight are skipped.
    pub fn from_weights(weights: &BTreeMap<String, f64>, prices: &BTreeMap<String, f64>) -> Self {
        let mut holdings = BTreeMap::new();
        for (symbol, &weight) in weights {
            let Some(&price) = prices.get(symbol) else {
                continue;
            };
            if weight <= 0.0 || price <= 0.0 {
                continue;
            }
            holdings.insert(
                symbol.clone(),
                Holding {
                    shares: weight / price,
                    weight,
                },
            );
        }
        Self { holdings }
    }

    /// Revalue share counts at today's prices and renormalize each
    /// weight as value / total. No shares are bought or sold.
    pub fn drift(&mut self, prices: &BTreeMap<String, f64>) {
        let mut values: Vec<(String, f64)> = Vec::with_capacity(self.holdings.len());
        let mut total = 0.0;
        for (symbol, holding) in &self.holdings {
            let price = prices.get(symbol).copied().unwrap_or(0.0);
            let value = holding.shares * price;
            values.push((symbol.clone(), value));
            total += value;
        }
        if total <= 0.0 {
            return;
        }
        for (symbol, value) in values {
            if let Some(holding) = self.holdings.get_mut(&symbol) {
                holding.weight = value / total;
            }
        }
    }

    pub fn weight(&self, symbol: &str) -> f64 {
        self.holdings.get(symbol).map_or(0.0, |h| h.weight)
    }

    pub fn weights(&self) -> BTreeMap<String, f64> {
        self.holdings
            .iter()
            .map(|(s, h)| (s.clone(), h.weight))
            .collect()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &String> {
        self.holdings.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.holdings.len()
    }
}
