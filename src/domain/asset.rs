//! Asset universe registry: candidate tokens and their fixed attributes.
//!
//! Pure reference data. Entries are created at registry load and never
//! mutated by the engine; how the compliance flags are attested is the
//! concern of whoever curates the registry file.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of asset categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetCategory {
    /// The reference asset whose series defines the backtest calendar.
    Benchmark,
    Defi,
    Infrastructure,
    /// Staked-derivative tokens, limited to one position per basket.
    LiquidStaking,
    Stablecoin,
    Meme,
}

impl FromStr for AssetCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "benchmark" => Ok(AssetCategory::Benchmark),
            "defi" => Ok(AssetCategory::Defi),
            "infrastructure" => Ok(AssetCategory::Infrastructure),
            "liquid-staking" | "lst" => Ok(AssetCategory::LiquidStaking),
            "stablecoin" => Ok(AssetCategory::Stablecoin),
            "meme" => Ok(AssetCategory::Meme),
            other => Err(format!("unknown asset category: {other}")),
        }
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssetCategory::Benchmark => "benchmark",
            AssetCategory::Defi => "defi",
            AssetCategory::Infrastructure => "infrastructure",
            AssetCategory::LiquidStaking => "liquid-staking",
            AssetCategory::Stablecoin => "stablecoin",
            AssetCategory::Meme => "meme",
        };
        f.write_str(s)
    }
}

/// Static attributes of one candidate asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetDefinition {
    pub symbol: String,
    pub name: String,
    pub category: AssetCategory,
    /// Token is native to the target chain (not a bridged wrapper).
    pub is_native: bool,
    /// Launched on, or has an economic nexus to, the target chain.
    pub launched_or_nexus: bool,
    /// The target chain is the token's primary network.
    pub primary_network: bool,
    /// An unresolved critical audit finding is on record.
    pub unresolved_audit_finding: bool,
}

/// The candidate registry for one index family.
#[derive(Debug, Clone)]
pub struct Universe {
    assets: Vec<AssetDefinition>,
}

impl Universe {
    pub fn new(assets: Vec<AssetDefinition>) -> Self {
        Self { assets }
    }

    pub fn assets(&self) -> &[AssetDefinition] {
        &self.assets
    }

    pub fn count(&self) -> usize {
        self.assets.len()
    }

    pub fn get(&self, symbol: &str) -> Option<&AssetDefinition> {
        self.assets.iter().find(|a| a.symbol == symbol)
    }

    /// The designated benchmark entry, if the registry carries one.
    pub fn benchmark(&self) -> Option<&AssetDefinition> {
        self.assets
            .iter()
            .find(|a| a.category == AssetCategory::Benchmark)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn asset(symbol: &str, category: AssetCategory) -> AssetDefinition {
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

    #[test]
    fn category_round_trip() {
        for s in [
            "benchmark",
            "defi",
            "infrastructure",
            "liquid-staking",
            "stablecoin",
            "meme",
        ] {
            let cat: AssetCategory = s.parse().unwrap();
            assert_eq!(cat.to_string(), s);
        }
    }

    #[test]
    fn category_accepts_lst_alias() {
        let cat: AssetCategory = "LST".parse().unwrap();
        assert_eq!(cat, AssetCategory::LiquidStaking);
    }

    #[test]
    fn category_rejects_unknown() {
        assert!("equity".parse::<AssetCategory>().is_err());
    }

    #[test]
    fn universe_lookup_and_benchmark() {
        let universe = Universe::new(vec![
            asset("SOL", AssetCategory::Benchmark),
            asset("RAY", AssetCategory::Defi),
        ]);

        assert_eq!(universe.count(), 2);
        assert_eq!(universe.get("RAY").unwrap().symbol, "RAY");
        assert!(universe.get("XYZ").is_none());
        assert_eq!(universe.benchmark().unwrap().symbol, "SOL");
    }

    #[test]
    fn universe_without_benchmark() {
        let universe = Universe::new(vec![asset("RAY", AssetCategory::Defi)]);
        assert!(universe.benchmark().is_none());
    }
}
