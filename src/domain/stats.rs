//! Performance statistics over a NAV or price series.

use serde::{Deserialize, Serialize};

/// Crypto markets trade every calendar day.
const DAYS_PER_YEAR: f64 = 365.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialStats {
    pub cumulative_return: f64,
    pub annualized_return: f64,
    pub annualized_volatility: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
}

impl FinancialStats {
    /// Compute stats from a value series. A series shorter than two
    /// points yields all zeros; that is a defined result, not an error.
    ///
    /// Annualization uses the number of data points, not elapsed
    /// calendar days: `(1 + cumulative)^(365/len) - 1`.
    pub fn from_series(values: &[f64]) -> Self {
        if values.len() < 2 {
            return Self::default();
        }

        let first = values[0];
        let last = values[values.len() - 1];
        let cumulative_return = if first != 0.0 { last / first - 1.0 } else { 0.0 };

        let returns: Vec<f64> = values
            .windows(2)
            .map(|w| if w[0] != 0.0 { w[1] / w[0] - 1.0 } else { 0.0 })
            .collect();

        let n = returns.len() as f64;
        let mean = returns.iter().sum::<f64>() / n;
        let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
        let annualized_volatility = variance.sqrt() * DAYS_PER_YEAR.sqrt();

        let annualized_return =
            (1.0 + cumulative_return).powf(DAYS_PER_YEAR / values.len() as f64) - 1.0;

        // No risk-free fallback: zero volatility means zero Sharpe.
        let sharpe_ratio = if annualized_volatility > 0.0 {
            annualized_return / annualized_volatility
        } else {
            0.0
        };

        // Peak starts at -inf so the first point can never register a
        // drawdown.
        let mut peak = f64::NEG_INFINITY;
        let mut max_drawdown = 0.0_f64;
        for &v in values {
            peak = peak.max(v);
            let dd = v / peak - 1.0;
            if dd < max_drawdown {
                max_drawdown = dd;
            }
        }

        FinancialStats {
            cumulative_return,
            annualized_return,
            annualized_volatility,
            sharpe_ratio,
            max_drawdown,
        }
    }
}
