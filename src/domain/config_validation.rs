//! Pre-run validation of an assembled [`BacktestConfig`].
//!
//! Parse errors are caught by the config adapter; this module checks the
//! values that parse fine but make no sense to run with. The first
//! violation is reported and validation stops there.

use crate::domain::backtest::{BacktestConfig, DateRange};
use crate::domain::error::ChaindexError;

const FIXED_WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

pub fn validate(config: &BacktestConfig) -> Result<(), ChaindexError> {
    if config.num_assets == 0 {
        return Err(invalid("num_assets", "must be at least 1"));
    }
    if !(config.max_weight > 0.0 && config.max_weight <= 1.0) {
        return Err(invalid("max_weight", "must be in (0, 1]"));
    }
    if config.min_weight < 0.0 {
        return Err(invalid("min_weight", "must not be negative"));
    }
    if config.min_weight > config.max_weight {
        return Err(invalid("min_weight", "must not exceed max_weight"));
    }
    if let DateRange::Explicit { start, end } = config.range {
        if start >= end {
            return Err(invalid("start_date", "must be before end_date"));
        }
    }
    if let Some(weights) = &config.fixed_weights {
        if weights.is_empty() {
            return Err(ChaindexError::ConfigInvalid {
                section: "weights".to_string(),
                key: String::new(),
                reason: "fixed-weight section is present but empty".to_string(),
            });
        }
        for (symbol, &weight) in weights {
            if weight <= 0.0 {
                return Err(ChaindexError::ConfigInvalid {
                    section: "weights".to_string(),
                    key: symbol.clone(),
                    reason: "fixed weight must be positive".to_string(),
                });
            }
        }
        let total: f64 = weights.values().sum();
        if (total - 1.0).abs() > FIXED_WEIGHT_SUM_TOLERANCE {
            return Err(ChaindexError::ConfigInvalid {
                section: "weights".to_string(),
                key: String::new(),
                reason: format!("fixed weights sum to {total}, expected 1"),
            });
        }
    }
    Ok(())
}

fn invalid(key: &str, reason: &str) -> ChaindexError {
    ChaindexError::ConfigInvalid {
        section: "backtest".to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
