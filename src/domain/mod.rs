//! Pure engine logic: no I/O, no clocks, fully deterministic.

pub mod allocation;
pub mod asset;
pub mod backtest;
pub mod config_validation;
pub mod error;
pub mod portfolio;
pub mod screening;
pub mod series;
pub mod simulator;
pub mod stats;
