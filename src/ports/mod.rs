//! Trait seams between the pure engine and the outside world.

pub mod config_port;
pub mod report_port;
pub mod series_port;
