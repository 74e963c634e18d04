//! Port traits for the collaborators around the backtest core.

pub mod config_port;
pub mod data_port;
pub mod indicator_port;
pub mod regime_port;
pub mod report_port;
