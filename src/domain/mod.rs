//! Core domain types and logic.

pub mod backtest;
pub mod config;
pub mod error;
pub mod indicator;
pub mod metrics;
pub mod optimizer;
pub mod price_point;
pub mod regime;
pub mod strategy;
pub mod walk_forward;
