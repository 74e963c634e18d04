//! Engine settings resolved from a config source.
//!
//! Every key has a default. Missing keys fall back silently; present but
//! out-of-range or unparsable values fall back with a warning. Nothing here
//! fails.

use crate::domain::backtest::{BacktestConfig, DEFAULT_ANNUALIZATION, DEFAULT_START_EQUITY};
use crate::domain::optimizer::{DEFAULT_HIGH_WINDOWS, DEFAULT_LOW_WINDOWS};
use crate::domain::regime::{DEFAULT_ITERATIONS, DEFAULT_WINDOW, VolatilityRegimes};
use crate::domain::walk_forward::{
    DEFAULT_TEST_SIZE, DEFAULT_TRAIN_SIZE, DEFAULT_WINDOWS, WalkForwardConfig,
};
use crate::ports::config_port::ConfigPort;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub backtest: BacktestConfig,
    pub walk_forward: WalkForwardConfig,
    pub low_windows: Vec<usize>,
    pub high_windows: Vec<usize>,
    pub regimes: VolatilityRegimes,
    pub parallel: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            backtest: BacktestConfig::default(),
            walk_forward: WalkForwardConfig::default(),
            low_windows: DEFAULT_LOW_WINDOWS.to_vec(),
            high_windows: DEFAULT_HIGH_WINDOWS.to_vec(),
            regimes: VolatilityRegimes::default(),
            parallel: true,
        }
    }
}

pub fn resolve_settings(config: &dyn ConfigPort) -> EngineSettings {
    let start_equity = config.get_double("backtest", "start_equity", DEFAULT_START_EQUITY);
    let start_equity = if start_equity.is_finite() && start_equity > 0.0 {
        start_equity
    } else {
        warn!(
            "[backtest] start_equity must be positive, using {}",
            DEFAULT_START_EQUITY
        );
        DEFAULT_START_EQUITY
    };

    EngineSettings {
        backtest: BacktestConfig {
            start_equity,
            annualization_factor: positive_int(
                config,
                "backtest",
                "annualization_factor",
                DEFAULT_ANNUALIZATION as usize,
            ) as u32,
        },
        walk_forward: WalkForwardConfig {
            train_size: positive_int(config, "walk_forward", "train_size", DEFAULT_TRAIN_SIZE),
            test_size: positive_int(config, "walk_forward", "test_size", DEFAULT_TEST_SIZE),
            windows: window_list(config, "walk_forward", "windows", &DEFAULT_WINDOWS),
        },
        low_windows: window_list(config, "grid", "low_windows", &DEFAULT_LOW_WINDOWS),
        high_windows: window_list(config, "grid", "high_windows", &DEFAULT_HIGH_WINDOWS),
        regimes: VolatilityRegimes {
            window: positive_int(config, "regime", "window", DEFAULT_WINDOW),
            iterations: positive_int(config, "regime", "iterations", DEFAULT_ITERATIONS),
        },
        parallel: config.get_bool("engine", "parallel", true),
    }
}

fn positive_int(config: &dyn ConfigPort, section: &str, key: &str, default: usize) -> usize {
    if config.get_string(section, key).is_none() {
        return default;
    }
    let value = config.get_int(section, key, -1);
    if value > 0 && value <= u32::MAX as i64 {
        value as usize
    } else {
        warn!("[{}] {} must be a positive integer, using {}", section, key, default);
        default
    }
}

fn window_list(config: &dyn ConfigPort, section: &str, key: &str, default: &[usize]) -> Vec<usize> {
    if config.get_string(section, key).is_none() {
        return default.to_vec();
    }
    match config.get_usize_list(section, key) {
        Some(list) if valid_windows(&list) => list,
        _ => {
            warn!(
                "[{}] {} must be a list of positive integers, using {:?}",
                section, key, default
            );
            default.to_vec()
        }
    }
}

/// Non-empty and every window positive.
pub fn valid_windows(windows: &[usize]) -> bool {
    !windows.is_empty() && windows.iter().all(|&w| w > 0)
}

/// Applies a command-line window list on top of `current`. An empty
/// request keeps `current`; an invalid one keeps it with a warning.
pub fn override_windows(current: &[usize], requested: &[usize], name: &str) -> Vec<usize> {
    if requested.is_empty() {
        return current.to_vec();
    }
    if valid_windows(requested) {
        requested.to_vec()
    } else {
        warn!(
            "--{} must be a list of positive integers, using {:?}",
            name, current
        );
        current.to_vec()
    }
}
