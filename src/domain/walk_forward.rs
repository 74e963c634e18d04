//! Walk-forward optimization: rolling train/test folds with chained equity.
//!
//! Fold starts advance by `test_size`, so consecutive training windows
//! overlap while test slices tile the series without gaps. For each fold:
//!
//! 1. every candidate SMA window is scored by Sharpe on a copy of the
//!    training slice (fixed-window positions, equity seeded at 1.0);
//! 2. the first window with the strictly greatest Sharpe is applied to the
//!    test slice, simulated from the equity the previous test slice ended on;
//! 3. the simulated test points are appended to the combined series.
//!
//! Metrics are computed once over the combined out-of-sample series.

use crate::domain::backtest::{self, BacktestConfig, DEFAULT_START_EQUITY};
use crate::domain::metrics::{Metrics, sharpe_ratio};
use crate::domain::optimizer::{or_default, select_best};
use crate::domain::price_point::PricePoint;
use crate::domain::strategy::Strategy;
use crate::ports::indicator_port::IndicatorProvider;
use rayon::prelude::*;
use tracing::{debug, info, warn};

pub const DEFAULT_TRAIN_SIZE: usize = 200;
pub const DEFAULT_TEST_SIZE: usize = 50;
pub const DEFAULT_WINDOWS: [usize; 4] = [5, 10, 20, 30];

#[derive(Debug, Clone, PartialEq)]
pub struct WalkForwardConfig {
    /// Points per training slice.
    pub train_size: usize,
    /// Points per test slice; also the fold step.
    pub test_size: usize,
    /// Candidate SMA windows.
    pub windows: Vec<usize>,
}

impl Default for WalkForwardConfig {
    fn default() -> Self {
        Self {
            train_size: DEFAULT_TRAIN_SIZE,
            test_size: DEFAULT_TEST_SIZE,
            windows: DEFAULT_WINDOWS.to_vec(),
        }
    }
}

impl WalkForwardConfig {
    /// Replaces zero sizes and an empty window list with defaults.
    pub fn sanitized(self) -> Self {
        let train_size = if self.train_size == 0 {
            warn!("train_size is 0, using {}", DEFAULT_TRAIN_SIZE);
            DEFAULT_TRAIN_SIZE
        } else {
            self.train_size
        };
        let test_size = if self.test_size == 0 {
            warn!("test_size is 0, using {}", DEFAULT_TEST_SIZE);
            DEFAULT_TEST_SIZE
        } else {
            self.test_size
        };
        let windows = or_default(&self.windows, &DEFAULT_WINDOWS, "windows").to_vec();
        Self {
            train_size,
            test_size,
            windows,
        }
    }
}

/// Index ranges of one fold. Ends are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoldSpec {
    pub fold_index: usize,
    pub train_start: usize,
    pub train_end: usize,
    pub test_start: usize,
    pub test_end: usize,
}

/// Folds for a series of `len` points. Zero sizes, or sizes too large to
/// fit, produce no folds.
pub fn create_folds(len: usize, train_size: usize, test_size: usize) -> Vec<FoldSpec> {
    if train_size == 0 || test_size == 0 {
        return Vec::new();
    }

    let mut folds = Vec::new();
    let mut start = 0usize;
    loop {
        let Some(train_end) = start.checked_add(train_size) else {
            break;
        };
        let Some(test_end) = train_end.checked_add(test_size) else {
            break;
        };
        if test_end > len {
            break;
        }
        folds.push(FoldSpec {
            fold_index: folds.len(),
            train_start: start,
            train_end,
            test_start: train_end,
            test_end,
        });
        start = match start.checked_add(test_size) {
            Some(next) => next,
            None => break,
        };
    }
    folds
}

#[derive(Debug, Clone, PartialEq)]
pub struct FoldResult {
    pub spec: FoldSpec,
    pub window: usize,
    /// In-sample Sharpe of the chosen window.
    pub train_sharpe: f64,
    /// Equity the test slice was seeded with.
    pub start_equity: f64,
    pub end_equity: f64,
}

#[derive(Debug, Clone)]
pub struct WalkForwardResult {
    /// Chosen window per fold, in fold order.
    pub windows: Vec<usize>,
    pub folds: Vec<FoldResult>,
    /// Simulated test slices, concatenated.
    pub combined: Vec<PricePoint>,
    pub metrics: Metrics,
}

pub struct WalkForward<'a> {
    indicators: &'a dyn IndicatorProvider,
    config: BacktestConfig,
    parallel: bool,
}

impl<'a> WalkForward<'a> {
    pub fn new(indicators: &'a dyn IndicatorProvider) -> Self {
        Self {
            indicators,
            config: BacktestConfig::default(),
            parallel: true,
        }
    }

    pub fn with_config(mut self, config: BacktestConfig) -> Self {
        self.config = config.sanitized();
        self
    }

    /// Enables or disables parallel scoring of training candidates.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Indicators + fixed-window positions + simulation on `slice` in place.
    fn apply_window(&self, slice: &mut [PricePoint], window: usize, start_equity: f64) -> f64 {
        self.indicators.annotate(slice, window);
        Strategy::FixedWindow { window }.assign_positions(slice);
        backtest::simulate(slice, start_equity).equity
    }

    fn score_window(&self, train: &[PricePoint], window: usize) -> f64 {
        let mut local = train.to_vec();
        self.apply_window(&mut local, window, DEFAULT_START_EQUITY);
        let sharpe = sharpe_ratio(&local, self.config.annualization_factor);
        debug!(window, sharpe, "training candidate scored");
        sharpe
    }

    /// Best window on `train`, first candidate winning ties. `windows` must
    /// be non-empty.
    pub fn select_window(&self, train: &[PricePoint], windows: &[usize]) -> (usize, f64) {
        let scored: Vec<(usize, f64)> = if self.parallel {
            windows
                .par_iter()
                .map(|&w| (w, self.score_window(train, w)))
                .collect()
        } else {
            windows
                .iter()
                .map(|&w| (w, self.score_window(train, w)))
                .collect()
        };

        select_best(scored).unwrap_or((windows[0], f64::NEG_INFINITY))
    }

    pub fn run(&self, series: &[PricePoint], wf_config: WalkForwardConfig) -> WalkForwardResult {
        let wf_config = wf_config.sanitized();
        let folds = create_folds(series.len(), wf_config.train_size, wf_config.test_size);

        let mut windows = Vec::with_capacity(folds.len());
        let mut fold_results = Vec::with_capacity(folds.len());
        let mut combined = Vec::with_capacity(folds.len() * wf_config.test_size);
        let mut equity = DEFAULT_START_EQUITY;

        for spec in &folds {
            let train = &series[spec.train_start..spec.train_end];
            let (window, train_sharpe) = self.select_window(train, &wf_config.windows);

            let mut test = series[spec.test_start..spec.test_end].to_vec();
            let start_equity = equity;
            equity = self.apply_window(&mut test, window, start_equity);

            info!(
                fold = spec.fold_index,
                window, train_sharpe, start_equity, end_equity = equity, "fold complete"
            );

            windows.push(window);
            fold_results.push(FoldResult {
                spec: *spec,
                window,
                train_sharpe,
                start_equity,
                end_equity: equity,
            });
            combined.extend(test);
        }

        let metrics = if combined.is_empty() {
            Metrics::default()
        } else {
            Metrics::compute(&combined, self.config.annualization_factor)
        };

        WalkForwardResult {
            windows,
            folds: fold_results,
            combined,
            metrics,
        }
    }
}
