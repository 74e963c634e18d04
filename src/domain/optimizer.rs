//! Brute-force search over regime window pairs.
//!
//! Every (low, high) pair in the cartesian product of the candidate lists is
//! run through indicators → regimes → regime-adaptive positions →
//! simulation → Sharpe on its own copy of the input. Candidates may be
//! scored in parallel; the winner is then picked in candidate order, and a
//! later pair replaces the current best only with a strictly greater Sharpe.

use crate::domain::backtest::{self, BacktestConfig, DEFAULT_START_EQUITY};
use crate::domain::metrics::sharpe_ratio;
use crate::domain::price_point::{PricePoint, Regime};
use crate::domain::strategy::{RegimeWindows, Strategy};
use crate::ports::indicator_port::IndicatorProvider;
use crate::ports::regime_port::RegimeLabeler;
use rayon::prelude::*;
use tracing::{debug, info, warn};

pub const DEFAULT_LOW_WINDOWS: [usize; 3] = [20, 30, 40];
pub const DEFAULT_HIGH_WINDOWS: [usize; 3] = [5, 10, 15];

/// Picks the first item with the strictly greatest score. A NaN score never
/// replaces the current best, but is kept if it comes first.
pub fn select_best<T>(scored: impl IntoIterator<Item = (T, f64)>) -> Option<(T, f64)> {
    let mut best: Option<(T, f64)> = None;
    for (item, score) in scored {
        let improves = match &best {
            Some((_, best_score)) => score > *best_score,
            None => true,
        };
        if improves {
            best = Some((item, score));
        }
    }
    best
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPair {
    pub low: usize,
    pub high: usize,
}

impl WindowPair {
    pub fn strategy(self) -> Strategy {
        Strategy::low_high(self.low, self.high)
    }

    /// Low window for the low-volatility regime, high for high.
    pub fn regime_windows(self) -> RegimeWindows {
        RegimeWindows::from([
            (Regime::LOW_VOLATILITY, self.low),
            (Regime::HIGH_VOLATILITY, self.high),
        ])
    }
}

/// Cartesian product in (low-major, high-minor) order.
pub fn window_pairs(low_windows: &[usize], high_windows: &[usize]) -> Vec<WindowPair> {
    low_windows
        .iter()
        .flat_map(|&low| high_windows.iter().map(move |&high| WindowPair { low, high }))
        .collect()
}

#[derive(Debug, Clone)]
pub struct GridResult {
    pub best: WindowPair,
    pub params: RegimeWindows,
    pub series: Vec<PricePoint>,
    pub sharpe: f64,
    /// Sharpe of every evaluated pair, in candidate order.
    pub scores: Vec<(WindowPair, f64)>,
}

pub struct GridOptimizer<'a> {
    indicators: &'a dyn IndicatorProvider,
    regimes: &'a dyn RegimeLabeler,
    config: BacktestConfig,
    parallel: bool,
}

impl<'a> GridOptimizer<'a> {
    pub fn new(indicators: &'a dyn IndicatorProvider, regimes: &'a dyn RegimeLabeler) -> Self {
        Self {
            indicators,
            regimes,
            config: BacktestConfig::default(),
            parallel: true,
        }
    }

    pub fn with_config(mut self, config: BacktestConfig) -> Self {
        self.config = config.sanitized();
        self
    }

    /// Enables or disables parallel candidate scoring.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Runs the full pipeline for one pair on a private copy of `series`.
    pub fn evaluate(&self, series: &[PricePoint], pair: WindowPair) -> (Vec<PricePoint>, f64) {
        let mut local = series.to_vec();
        self.indicators.annotate(&mut local, pair.low);
        if pair.high != pair.low {
            self.indicators.annotate(&mut local, pair.high);
        }
        self.regimes.label(&mut local);
        pair.strategy().assign_positions(&mut local);
        backtest::simulate(&mut local, DEFAULT_START_EQUITY);
        let sharpe = sharpe_ratio(&local, self.config.annualization_factor);
        debug!(low = pair.low, high = pair.high, sharpe, "grid candidate scored");
        (local, sharpe)
    }

    /// Searches every (low, high) pair. Empty candidate lists fall back to
    /// `DEFAULT_LOW_WINDOWS` / `DEFAULT_HIGH_WINDOWS`.
    pub fn optimize(
        &self,
        series: &[PricePoint],
        low_windows: &[usize],
        high_windows: &[usize],
    ) -> GridResult {
        let low_windows = or_default(low_windows, &DEFAULT_LOW_WINDOWS, "low_windows");
        let high_windows = or_default(high_windows, &DEFAULT_HIGH_WINDOWS, "high_windows");
        let pairs = window_pairs(low_windows, high_windows);

        let evaluated: Vec<(WindowPair, Vec<PricePoint>, f64)> = if self.parallel {
            pairs
                .par_iter()
                .map(|&pair| {
                    let (local, sharpe) = self.evaluate(series, pair);
                    (pair, local, sharpe)
                })
                .collect()
        } else {
            pairs
                .iter()
                .map(|&pair| {
                    let (local, sharpe) = self.evaluate(series, pair);
                    (pair, local, sharpe)
                })
                .collect()
        };

        let scores: Vec<(WindowPair, f64)> =
            evaluated.iter().map(|(pair, _, sharpe)| (*pair, *sharpe)).collect();

        let ((best, best_series), sharpe) = select_best(
            evaluated
                .into_iter()
                .map(|(pair, local, sharpe)| ((pair, local), sharpe)),
        )
        .unwrap_or_else(|| {
            // window_pairs of two non-empty lists is never empty
            let pair = WindowPair {
                low: low_windows[0],
                high: high_windows[0],
            };
            ((pair, Vec::new()), f64::NEG_INFINITY)
        });

        info!(
            low = best.low,
            high = best.high,
            sharpe,
            candidates = scores.len(),
            "grid search finished"
        );

        GridResult {
            best,
            params: best.regime_windows(),
            series: best_series,
            sharpe,
            scores,
        }
    }
}

pub(crate) fn or_default<'a>(
    values: &'a [usize],
    default: &'a [usize],
    name: &str,
) -> &'a [usize] {
    if values.is_empty() {
        warn!("{} is empty, using {:?}", name, default);
        default
    } else {
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::TechnicalIndicators;
    use crate::domain::indicator::test_support::make_series;
    use crate::domain::regime::VolatilityRegimes;

    fn wavy_closes(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let t = i as f64;
                100.0 + 0.3 * t + 6.0 * (t / 5.0).sin() + 3.0 * (t / 2.3).cos()
            })
            .collect()
    }

    fn optimizer<'a>(
        indicators: &'a TechnicalIndicators,
        regimes: &'a VolatilityRegimes,
    ) -> GridOptimizer<'a> {
        GridOptimizer::new(indicators, regimes)
    }

    #[test]
    fn select_best_first_wins_ties() {
        let best = select_best(vec![("a", 1.0), ("b", 2.0), ("c", 2.0), ("d", 0.5)]);
        assert_eq!(best, Some(("b", 2.0)));
    }

    #[test]
    fn select_best_nan_never_replaces() {
        let best = select_best(vec![("a", 1.0), ("b", f64::NAN)]);
        assert_eq!(best, Some(("a", 1.0)));
        let best = select_best(vec![("a", f64::NAN), ("b", 0.5)]).unwrap();
        assert_eq!(best.0, "a");
    }

    #[test]
    fn select_best_empty() {
        assert!(select_best(Vec::<(u8, f64)>::new()).is_none());
    }

    #[test]
    fn window_pairs_cartesian_order() {
        let pairs = window_pairs(&[1, 2], &[3, 4]);
        let flat: Vec<(usize, usize)> = pairs.iter().map(|p| (p.low, p.high)).collect();
        assert_eq!(flat, vec![(1, 3), (1, 4), (2, 3), (2, 4)]);
    }

    #[test]
    fn regime_windows_map_low_and_high() {
        let pair = WindowPair { low: 30, high: 5 };
        let windows = pair.regime_windows();
        assert_eq!(windows.len(), 2);
        assert_eq!(windows.get(&Regime::LOW_VOLATILITY), Some(&30));
        assert_eq!(windows.get(&Regime::HIGH_VOLATILITY), Some(&5));
        assert_eq!(
            pair.strategy(),
            Strategy::RegimeAdaptive { windows }
        );
    }

    #[test]
    fn winner_has_max_sharpe_and_matching_params() {
        let series = make_series(&wavy_closes(120));
        let indicators = TechnicalIndicators;
        let regimes = VolatilityRegimes::default();
        let result = optimizer(&indicators, &regimes).optimize(&series, &[5, 10, 20], &[3, 8]);

        assert_eq!(result.scores.len(), 6);
        let max = result
            .scores
            .iter()
            .map(|(_, s)| *s)
            .fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(result.sharpe, max);
        assert_eq!(result.params.get(&Regime::LOW_VOLATILITY), Some(&result.best.low));
        assert_eq!(result.params.get(&Regime::HIGH_VOLATILITY), Some(&result.best.high));
        assert_eq!(result.series.len(), series.len());
    }

    #[test]
    fn input_series_is_not_mutated() {
        let series = make_series(&wavy_closes(60));
        let before = series.clone();
        let indicators = TechnicalIndicators;
        let regimes = VolatilityRegimes::default();
        optimizer(&indicators, &regimes).optimize(&series, &[5, 10], &[3]);
        assert_eq!(series, before);
    }

    #[test]
    fn parallel_matches_sequential() {
        let series = make_series(&wavy_closes(150));
        let indicators = TechnicalIndicators;
        let regimes = VolatilityRegimes::default();
        let par = optimizer(&indicators, &regimes).optimize(&series, &[5, 10, 20], &[3, 5, 8]);
        let seq = optimizer(&indicators, &regimes)
            .with_parallelism(false)
            .optimize(&series, &[5, 10, 20], &[3, 5, 8]);

        assert_eq!(par.best, seq.best);
        assert_eq!(par.sharpe, seq.sharpe);
        assert_eq!(par.scores, seq.scores);
    }

    #[test]
    fn constant_prices_keep_first_pair() {
        let series = make_series(&[100.0; 40]);
        let indicators = TechnicalIndicators;
        let regimes = VolatilityRegimes::default();
        let result = optimizer(&indicators, &regimes).optimize(&series, &[5, 10], &[3, 4]);
        assert_eq!(result.best, WindowPair { low: 5, high: 3 });
        assert_eq!(result.sharpe, 0.0);
    }

    #[test]
    fn empty_candidates_use_defaults() {
        let series = make_series(&wavy_closes(80));
        let indicators = TechnicalIndicators;
        let regimes = VolatilityRegimes::default();
        let result = optimizer(&indicators, &regimes).optimize(&series, &[], &[]);
        assert_eq!(result.scores.len(), 9);
        assert!(DEFAULT_LOW_WINDOWS.contains(&result.best.low));
        assert!(DEFAULT_HIGH_WINDOWS.contains(&result.best.high));
    }

    #[test]
    fn empty_series_scores_zero() {
        let indicators = TechnicalIndicators;
        let regimes = VolatilityRegimes::default();
        let result = optimizer(&indicators, &regimes).optimize(&[], &[5], &[3]);
        assert_eq!(result.sharpe, 0.0);
        assert!(result.series.is_empty());
    }
}
