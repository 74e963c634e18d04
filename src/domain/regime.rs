//! Volatility regime labeling.
//!
//! Splits points into low/high volatility with a two-cluster 1-D k-means
//! over the rolling standard deviation of returns.

use crate::domain::indicator::stddev::population_stddev;
use crate::domain::price_point::{PricePoint, Regime};
use crate::ports::regime_port::RegimeLabeler;

pub const DEFAULT_WINDOW: usize = 10;
pub const DEFAULT_ITERATIONS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolatilityRegimes {
    /// Number of trailing returns in each volatility sample.
    pub window: usize,
    /// Upper bound on k-means refinement passes.
    pub iterations: usize,
}

impl Default for VolatilityRegimes {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

/// Per-step simple returns; the first point and zero prior closes give 0.
pub fn step_returns(closes: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(closes.len());
    for i in 0..closes.len() {
        if i == 0 || closes[i - 1] == 0.0 {
            out.push(0.0);
        } else {
            out.push((closes[i] - closes[i - 1]) / closes[i - 1]);
        }
    }
    out
}

/// Rolling volatility; undefined for indices below `window`.
fn rolling_volatility(returns: &[f64], window: usize) -> Vec<Option<f64>> {
    (0..returns.len())
        .map(|i| {
            if window == 0 || i < window {
                None
            } else {
                Some(population_stddev(&returns[i + 1 - window..=i]))
            }
        })
        .collect()
}

fn nearest(value: f64, centers: [f64; 2]) -> usize {
    if (value - centers[0]).abs() <= (value - centers[1]).abs() {
        0
    } else {
        1
    }
}

/// Two-cluster k-means seeded at (min, max). Empty clusters keep their
/// centre; stops once centres no longer move.
fn two_means(data: &[f64], iterations: usize) -> [f64; 2] {
    let min = data.iter().copied().fold(f64::INFINITY, f64::min);
    let max = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut centers = [min, max];

    for _ in 0..iterations {
        let mut sums = [0.0_f64; 2];
        let mut counts = [0usize; 2];
        for &v in data {
            let idx = nearest(v, centers);
            sums[idx] += v;
            counts[idx] += 1;
        }

        let mut next = centers;
        for idx in 0..2 {
            if counts[idx] > 0 {
                next[idx] = sums[idx] / counts[idx] as f64;
            }
        }
        if next == centers {
            break;
        }
        centers = next;
    }

    centers
}

impl RegimeLabeler for VolatilityRegimes {
    fn label(&self, series: &mut [PricePoint]) {
        let closes: Vec<f64> = series.iter().map(|p| p.close).collect();
        let vol = rolling_volatility(&step_returns(&closes), self.window);

        let data: Vec<f64> = vol.iter().flatten().copied().collect();
        if data.is_empty() {
            for point in series.iter_mut() {
                point.regime = None;
            }
            return;
        }

        let centers = two_means(&data, self.iterations);
        for (point, v) in series.iter_mut().zip(&vol) {
            point.regime = v.map(|v| match nearest(v, centers) {
                0 => Regime::LOW_VOLATILITY,
                _ => Regime::HIGH_VOLATILITY,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::make_series;
    use approx::assert_relative_eq;

    #[test]
    fn step_returns_first_is_zero() {
        let r = step_returns(&[100.0, 110.0, 99.0]);
        assert_eq!(r[0], 0.0);
        assert_relative_eq!(r[1], 0.1, epsilon = 1e-12);
        assert_relative_eq!(r[2], -0.1, epsilon = 1e-12);
    }

    #[test]
    fn step_returns_zero_prior_close() {
        let r = step_returns(&[0.0, 5.0]);
        assert_eq!(r, vec![0.0, 0.0]);
    }

    #[test]
    fn short_series_has_no_regime() {
        let mut series = make_series(&[1.0, 2.0, 3.0]);
        VolatilityRegimes::default().label(&mut series);
        assert!(series.iter().all(|p| p.regime.is_none()));
    }

    #[test]
    fn warmup_points_have_no_regime() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + (i % 3) as f64).collect();
        let mut series = make_series(&closes);
        let labeler = VolatilityRegimes {
            window: 5,
            iterations: 50,
        };
        labeler.label(&mut series);

        for point in &series[..5] {
            assert!(point.regime.is_none());
        }
        for point in &series[5..] {
            assert!(point.regime.is_some());
        }
    }

    #[test]
    fn calm_then_volatile_splits_into_two_regimes() {
        let mut closes = vec![100.0; 15];
        let mut price = 100.0;
        for i in 0..15 {
            price *= if i % 2 == 0 { 1.08 } else { 0.93 };
            closes.push(price);
        }
        let mut series = make_series(&closes);
        let labeler = VolatilityRegimes {
            window: 3,
            iterations: 100,
        };
        labeler.label(&mut series);

        assert_eq!(series[10].regime, Some(Regime::LOW_VOLATILITY));
        assert_eq!(series[29].regime, Some(Regime::HIGH_VOLATILITY));
    }

    #[test]
    fn constant_volatility_is_all_low() {
        let mut series = make_series(&[50.0; 12]);
        VolatilityRegimes {
            window: 4,
            iterations: 10,
        }
        .label(&mut series);
        for point in &series[4..] {
            assert_eq!(point.regime, Some(Regime::LOW_VOLATILITY));
        }
    }

    #[test]
    fn two_means_separates_clusters() {
        let centers = two_means(&[0.1, 0.11, 0.12, 0.9, 0.95], 100);
        assert_relative_eq!(centers[0], 0.11, epsilon = 1e-12);
        assert_relative_eq!(centers[1], 0.925, epsilon = 1e-12);
    }
}
