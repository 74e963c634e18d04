//! Performance metrics over a simulated series.
//!
//! Degenerate input never fails: an empty series, constant equity or no
//! non-zero returns all produce defined zero values.

use crate::domain::backtest::DEFAULT_ANNUALIZATION;
use crate::domain::price_point::PricePoint;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub final_equity: f64,
    pub total_return: f64,
    pub max_drawdown: f64,
    pub win_rate: f64,
    pub sharpe: f64,
}

impl Default for Metrics {
    /// Metrics of an empty series.
    fn default() -> Self {
        Self {
            final_equity: 1.0,
            total_return: 0.0,
            max_drawdown: 0.0,
            win_rate: 0.0,
            sharpe: 0.0,
        }
    }
}

impl Metrics {
    pub fn compute(series: &[PricePoint], annualization_factor: u32) -> Self {
        let equity: Vec<f64> = series.iter().map(|p| p.equity.unwrap_or(1.0)).collect();
        let final_equity = equity.last().copied().unwrap_or(1.0);

        Metrics {
            final_equity,
            total_return: final_equity - 1.0,
            max_drawdown: max_drawdown(&equity),
            win_rate: win_rate(series),
            sharpe: sharpe_ratio(series, annualization_factor),
        }
    }
}

/// Largest peak-to-trough decline as a fraction of the running peak.
pub fn max_drawdown(equity: &[f64]) -> f64 {
    let Some(&first) = equity.first() else {
        return 0.0;
    };

    let mut peak = first;
    let mut max_dd = 0.0_f64;

    for &eq in equity {
        if eq > peak {
            peak = eq;
        }
        if peak > 0.0 {
            let dd = (peak - eq) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd
}

/// Winning steps over all steps with a non-zero strategy return.
pub fn win_rate(series: &[PricePoint]) -> f64 {
    let mut wins = 0usize;
    let mut losses = 0usize;

    for r in series.iter().filter_map(|p| p.strategy_return) {
        if r > 0.0 {
            wins += 1;
        } else if r < 0.0 {
            losses += 1;
        }
    }

    let total = wins + losses;
    if total > 0 {
        wins as f64 / total as f64
    } else {
        0.0
    }
}

/// Mean over population standard deviation of strategy returns, scaled by
/// `sqrt(annualization_factor)`. Points without a strategy return are
/// skipped.
pub fn sharpe_ratio(series: &[PricePoint], annualization_factor: u32) -> f64 {
    let returns: Vec<f64> = series.iter().filter_map(|p| p.strategy_return).collect();
    if returns.is_empty() {
        return 0.0;
    }

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    if stddev == 0.0 {
        return 0.0;
    }

    let factor = if annualization_factor == 0 {
        DEFAULT_ANNUALIZATION
    } else {
        annualization_factor
    };
    (mean / stddev) * (factor as f64).sqrt()
}
