//! Equity-curve simulator.
//!
//! Replays positions over closing prices, one point at a time:
//!
//! - `ret[i] = (close[i] - close[i-1]) / close[i-1]`, 0 for the first point
//! - `strategy_return[i] = position[i-1] * ret[i]`, with `position[-1] = 0`
//! - `equity[i] = equity[i-1] * (1 + strategy_return[i])`, with
//!   `equity[-1] = start_equity`
//!
//! The one-step lag keeps a signal from trading on the bar that produced it.

use crate::domain::price_point::{Position, PricePoint};

pub const DEFAULT_START_EQUITY: f64 = 1.0;
pub const DEFAULT_ANNUALIZATION: u32 = 365;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BacktestConfig {
    /// Equity seed; must be finite and positive.
    pub start_equity: f64,
    /// Periods per year used to annualize the Sharpe ratio.
    pub annualization_factor: u32,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            start_equity: DEFAULT_START_EQUITY,
            annualization_factor: DEFAULT_ANNUALIZATION,
        }
    }
}

impl BacktestConfig {
    /// Replaces out-of-range values with their defaults.
    pub fn sanitized(self) -> Self {
        Self {
            start_equity: sanitize_start_equity(self.start_equity),
            annualization_factor: if self.annualization_factor == 0 {
                DEFAULT_ANNUALIZATION
            } else {
                self.annualization_factor
            },
        }
    }
}

pub fn sanitize_start_equity(start_equity: f64) -> f64 {
    if start_equity.is_finite() && start_equity > 0.0 {
        start_equity
    } else {
        DEFAULT_START_EQUITY
    }
}

/// State carried from one point to the next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimState {
    pub prev_close: Option<f64>,
    pub prev_position: Position,
    pub equity: f64,
}

/// Fields produced for a single point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutput {
    pub ret: f64,
    pub strategy_return: f64,
    pub equity: f64,
}

impl SimState {
    pub fn new(start_equity: f64) -> Self {
        Self {
            prev_close: None,
            prev_position: Position::Flat,
            equity: sanitize_start_equity(start_equity),
        }
    }

    /// Advances by one point. A zero previous close yields a zero return.
    pub fn step(self, close: f64, position: Position) -> (StepOutput, SimState) {
        let ret = match self.prev_close {
            Some(prev) if prev != 0.0 => (close - prev) / prev,
            _ => 0.0,
        };
        let strategy_return = self.prev_position.exposure() * ret;
        let equity = self.equity * (1.0 + strategy_return);

        let output = StepOutput {
            ret,
            strategy_return,
            equity,
        };
        let next = SimState {
            prev_close: Some(close),
            prev_position: position,
            equity,
        };
        (output, next)
    }
}

/// Simulates `series` in place and returns the final state. Points without
/// an assigned position count as flat.
pub fn simulate(series: &mut [PricePoint], start_equity: f64) -> SimState {
    let mut state = SimState::new(start_equity);
    for point in series.iter_mut() {
        let position = point.position.unwrap_or_default();
        let (output, next) = state.step(point.close, position);
        point.ret = Some(output.ret);
        point.strategy_return = Some(output.strategy_return);
        point.equity = Some(output.equity);
        state = next;
    }
    state
}
