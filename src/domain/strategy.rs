//! Position assignment from indicator and regime fields.
//!
//! Missing data never fails: an undefined moving average, an undefined
//! regime, or a regime without a mapped window all resolve to `Flat`.

use crate::domain::indicator::IndicatorType;
use crate::domain::optimizer::WindowPair;
use crate::domain::price_point::{Position, PricePoint, Regime};
use std::collections::BTreeMap;

/// Regime tag → moving-average window.
pub type RegimeWindows = BTreeMap<Regime, usize>;

#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    /// Long while close is above SMA(window).
    FixedWindow { window: usize },
    /// Picks the SMA window from each point's regime.
    RegimeAdaptive { windows: RegimeWindows },
}

impl Strategy {
    /// Low/high volatility mapping used by the grid search.
    pub fn low_high(low_window: usize, high_window: usize) -> Self {
        let pair = WindowPair {
            low: low_window,
            high: high_window,
        };
        Strategy::RegimeAdaptive {
            windows: pair.regime_windows(),
        }
    }

    /// Position for one point under this strategy.
    pub fn position_for(&self, point: &PricePoint) -> Position {
        match self {
            Strategy::FixedWindow { window } => above_sma(point, *window),
            Strategy::RegimeAdaptive { windows } => {
                match point.regime.and_then(|r| windows.get(&r)) {
                    Some(window) => above_sma(point, *window),
                    None => Position::Flat,
                }
            }
        }
    }

    /// Writes `position` on every point. Touches no other field.
    pub fn assign_positions(&self, series: &mut [PricePoint]) {
        for point in series.iter_mut() {
            point.position = Some(self.position_for(point));
        }
    }
}

fn above_sma(point: &PricePoint, window: usize) -> Position {
    match point.indicator(&IndicatorType::Sma(window)) {
        Some(sma) => Position::from_signal(point.close > sma),
        None => Position::Flat,
    }
}
