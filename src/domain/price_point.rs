//! Price record with derived annotations.
//!
//! A `PricePoint` starts life with only OHLCV populated. Each pipeline stage
//! adds its own fields (indicators, regime, position, simulation output)
//! without touching the others. Undefined values are `None`, never a
//! sentinel number.

use crate::domain::indicator::IndicatorType;
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::fmt;

/// Binary exposure decision for the next step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    #[default]
    Flat,
    Long,
}

impl Position {
    pub fn from_signal(long: bool) -> Self {
        if long { Position::Long } else { Position::Flat }
    }

    /// 0.0 for flat, 1.0 for long.
    pub fn exposure(self) -> f64 {
        match self {
            Position::Flat => 0.0,
            Position::Long => 1.0,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Flat => write!(f, "0"),
            Position::Long => write!(f, "1"),
        }
    }
}

/// Discrete market regime tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Regime(pub u8);

impl Regime {
    pub const LOW_VOLATILITY: Regime = Regime(0);
    pub const HIGH_VOLATILITY: Regime = Regime(1);
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    /// Keyed by indicator and window. A present key with a `None` value
    /// means the indicator was computed but lacked history at this point.
    pub indicators: HashMap<IndicatorType, Option<f64>>,
    pub regime: Option<Regime>,
    pub position: Option<Position>,
    pub ret: Option<f64>,
    pub strategy_return: Option<f64>,
    pub equity: Option<f64>,
}

impl PricePoint {
    pub fn new(
        timestamp: NaiveDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
            indicators: HashMap::new(),
            regime: None,
            position: None,
            ret: None,
            strategy_return: None,
            equity: None,
        }
    }

    /// Indicator value, or `None` when absent or undefined.
    pub fn indicator(&self, indicator: &IndicatorType) -> Option<f64> {
        self.indicators.get(indicator).copied().flatten()
    }

    pub fn set_indicator(&mut self, indicator: IndicatorType, value: Option<f64>) {
        self.indicators.insert(indicator, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_point() -> PricePoint {
        let ts = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        PricePoint::new(ts, 100.0, 110.0, 90.0, 105.0, 50_000.0)
    }

    #[test]
    fn new_point_has_no_annotations() {
        let p = sample_point();
        assert!(p.indicators.is_empty());
        assert!(p.regime.is_none());
        assert!(p.position.is_none());
        assert!(p.ret.is_none());
        assert!(p.strategy_return.is_none());
        assert!(p.equity.is_none());
    }

    #[test]
    fn missing_and_undefined_indicator_both_read_as_none() {
        let mut p = sample_point();
        assert_eq!(p.indicator(&IndicatorType::Sma(20)), None);

        p.set_indicator(IndicatorType::Sma(20), None);
        assert_eq!(p.indicator(&IndicatorType::Sma(20)), None);

        p.set_indicator(IndicatorType::Sma(20), Some(101.5));
        assert_eq!(p.indicator(&IndicatorType::Sma(20)), Some(101.5));
        assert_eq!(p.indicator(&IndicatorType::Sma(10)), None);
    }

    #[test]
    fn position_exposure() {
        assert_eq!(Position::Flat.exposure(), 0.0);
        assert_eq!(Position::Long.exposure(), 1.0);
        assert_eq!(Position::from_signal(true), Position::Long);
        assert_eq!(Position::default(), Position::Flat);
    }

    #[test]
    fn regime_constants() {
        assert_eq!(Regime::LOW_VOLATILITY.to_string(), "0");
        assert_eq!(Regime::HIGH_VOLATILITY.to_string(), "1");
        assert!(Regime::LOW_VOLATILITY < Regime::HIGH_VOLATILITY);
    }
}
