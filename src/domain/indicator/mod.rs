//! Technical indicators annotated onto a price series.
//!
//! - `IndicatorType`: indicator identity + window, the key a value is stored
//!   under on each `PricePoint`
//! - `TechnicalIndicators`: default `IndicatorProvider` writing SMA and RSI
//!   for a window
//! - `bollinger`, `macd`: extra annotators used for reporting

pub mod bollinger;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stddev;

use crate::domain::price_point::PricePoint;
use crate::ports::indicator_port::IndicatorProvider;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Rsi(usize),
    BollingerUpper(usize),
    BollingerLower(usize),
    Macd,
    MacdSignal,
    MacdHist,
}

/// Field names follow the `{name}_{window}` scheme, e.g. `sma_20`.
impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(window) => write!(f, "sma_{}", window),
            IndicatorType::Rsi(window) => write!(f, "rsi_{}", window),
            IndicatorType::BollingerUpper(window) => write!(f, "bb_upper_{}", window),
            IndicatorType::BollingerLower(window) => write!(f, "bb_lower_{}", window),
            IndicatorType::Macd => write!(f, "macd"),
            IndicatorType::MacdSignal => write!(f, "macd_signal"),
            IndicatorType::MacdHist => write!(f, "macd_hist"),
        }
    }
}

/// Writes `values[i]` under `indicator` on `series[i]`.
pub(crate) fn write_field(series: &mut [PricePoint], indicator: IndicatorType, values: &[Option<f64>]) {
    for (point, value) in series.iter_mut().zip(values) {
        point.set_indicator(indicator, *value);
    }
}

pub(crate) fn closes(series: &[PricePoint]) -> Vec<f64> {
    series.iter().map(|p| p.close).collect()
}

/// Default indicator provider: SMA and RSI over the same window.
#[derive(Debug, Clone, Copy, Default)]
pub struct TechnicalIndicators;

impl IndicatorProvider for TechnicalIndicators {
    fn annotate(&self, series: &mut [PricePoint], window: usize) {
        let closes = closes(series);
        let sma = sma::simple_moving_average(&closes, window);
        let rsi = rsi::relative_strength_index(&closes, window);
        write_field(series, IndicatorType::Sma(window), &sma);
        write_field(series, IndicatorType::Rsi(window), &rsi);
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::make_series;
    use super::*;

    #[test]
    fn indicator_type_display() {
        assert_eq!(IndicatorType::Sma(20).to_string(), "sma_20");
        assert_eq!(IndicatorType::Rsi(14).to_string(), "rsi_14");
        assert_eq!(IndicatorType::BollingerUpper(20).to_string(), "bb_upper_20");
        assert_eq!(IndicatorType::BollingerLower(20).to_string(), "bb_lower_20");
        assert_eq!(IndicatorType::MacdHist.to_string(), "macd_hist");
    }

    #[test]
    fn windows_are_distinct_keys() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(IndicatorType::Sma(10), 1.0);
        map.insert(IndicatorType::Sma(20), 2.0);
        assert_eq!(map.get(&IndicatorType::Sma(10)), Some(&1.0));
        assert_eq!(map.get(&IndicatorType::Sma(20)), Some(&2.0));
        assert_eq!(map.get(&IndicatorType::Rsi(10)), None);
    }

    #[test]
    fn technical_indicators_write_sma_and_rsi() {
        let mut series = make_series(&[10.0, 11.0, 12.0, 11.0, 13.0]);
        TechnicalIndicators.annotate(&mut series, 3);

        assert_eq!(series[0].indicator(&IndicatorType::Sma(3)), None);
        assert_eq!(series[1].indicator(&IndicatorType::Sma(3)), None);
        assert_eq!(series[2].indicator(&IndicatorType::Sma(3)), Some(11.0));
        assert!(series[4].indicators.contains_key(&IndicatorType::Rsi(3)));
    }

    #[test]
    fn annotating_two_windows_keeps_both() {
        let mut series = make_series(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        TechnicalIndicators.annotate(&mut series, 2);
        TechnicalIndicators.annotate(&mut series, 4);

        assert_eq!(series[4].indicator(&IndicatorType::Sma(2)), Some(13.5));
        assert_eq!(series[4].indicator(&IndicatorType::Sma(4)), Some(12.5));
    }

    #[test]
    fn empty_series_is_untouched() {
        let mut series = make_series(&[]);
        TechnicalIndicators.annotate(&mut series, 5);
        assert!(series.is_empty());
    }
}
