//! Bollinger Bands.
//!
//! Middle Band = SMA(n)
//! Upper Band = SMA(n) + k * STDDEV(n)
//! Lower Band = SMA(n) - k * STDDEV(n)
//!
//! STDDEV is population standard deviation. Default parameters: n=20, k=2.0.
//! Warmup: first (n-1) points are undefined.

use crate::domain::indicator::sma::simple_moving_average;
use crate::domain::indicator::stddev::rolling_stddev;
use crate::domain::indicator::{IndicatorType, closes, write_field};
use crate::domain::price_point::PricePoint;

pub const DEFAULT_WINDOW: usize = 20;
pub const DEFAULT_NUM_STD: f64 = 2.0;

/// Returns (upper, lower) band values per point.
pub fn bollinger_bands(
    closes: &[f64],
    window: usize,
    num_std: f64,
) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
    let sma = simple_moving_average(closes, window);
    let sd = rolling_stddev(closes, window);

    sma.iter()
        .zip(&sd)
        .map(|(m, s)| match (m, s) {
            (Some(m), Some(s)) => (Some(m + num_std * s), Some(m - num_std * s)),
            _ => (None, None),
        })
        .unzip()
}

/// Writes `bb_upper_{window}` and `bb_lower_{window}`.
pub fn add_bollinger_bands(series: &mut [PricePoint], window: usize, num_std: f64) {
    let (upper, lower) = bollinger_bands(&closes(series), window, num_std);
    write_field(series, IndicatorType::BollingerUpper(window), &upper);
    write_field(series, IndicatorType::BollingerLower(window), &lower);
}
