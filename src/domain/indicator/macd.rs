//! MACD (Moving Average Convergence Divergence).
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! Each EMA seeds with its first input and uses k = 2 / (span + 1), so every
//! point is defined. Default parameters: fast=12, slow=26, signal=9.

use crate::domain::indicator::{IndicatorType, closes, write_field};
use crate::domain::price_point::PricePoint;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

fn ema(values: &[f64], span: usize) -> Vec<f64> {
    let k = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;
    for &v in values {
        let next = match prev {
            None => v,
            Some(p) => v * k + p * (1.0 - k),
        };
        out.push(next);
        prev = Some(next);
    }
    out
}

pub struct MacdLines {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub fn macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> MacdLines {
    let fast_ema = ema(closes, fast);
    let slow_ema = ema(closes, slow);
    let line: Vec<f64> = fast_ema.iter().zip(&slow_ema).map(|(f, s)| f - s).collect();
    let signal = ema(&line, signal);
    let histogram = line.iter().zip(&signal).map(|(m, s)| m - s).collect();
    MacdLines {
        line,
        signal,
        histogram,
    }
}

/// Writes `macd`, `macd_signal` and `macd_hist`.
pub fn add_macd(series: &mut [PricePoint], fast: usize, slow: usize, signal: usize) {
    let lines = macd(&closes(series), fast, slow, signal);
    let wrap = |v: &[f64]| v.iter().copied().map(Some).collect::<Vec<_>>();
    write_field(series, IndicatorType::Macd, &wrap(&lines.line));
    write_field(series, IndicatorType::MacdSignal, &wrap(&lines.signal));
    write_field(series, IndicatorType::MacdHist, &wrap(&lines.histogram));
}
