//! RSI (Relative Strength Index) over simple-average gains and losses.
//!
//! - gain/loss series start with 0 for the first price (no prior close)
//! - avg_gain, avg_loss = SMA(n) of gains, losses
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! Undefined during warmup and whenever avg_loss == 0.

use crate::domain::indicator::sma::simple_moving_average;

pub fn relative_strength_index(closes: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut gains = Vec::with_capacity(closes.len());
    let mut losses = Vec::with_capacity(closes.len());

    for i in 0..closes.len() {
        if i == 0 {
            gains.push(0.0);
            losses.push(0.0);
            continue;
        }
        let change = closes[i] - closes[i - 1];
        gains.push(change.max(0.0));
        losses.push((-change).max(0.0));
    }

    let avg_gain = simple_moving_average(&gains, window);
    let avg_loss = simple_moving_average(&losses, window);

    avg_gain
        .into_iter()
        .zip(avg_loss)
        .map(|(g, l)| match (g, l) {
            (Some(g), Some(l)) if l != 0.0 => Some(100.0 - (100.0 / (1.0 + g / l))),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rsi_warmup_is_undefined() {
        let rsi = relative_strength_index(&[10.0, 9.0, 10.0, 9.0, 10.0], 3);
        assert_eq!(rsi[0], None);
        assert_eq!(rsi[1], None);
        assert!(rsi[2].is_some());
    }

    #[test]
    fn rsi_known_value() {
        // changes: 0, -1, +2, -1 → window 3 at i=3: gains 2/3, losses 2/3
        let rsi = relative_strength_index(&[10.0, 9.0, 11.0, 10.0], 3);
        assert_relative_eq!(rsi[3].unwrap(), 50.0, epsilon = 1e-9);
    }

    #[test]
    fn rsi_strong_uptrend_is_undefined_without_losses() {
        let rsi = relative_strength_index(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert!(rsi.iter().all(|v| v.is_none()));
    }

    #[test]
    fn rsi_bounded() {
        let closes = [44.0, 44.3, 44.1, 43.6, 44.3, 44.8, 45.1, 45.4, 45.8, 46.1, 45.9];
        let rsi = relative_strength_index(&closes, 5);
        for v in rsi.into_iter().flatten() {
            assert!((0.0..=100.0).contains(&v));
        }
    }
}
