//! Rolling population standard deviation.
//!
//! STDDEV(n)[i] = sqrt(sum((x[i-j] - mean)^2 for j in 0..n) / n)
//! Warmup: first (n-1) values are undefined.

pub fn rolling_stddev(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            Some(population_stddev(&values[i + 1 - window..=i]))
        })
        .collect()
}

/// Population standard deviation of a slice; 0.0 when empty.
pub fn population_stddev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}
