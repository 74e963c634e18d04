#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::io::Write;
use std::process::ExitCode;
use wfbacktest::domain::error::BacktestError;
use wfbacktest::domain::price_point::PricePoint;
use wfbacktest::ports::data_port::DataPort;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_series(mut self, source: &str, series: Vec<PricePoint>) -> Self {
        self.data.insert(source.to_string(), series);
        self
    }

    pub fn with_error(mut self, source: &str, reason: &str) -> Self {
        self.errors.insert(source.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn load_series(&self, source: &str) -> Result<Vec<PricePoint>, BacktestError> {
        if let Some(reason) = self.errors.get(source) {
            return Err(BacktestError::DataLoad {
                source_name: source.to_string(),
                reason: reason.clone(),
            });
        }
        match self.data.get(source) {
            Some(series) if !series.is_empty() => Ok(series.clone()),
            _ => Err(BacktestError::EmptySeries {
                source_name: source.to_string(),
            }),
        }
    }
}

pub fn start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

pub fn make_point(hour: i64, close: f64) -> PricePoint {
    PricePoint::new(
        start_time() + Duration::hours(hour),
        close,
        close + 1.0,
        close - 1.0,
        close,
        1000.0,
    )
}

pub fn make_series(closes: &[f64]) -> Vec<PricePoint> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_point(i as i64, c))
        .collect()
}

/// Upward drift with a sine wobble, so every window sees both signs.
pub fn wavy_closes(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64;
            100.0 + 0.3 * t + 5.0 * (t / 4.0).sin() + 2.0 * (t / 1.7).cos()
        })
        .collect()
}

pub fn series_csv(closes: &[f64]) -> String {
    let mut out = String::from("timestamp,open,high,low,close,volume\n");
    for p in make_series(closes) {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            p.timestamp.format("%Y-%m-%d %H:%M:%S"),
            p.open,
            p.high,
            p.low,
            p.close,
            p.volume
        ));
    }
    out
}

pub fn write_temp_file(content: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

pub fn is_success(code: ExitCode) -> bool {
    format!("{:?}", code) == format!("{:?}", ExitCode::SUCCESS)
}

pub fn same_code(a: ExitCode, b: ExitCode) -> bool {
    format!("{:?}", a) == format!("{:?}", b)
}
