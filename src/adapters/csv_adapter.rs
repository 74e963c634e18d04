//! CSV price data and series export adapters.
//!
//! Input columns: `timestamp,open,high,low,close,volume` with a header row.

use crate::domain::error::BacktestError;
use crate::domain::indicator::IndicatorType;
use crate::domain::price_point::PricePoint;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::StringRecord;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, source: &str) -> PathBuf {
        self.base_path.join(source)
    }
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD`, or epoch
/// milliseconds.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0);
    }
    raw.parse::<i64>()
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .map(|dt| dt.naive_utc())
}

fn parse_field(record: &StringRecord, idx: usize, name: &str, row: usize) -> Result<f64, BacktestError> {
    let raw = record.get(idx).ok_or_else(|| BacktestError::DataFormat {
        row,
        reason: format!("missing {} column", name),
    })?;
    let value: f64 = raw.trim().parse().map_err(|e| BacktestError::DataFormat {
        row,
        reason: format!("invalid {} value: {}", name, e),
    })?;
    if !value.is_finite() {
        return Err(BacktestError::DataFormat {
            row,
            reason: format!("non-finite {} value", name),
        });
    }
    Ok(value)
}

impl DataPort for CsvAdapter {
    fn load_series(&self, source: &str) -> Result<Vec<PricePoint>, BacktestError> {
        let path = self.csv_path(source);
        let content = fs::read_to_string(&path).map_err(|e| BacktestError::DataLoad {
            source_name: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut series = Vec::new();

        for (i, result) in rdr.records().enumerate() {
            let row = i + 1;
            let record = result.map_err(|e| BacktestError::DataFormat {
                row,
                reason: format!("CSV parse error: {}", e),
            })?;

            let ts_str = record.get(0).ok_or_else(|| BacktestError::DataFormat {
                row,
                reason: "missing timestamp column".into(),
            })?;
            let timestamp = parse_timestamp(ts_str).ok_or_else(|| BacktestError::DataFormat {
                row,
                reason: format!("invalid timestamp: {}", ts_str),
            })?;

            series.push(PricePoint::new(
                timestamp,
                parse_field(&record, 1, "open", row)?,
                parse_field(&record, 2, "high", row)?,
                parse_field(&record, 3, "low", row)?,
                parse_field(&record, 4, "close", row)?,
                parse_field(&record, 5, "volume", row)?,
            ));
        }

        if series.is_empty() {
            return Err(BacktestError::EmptySeries {
                source_name: path.display().to_string(),
            });
        }

        series.sort_by_key(|p| p.timestamp);
        Ok(series)
    }
}

/// Writes simulated series as CSV. Undefined values are empty cells.
pub struct CsvSeriesWriter;

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Indicator keys present anywhere in `series`, sorted by field name.
fn indicator_columns(series: &[PricePoint]) -> Vec<IndicatorType> {
    let mut keys: Vec<IndicatorType> = series
        .iter()
        .flat_map(|p| p.indicators.keys().copied())
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    keys.sort_by_key(|k| k.to_string());
    keys
}

impl ReportPort for CsvSeriesWriter {
    fn write_series(&self, series: &[PricePoint], output_path: &str) -> Result<(), BacktestError> {
        let to_io = |e: csv::Error| BacktestError::Io(e.into());
        let mut wtr = csv::Writer::from_path(output_path).map_err(to_io)?;

        let indicators = indicator_columns(series);
        let mut header: Vec<String> = [
            "timestamp",
            "close",
            "regime",
            "position",
            "return",
            "strategy_return",
            "equity",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        header.extend(indicators.iter().map(|k| k.to_string()));
        wtr.write_record(&header).map_err(to_io)?;

        for p in series {
            let mut row = vec![
                p.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                p.close.to_string(),
                p.regime.map(|r| r.to_string()).unwrap_or_default(),
                p.position.map(|pos| pos.to_string()).unwrap_or_default(),
                cell(p.ret),
                cell(p.strategy_return),
                cell(p.equity),
            ];
            row.extend(indicators.iter().map(|k| cell(p.indicator(k))));
            wtr.write_record(&row).map_err(to_io)?;
        }

        wtr.flush()?;
        Ok(())
    }
}
