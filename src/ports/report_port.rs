//! Series export port trait.

use crate::domain::error::BacktestError;
use crate::domain::price_point::PricePoint;

/// Port for writing an annotated series after a run.
pub trait ReportPort {
    fn write_series(&self, series: &[PricePoint], output_path: &str) -> Result<(), BacktestError>;
}
