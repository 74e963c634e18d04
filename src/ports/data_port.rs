//! Price data access port trait.

use crate::domain::error::BacktestError;
use crate::domain::price_point::PricePoint;

pub trait DataPort {
    /// Loads a chronologically ordered series with OHLCV populated.
    fn load_series(&self, source: &str) -> Result<Vec<PricePoint>, BacktestError>;
}
