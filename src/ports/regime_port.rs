//! Regime labeler port trait.

use crate::domain::price_point::PricePoint;

/// Writes a regime tag (or `None`) onto every point of a series.
pub trait RegimeLabeler: Send + Sync {
    fn label(&self, series: &mut [PricePoint]);
}
