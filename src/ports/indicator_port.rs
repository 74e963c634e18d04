//! Indicator provider port trait.

use crate::domain::price_point::PricePoint;

/// Annotates a series with indicator fields for one window.
///
/// Implementations must write exactly one value (possibly `None`) per point
/// for each field they produce and never reorder or drop points.
pub trait IndicatorProvider: Send + Sync {
    fn annotate(&self, series: &mut [PricePoint], window: usize);
}
