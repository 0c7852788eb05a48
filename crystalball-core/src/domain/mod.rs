//! Domain types shared across the screener.

pub mod bar;

pub use bar::{PriceBar, PriceSeries, SeriesError};

/// Convert a raw indicator value into a usable scalar.
///
/// Every read of a single point from a numeric series goes through here, so
/// NaN and infinities never reach a comparison.
pub fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}
