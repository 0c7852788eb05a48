//! Indicator engine: trend EMAs, rolling volume mean, and the MACD family.
//!
//! Indicators are pure functions: bar history in, numeric series out, the
//! same length as the input. Undefined points are NaN inside a series and
//! become `None` when read through [`IndicatorSet::get`].

pub mod ema;
pub mod engine;
pub mod macd;
pub mod sma;

pub use ema::{ema_of_series, Ema};
pub use engine::{derive, histogram, IndicatorError, IndicatorSet, Line, MIN_BARS};
pub use macd::{
    macd_lines, ClassicMacd, MacdLines, MacdMode, MomentumModel, VolumeWeightedMacd,
};
pub use sma::{sma_of_series, VolumeSma};

use crate::domain::PriceBar;

/// Single-series indicator over a bar history.
///
/// No value at bar t may depend on bars after t.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "ema_20", "volume_sma_20").
    fn name(&self) -> &str;

    /// Number of leading bars that are always undefined.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar history.
    fn compute(&self, bars: &[PriceBar]) -> Vec<f64>;
}

/// Create synthetic bars from close prices for testing.
///
/// open = prev_close (or close for the first bar), high/low = +/- 1 around
/// the body, volume = 1000, consecutive calendar days.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<PriceBar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            PriceBar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
