//! Exponential Moving Average (EMA), adjust-free recursive form.
//!
//! EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1], alpha = 2 / (span + 1).
//! Seed: the first defined input value, no warm-up window.
//! Lookback: 0.
//!
//! An undefined (non-finite) input yields an undefined output at that point
//! only; the recursion carries the previous state across it.

use super::Indicator;
use crate::domain::PriceBar;

#[derive(Debug, Clone)]
pub struct Ema {
    span: usize,
    name: String,
}

impl Ema {
    pub fn new(span: usize) -> Self {
        assert!(span >= 1, "EMA span must be >= 1");
        Self {
            span,
            name: format!("ema_{span}"),
        }
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        ema_of_series(&closes, self.span)
    }
}

/// Smoothing factor for a span.
pub fn alpha(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

/// Compute the EMA of an arbitrary series.
///
/// Used by MACD and the volume-weighted variants, which smooth derived series
/// that may contain undefined points.
pub fn ema_of_series(values: &[f64], span: usize) -> Vec<f64> {
    let mut result = vec![f64::NAN; values.len()];
    if span == 0 {
        return result;
    }

    let a = alpha(span);
    let mut prev: Option<f64> = None;

    for (out, &v) in result.iter_mut().zip(values) {
        if !v.is_finite() {
            continue;
        }
        let ema = match prev {
            None => v,
            Some(p) => a * v + (1.0 - a) * p,
        };
        *out = ema;
        prev = Some(ema);
    }

    result
}
