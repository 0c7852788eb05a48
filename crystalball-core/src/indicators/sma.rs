//! Simple Moving Average (SMA) over volume.
//!
//! Rolling mean over a fixed window. Lookback: period - 1 (first valid value
//! at index period-1). A window containing any undefined value is undefined.

use super::Indicator;
use crate::domain::PriceBar;

/// Rolling mean of daily volume.
#[derive(Debug, Clone)]
pub struct VolumeSma {
    period: usize,
    name: String,
}

impl VolumeSma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: format!("volume_sma_{period}"),
        }
    }
}

impl Indicator for VolumeSma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        let volumes: Vec<f64> = bars.iter().map(|b| b.volume as f64).collect();
        sma_of_series(&volumes, self.period)
    }
}

/// Rolling mean of an arbitrary series.
pub fn sma_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }

    for end in (period - 1)..n {
        let window = &values[(end + 1 - period)..=end];
        if window.iter().all(|v| v.is_finite()) {
            result[end] = window.iter().sum::<f64>() / period as f64;
        }
    }

    result
}
