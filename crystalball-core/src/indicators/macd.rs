//! MACD family: classic price MACD and volume-weighted MACD-V.
//!
//! Both variants share one capability: turn closes (and optionally volumes)
//! into a momentum line. Signal and histogram are derived identically:
//! signal = EMA(macd, 9), histogram = macd - signal.

use super::ema::ema_of_series;
use serde::{Deserialize, Serialize};

pub const FAST_SPAN: usize = 12;
pub const SLOW_SPAN: usize = 26;
pub const SIGNAL_SPAN: usize = 9;

/// Derives a momentum line from a price series and an optional volume series.
pub trait MomentumModel: Send + Sync {
    fn name(&self) -> &str;

    /// Output is aligned 1:1 with `closes`; undefined points are NaN.
    fn momentum_line(&self, closes: &[f64], volumes: Option<&[f64]>) -> Vec<f64>;
}

/// EMA(close, fast) - EMA(close, slow).
#[derive(Debug, Clone)]
pub struct ClassicMacd {
    fast: usize,
    slow: usize,
}

impl ClassicMacd {
    pub fn new(fast: usize, slow: usize) -> Self {
        assert!(fast < slow, "MACD fast span must be shorter than slow span");
        Self { fast, slow }
    }
}

impl Default for ClassicMacd {
    fn default() -> Self {
        Self::new(FAST_SPAN, SLOW_SPAN)
    }
}

impl MomentumModel for ClassicMacd {
    fn name(&self) -> &str {
        "macd"
    }

    fn momentum_line(&self, closes: &[f64], _volumes: Option<&[f64]>) -> Vec<f64> {
        let fast = ema_of_series(closes, self.fast);
        let slow = ema_of_series(closes, self.slow);
        fast.iter().zip(&slow).map(|(f, s)| f - s).collect()
    }
}

/// VWEMA(fast) - VWEMA(slow), where VWEMA = EMA(close*volume) / EMA(volume).
///
/// Without volumes every point is undefined.
#[derive(Debug, Clone)]
pub struct VolumeWeightedMacd {
    fast: usize,
    slow: usize,
}

impl VolumeWeightedMacd {
    pub fn new(fast: usize, slow: usize) -> Self {
        assert!(fast < slow, "MACD-V fast span must be shorter than slow span");
        Self { fast, slow }
    }
}

impl Default for VolumeWeightedMacd {
    fn default() -> Self {
        Self::new(FAST_SPAN, SLOW_SPAN)
    }
}

impl MomentumModel for VolumeWeightedMacd {
    fn name(&self) -> &str {
        "macd_v"
    }

    fn momentum_line(&self, closes: &[f64], volumes: Option<&[f64]>) -> Vec<f64> {
        let Some(volumes) = volumes else {
            return vec![f64::NAN; closes.len()];
        };
        let fast = vwema(closes, volumes, self.fast);
        let slow = vwema(closes, volumes, self.slow);
        fast.iter().zip(&slow).map(|(f, s)| f - s).collect()
    }
}

/// Volume-weighted EMA. Undefined wherever the volume EMA is exactly zero.
pub fn vwema(closes: &[f64], volumes: &[f64], span: usize) -> Vec<f64> {
    let weighted: Vec<f64> = closes.iter().zip(volumes).map(|(c, v)| c * v).collect();
    let num = ema_of_series(&weighted, span);
    let den = ema_of_series(volumes, span);
    num.iter()
        .zip(&den)
        .map(|(&n, &d)| if d == 0.0 { f64::NAN } else { n / d })
        .collect()
}

/// Which momentum model the scan runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MacdMode {
    #[default]
    Classic,
    VolumeWeighted,
}

impl MacdMode {
    pub fn model(self) -> Box<dyn MomentumModel> {
        match self {
            MacdMode::Classic => Box::new(ClassicMacd::default()),
            MacdMode::VolumeWeighted => Box::new(VolumeWeightedMacd::default()),
        }
    }

    /// The other mode, used for the momentum agreement overlay.
    pub fn counterpart(self) -> Self {
        match self {
            MacdMode::Classic => MacdMode::VolumeWeighted,
            MacdMode::VolumeWeighted => MacdMode::Classic,
        }
    }
}

/// MACD line, signal line and histogram, aligned with the input.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdLines {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// Run a momentum model and derive its signal and histogram.
pub fn macd_lines(model: &dyn MomentumModel, closes: &[f64], volumes: Option<&[f64]>) -> MacdLines {
    let macd = model.momentum_line(closes, volumes);
    let signal = ema_of_series(&macd, SIGNAL_SPAN);
    let histogram = macd.iter().zip(&signal).map(|(m, s)| m - s).collect();
    MacdLines {
        macd,
        signal,
        histogram,
    }
}
