//! Indicator derivation for one price series.
//!
//! `derive` is a pure function of the series and the MACD mode. Trend EMAs
//! (20/50) are always computed, independent of the momentum model.

use super::ema::Ema;
use super::macd::{macd_lines, MacdLines, MacdMode, SIGNAL_SPAN, SLOW_SPAN};
use super::sma::VolumeSma;
use super::Indicator;
use crate::domain::{finite, PriceSeries};
use thiserror::Error;

pub const TREND_FAST_SPAN: usize = 20;
pub const TREND_SLOW_SPAN: usize = 50;
pub const VOLUME_MEAN_PERIOD: usize = 20;

/// Fewest bars for which every indicator is meaningful: the longer of EMA50
/// and MACD's slow span plus its signal span.
pub const MIN_BARS: usize = if TREND_SLOW_SPAN > SLOW_SPAN + SIGNAL_SPAN {
    TREND_SLOW_SPAN
} else {
    SLOW_SPAN + SIGNAL_SPAN
};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum IndicatorError {
    #[error("insufficient history: need {required} bars, have {available}")]
    InsufficientHistory { required: usize, available: usize },

    #[error("indicator index {index} out of range (series length {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Named per-bar lines held by an [`IndicatorSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    Ema20,
    Ema50,
    Macd,
    Signal,
    Histogram,
    VolumeMean20,
}

/// Per-bar indicators aligned 1:1 with the source series.
#[derive(Debug, Clone)]
pub struct IndicatorSet {
    mode: MacdMode,
    ema20: Vec<f64>,
    ema50: Vec<f64>,
    macd: MacdLines,
    volume_mean20: Vec<f64>,
}

impl IndicatorSet {
    pub fn mode(&self) -> MacdMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.ema20.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ema20.is_empty()
    }

    pub fn line(&self, line: Line) -> &[f64] {
        match line {
            Line::Ema20 => &self.ema20,
            Line::Ema50 => &self.ema50,
            Line::Macd => &self.macd.macd,
            Line::Signal => &self.macd.signal,
            Line::Histogram => &self.macd.histogram,
            Line::VolumeMean20 => &self.volume_mean20,
        }
    }

    /// Value of `line` at `index`, `None` where the indicator is undefined.
    pub fn get(&self, line: Line, index: usize) -> Result<Option<f64>, IndicatorError> {
        let values = self.line(line);
        values
            .get(index)
            .map(|&v| finite(v))
            .ok_or(IndicatorError::IndexOutOfRange {
                index,
                len: values.len(),
            })
    }
}

/// Derive every indicator the rule set needs.
pub fn derive(series: &PriceSeries, mode: MacdMode) -> Result<IndicatorSet, IndicatorError> {
    if series.len() < MIN_BARS {
        return Err(IndicatorError::InsufficientHistory {
            required: MIN_BARS,
            available: series.len(),
        });
    }

    let bars = series.bars();
    let closes = series.closes();
    let volumes = series.volumes();

    Ok(IndicatorSet {
        mode,
        ema20: Ema::new(TREND_FAST_SPAN).compute(bars),
        ema50: Ema::new(TREND_SLOW_SPAN).compute(bars),
        macd: macd_lines(mode.model().as_ref(), &closes, Some(&volumes)),
        volume_mean20: VolumeSma::new(VOLUME_MEAN_PERIOD).compute(bars),
    })
}

/// Histogram of a single MACD mode, for the momentum agreement overlay.
pub fn histogram(series: &PriceSeries, mode: MacdMode) -> Vec<f64> {
    let closes = series.closes();
    let volumes = series.volumes();
    macd_lines(mode.model().as_ref(), &closes, Some(&volumes)).histogram
}
