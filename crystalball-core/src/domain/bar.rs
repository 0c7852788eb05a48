//! Price bars and the validated per-ticker series built from them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Daily OHLCV bar for a single ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PriceBar {
    /// Basic OHLC sanity: all prices finite and positive, high >= low.
    pub fn is_sane(&self) -> bool {
        let prices = [self.open, self.high, self.low, self.close];
        prices.iter().all(|p| p.is_finite() && *p > 0.0) && self.high >= self.low
    }
}

/// Reasons a bar list cannot become a [`PriceSeries`].
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SeriesError {
    #[error("bar {index} ({date}) is not after the previous bar ({previous})")]
    OutOfOrder {
        index: usize,
        date: NaiveDate,
        previous: NaiveDate,
    },

    #[error("malformed bar {index} ({date}): non-positive or non-finite price")]
    MalformedBar { index: usize, date: NaiveDate },
}

/// Chronological, immutable bar history for one ticker.
///
/// Dates are strictly increasing. Whether the series is long enough for
/// the indicator spans is decided by the indicator engine, not here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    ticker: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(ticker: impl Into<String>, bars: Vec<PriceBar>) -> Result<Self, SeriesError> {
        for (i, bar) in bars.iter().enumerate() {
            if !bar.is_sane() {
                return Err(SeriesError::MalformedBar {
                    index: i,
                    date: bar.date,
                });
            }
            if i > 0 && bar.date <= bars[i - 1].date {
                return Err(SeriesError::OutOfOrder {
                    index: i,
                    date: bar.date,
                    previous: bars[i - 1].date,
                });
            }
        }
        Ok(Self {
            ticker: ticker.into(),
            bars,
        })
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume as f64).collect()
    }
}
