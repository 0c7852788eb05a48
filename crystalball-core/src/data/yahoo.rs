//! Yahoo Finance data provider.
//!
//! Fetches daily OHLCV bars from Yahoo's v8 chart API, one blocking request
//! per call. Retrying is left to the fetcher so that requests stay strictly
//! sequential across the whole scan.
//!
//! Yahoo Finance has no official API and is subject to unannounced format changes.

use super::provider::{DataError, DataProvider};
use crate::domain::PriceBar;
use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use serde::Deserialize;
use std::time::Duration;

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

/// Yahoo Finance data provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
}

impl YahooProvider {
    pub fn new() -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Build the chart API URL for a ticker and a trailing window ending `today`.
    fn chart_url(ticker: &str, window_days: u32, today: NaiveDate) -> Result<String, DataError> {
        let out_of_range =
            || DataError::Other(format!("window of {window_days} days is out of date range"));
        let start = today
            .checked_sub_signed(ChronoDuration::days(i64::from(window_days)))
            .ok_or_else(out_of_range)?;
        let end = today.succ_opt().ok_or_else(out_of_range)?;
        let start_ts = start.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
        let end_ts = end.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
        Ok(format!(
            "https://query2.finance.yahoo.com/v8/finance/chart/{ticker}\
             ?period1={start_ts}&period2={end_ts}&interval=1d&events=history"
        ))
    }

    /// Parse a chart API body into bars.
    ///
    /// Rows missing any of open/high/low/close (holidays, halted sessions,
    /// partial prints) are skipped. A missing volume reads as 0.
    fn parse_response(ticker: &str, body: &str) -> Result<Vec<PriceBar>, DataError> {
        let resp: ChartResponse = serde_json::from_str(body).map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to parse response for {ticker}: {e}"))
        })?;

        let result = resp.chart.result.ok_or_else(|| {
            if let Some(err) = resp.chart.error {
                if err.code == "Not Found" {
                    DataError::SymbolNotFound {
                        symbol: ticker.to_string(),
                    }
                } else {
                    DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
                }
            } else {
                DataError::ResponseFormatChanged("empty result with no error".into())
            }
        })?;

        let Some(data) = result.into_iter().next() else {
            return Ok(Vec::new());
        };
        // No timestamps means no trading days in the window.
        let Some(timestamps) = data.timestamp else {
            return Ok(Vec::new());
        };
        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;

        let mut bars = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let date = chrono::DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.naive_utc().date())
                .ok_or_else(|| {
                    DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
                })?;

            let field = |v: &[Option<f64>]| v.get(i).copied().flatten();
            let (Some(open), Some(high), Some(low), Some(close)) = (
                field(quote.open.as_slice()),
                field(quote.high.as_slice()),
                field(quote.low.as_slice()),
                field(quote.close.as_slice()),
            ) else {
                continue;
            };

            bars.push(PriceBar {
                date,
                open,
                high,
                low,
                close,
                volume: quote.volume.get(i).copied().flatten().unwrap_or(0),
            });
        }

        Ok(bars)
    }
}

impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn daily_bars(&self, ticker: &str, window_days: u32) -> Result<Vec<PriceBar>, DataError> {
        let url = Self::chart_url(ticker, window_days, Utc::now().date_naive())?;

        let resp = self.client.get(&url).send().map_err(|e| {
            if e.is_timeout() {
                DataError::NetworkUnreachable(format!("timed out: {e}"))
            } else {
                DataError::NetworkUnreachable(e.to_string())
            }
        })?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(DataError::RateLimited { retry_after_secs });
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DataError::SymbolNotFound {
                symbol: ticker.to_string(),
            });
        }
        if !status.is_success() {
            return Err(DataError::Other(format!("HTTP {status} for {ticker}")));
        }

        let body = resp
            .text()
            .map_err(|e| DataError::NetworkUnreachable(format!("failed to read body: {e}")))?;
        Self::parse_response(ticker, &body)
    }
}
