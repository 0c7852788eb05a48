//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over quote sources (Yahoo Finance, fixtures)
//! so the fetcher can be exercised against mocks in tests.

use crate::domain::PriceBar;
use thiserror::Error;

/// Transport-level failures reported by a provider for a single request.
///
/// These are displayable as-is in the scan's failure log.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("data error: {0}")]
    Other(String),
}

/// A source of daily OHLCV bars.
///
/// One call is one upstream request. Providers never retry on their own;
/// retry and backoff belong to [`SeriesFetcher`](super::fetcher::SeriesFetcher).
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch the trailing `window_days` calendar days of daily bars for `ticker`.
    ///
    /// An empty vector is a valid (if unhelpful) answer.
    fn daily_bars(&self, ticker: &str, window_days: u32) -> Result<Vec<PriceBar>, DataError>;
}
