//! Resilient, sequential acquisition of one ticker's daily series.
//!
//! Each fetch makes up to `max_retries + 1` provider requests, one at a time,
//! sleeping `base_delay * (attempt + 1)` between failed attempts (linear
//! backoff: 1x, 2x, 3x base). Nothing here ever issues requests in parallel;
//! the upstream rate-limits aggressively.

use super::cache::{FetchCache, FetchKey};
use super::provider::DataProvider;
use crate::domain::{PriceSeries, SeriesError};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from a single ticker fetch.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    #[error("data unavailable for {ticker} after {attempts} attempt(s): {last_error}")]
    DataUnavailable {
        ticker: String,
        attempts: u32,
        last_error: String,
    },

    #[error("invalid series for {ticker}: {source}")]
    InvalidSeries {
        ticker: String,
        #[source]
        source: SeriesError,
    },
}

/// Where the fetcher waits between attempts.
pub trait Backoff: Send + Sync {
    fn sleep(&self, delay: Duration);
}

/// Blocks the calling thread for the full delay.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleep;

impl Backoff for ThreadSleep {
    fn sleep(&self, delay: Duration) {
        std::thread::sleep(delay);
    }
}

/// Delay before the attempt following failed attempt `attempt` (0-based).
/// Saturates at `Duration::MAX`.
pub fn backoff_delay(base_delay: Duration, attempt: u32) -> Duration {
    base_delay.saturating_mul(attempt.saturating_add(1))
}

/// Fetches series through a provider, memoizing successes in `cache`.
pub struct SeriesFetcher<'a> {
    provider: &'a dyn DataProvider,
    cache: &'a FetchCache,
    backoff: &'a dyn Backoff,
}

impl<'a> SeriesFetcher<'a> {
    pub fn new(provider: &'a dyn DataProvider, cache: &'a FetchCache) -> Self {
        Self {
            provider,
            cache,
            backoff: &ThreadSleep,
        }
    }

    /// Replace the thread-sleep backoff (tests record delays instead).
    pub fn with_backoff(mut self, backoff: &'a dyn Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Fetch the trailing `window_days` of daily bars for `ticker`.
    ///
    /// Returns as soon as an attempt yields a non-empty bar list. Transport
    /// errors and empty answers are retried; a non-empty answer that fails
    /// series validation is returned immediately as `InvalidSeries`.
    pub fn fetch(
        &self,
        ticker: &str,
        window_days: u32,
        max_retries: u32,
        base_delay: Duration,
    ) -> Result<Arc<PriceSeries>, FetchError> {
        let key = FetchKey {
            ticker: ticker.to_string(),
            window_days,
            max_retries,
            base_delay,
        };
        if let Some(series) = self.cache.get(&key) {
            debug!(ticker, window_days, "fetch cache hit");
            return Ok(series);
        }

        let attempts = max_retries.saturating_add(1);
        let mut last_error = String::from("no attempt made");

        for attempt in 0..attempts {
            match self.provider.daily_bars(ticker, window_days) {
                Ok(bars) if !bars.is_empty() => {
                    let series = PriceSeries::new(ticker, bars).map_err(|source| {
                        FetchError::InvalidSeries {
                            ticker: ticker.to_string(),
                            source,
                        }
                    })?;
                    let series = Arc::new(series);
                    self.cache.insert(key, Arc::clone(&series));
                    debug!(ticker, bars = series.len(), attempt, "fetched series");
                    return Ok(series);
                }
                Ok(_) => last_error = "provider returned no bars".to_string(),
                Err(e) => last_error = e.to_string(),
            }

            if attempt + 1 < attempts {
                let delay = backoff_delay(base_delay, attempt);
                warn!(
                    ticker,
                    attempt = attempt + 1,
                    of = attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %last_error,
                    "fetch attempt failed, backing off"
                );
                self.backoff.sleep(delay);
            }
        }

        Err(FetchError::DataUnavailable {
            ticker: ticker.to_string(),
            attempts,
            last_error,
        })
    }
}
