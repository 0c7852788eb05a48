//! Scan orchestration: the whole universe, one ticker at a time.
//!
//! For each ticker, in order: fetch → derive indicators → evaluate rules →
//! score → retain per policy. A ticker that fails at any step lands in the
//! failure log and the scan moves on; only an invalid configuration stops a
//! scan, and it does so before the first request.

use crate::config::{ConfigError, ScanConfig};
use crate::ranker::rank;
use crystalball_core::data::{FetchError, SeriesFetcher};
use crystalball_core::indicators::{derive, histogram, IndicatorError};
use crystalball_core::rules::{evaluate, EvaluationResult};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Why a single ticker produced no row.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TickerError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Indicator(#[from] IndicatorError),
}

/// One entry of the failure log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanFailure {
    pub ticker: String,
    pub reason: String,
}

/// Ranked rows plus the failure log of a single scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanReport {
    pub rows: Vec<EvaluationResult>,
    pub failures: Vec<ScanFailure>,
}

impl ScanReport {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.failures.is_empty()
    }
}

/// Progress callbacks for a scan.
pub trait ScanProgress {
    /// Called before a ticker is fetched.
    fn on_start(&self, ticker: &str, index: usize, total: usize);

    /// Called once a ticker is evaluated or has failed.
    fn on_complete(
        &self,
        ticker: &str,
        index: usize,
        total: usize,
        result: &Result<EvaluationResult, TickerError>,
    );

    /// Called after ranking.
    fn on_scan_complete(&self, report: &ScanReport, total: usize);
}

/// Silent progress.
pub struct NoProgress;

impl ScanProgress for NoProgress {
    fn on_start(&self, _ticker: &str, _index: usize, _total: usize) {}

    fn on_complete(
        &self,
        _ticker: &str,
        _index: usize,
        _total: usize,
        _result: &Result<EvaluationResult, TickerError>,
    ) {
    }

    fn on_scan_complete(&self, _report: &ScanReport, _total: usize) {}
}

/// Progress reported through `tracing`.
pub struct TracingProgress;

impl ScanProgress for TracingProgress {
    fn on_start(&self, ticker: &str, index: usize, total: usize) {
        info!("[{}/{}] scanning {ticker}", index + 1, total);
    }

    fn on_complete(
        &self,
        ticker: &str,
        _index: usize,
        _total: usize,
        result: &Result<EvaluationResult, TickerError>,
    ) {
        match result {
            Ok(row) => info!(
                ticker,
                score = row.score,
                status = %row.status,
                trend = row.trend_ok,
                volume = row.volume_ok,
                rr = row.risk_reward_ok,
                "evaluated"
            ),
            Err(e) => warn!(ticker, error = %e, "ticker failed"),
        }
    }

    fn on_scan_complete(&self, report: &ScanReport, total: usize) {
        info!(
            tickers = total,
            retained = report.rows.len(),
            failed = report.failures.len(),
            "scan complete"
        );
    }
}

/// Evaluate one ticker end to end.
pub fn scan_ticker(
    ticker: &str,
    config: &ScanConfig,
    base_delay: Duration,
    fetcher: &SeriesFetcher<'_>,
) -> Result<EvaluationResult, TickerError> {
    let series = fetcher.fetch(ticker, config.window_days, config.max_retries, base_delay)?;
    let indicators = derive(&series, config.macd_mode)?;
    let counterpart = histogram(&series, config.macd_mode.counterpart());
    let evaluation = evaluate(&series, &indicators, &counterpart, &config.rule_params())?;
    Ok(EvaluationResult::from_evaluation(
        ticker,
        &evaluation,
        config.scoring_policy,
        &config.sizing(),
    ))
}

/// Scan `universe` in order and return the ranked report.
///
/// An empty universe yields an empty report.
pub fn run_scan<S: AsRef<str>>(
    universe: &[S],
    config: &ScanConfig,
    fetcher: &SeriesFetcher<'_>,
    progress: &dyn ScanProgress,
) -> Result<ScanReport, ConfigError> {
    config.validate()?;
    let base_delay = config.base_delay()?;
    let total = universe.len();

    let mut rows = Vec::new();
    let mut failures = Vec::new();

    for (i, ticker) in universe.iter().enumerate() {
        let ticker = ticker.as_ref();
        progress.on_start(ticker, i, total);

        let result = scan_ticker(ticker, config, base_delay, fetcher);
        progress.on_complete(ticker, i, total, &result);

        match result {
            Ok(row) if config.scoring_policy.retains(row.status) => rows.push(row),
            Ok(_) => {}
            Err(e) => failures.push(ScanFailure {
                ticker: ticker.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    let report = ScanReport {
        rows: rank(rows, config.momentum_overlay),
        failures,
    };
    progress.on_scan_complete(&report, total);
    Ok(report)
}
