//! Integration tests for the universe scan: ordering, retention, failure
//! isolation and export.
//!
//! An in-memory market stands in for the quote service and a recording
//! backoff replaces real sleeps, so nothing here touches the network.

use chrono::NaiveDate;
use crystalball_core::data::{Backoff, DataError, DataProvider, FetchCache, SeriesFetcher};
use crystalball_core::domain::PriceBar;
use crystalball_core::rules::{EvaluationResult, ScoringPolicy, Status};
use crystalball_runner::{
    export_rows_csv, run_scan, write_report, ConfigError, NoProgress, ScanConfig, ScanProgress,
    ScanReport, TickerError,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

// ── Fixtures ─────────────────────────────────────────────────────────

fn bars(closes: impl Fn(usize) -> f64, volumes: impl Fn(usize) -> u64, n: usize) -> Vec<PriceBar> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    (0..n)
        .map(|i| {
            let close = closes(i);
            PriceBar {
                date: start + chrono::Duration::days(i as i64),
                open: close - 0.2,
                high: close + 0.5,
                low: close - 0.5,
                close,
                volume: volumes(i),
            }
        })
        .collect()
}

/// 100 → 140 over 60 bars with a 2x volume surge on the last bar: score 3.
fn uptrend_with_surge() -> Vec<PriceBar> {
    bars(
        |i| 100.0 + 40.0 * i as f64 / 59.0,
        |i| if i == 59 { 2_000_000 } else { 1_000_000 },
        60,
    )
}

/// Same trend, flat volume: trend and R/R only, score 2.
fn uptrend_flat_volume() -> Vec<PriceBar> {
    bars(|i| 100.0 + 40.0 * i as f64 / 59.0, |_| 1_000_000, 60)
}

/// 140 → 100, flat volume: nothing passes, score 0.
fn downtrend() -> Vec<PriceBar> {
    bars(|i| 140.0 - 40.0 * i as f64 / 59.0, |_| 1_000_000, 60)
}

/// Too short for the slow trend EMA.
fn short_history() -> Vec<PriceBar> {
    bars(|i| 50.0 + i as f64, |_| 500_000, 12)
}

struct Market {
    series: HashMap<String, Vec<PriceBar>>,
    calls: AtomicUsize,
}

impl Market {
    fn new(entries: Vec<(&str, Vec<PriceBar>)>) -> Self {
        Self {
            series: entries
                .into_iter()
                .map(|(t, b)| (t.to_string(), b))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DataProvider for Market {
    fn name(&self) -> &str {
        "market"
    }

    fn daily_bars(&self, ticker: &str, _window_days: u32) -> Result<Vec<PriceBar>, DataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.series
            .get(ticker)
            .cloned()
            .ok_or_else(|| DataError::SymbolNotFound {
                symbol: ticker.to_string(),
            })
    }
}

#[derive(Default)]
struct Recorder(Mutex<Vec<Duration>>);

impl Backoff for Recorder {
    fn sleep(&self, delay: Duration) {
        self.0.lock().unwrap().push(delay);
    }
}

fn market() -> Market {
    Market::new(vec![
        ("UP", uptrend_with_surge()),
        ("UPFLAT", uptrend_flat_volume()),
        ("DOWN", downtrend()),
        ("SHORT", short_history()),
    ])
}

fn config(policy: ScoringPolicy) -> ScanConfig {
    ScanConfig {
        scoring_policy: policy,
        max_retries: 2,
        retry_base_delay_secs: 0.5,
        ..ScanConfig::default()
    }
}

fn scan(market: &Market, universe: &[&str], config: &ScanConfig) -> Result<ScanReport, ConfigError> {
    let cache = FetchCache::new();
    let recorder = Recorder::default();
    let fetcher = SeriesFetcher::new(market, &cache).with_backoff(&recorder);
    run_scan(universe, config, &fetcher, &NoProgress)
}

fn tickers(rows: &[EvaluationResult]) -> Vec<&str> {
    rows.iter().map(|r| r.ticker.as_str()).collect()
}

// ── Tests ────────────────────────────────────────────────────────────

#[test]
fn empty_universe_is_an_empty_report() {
    let market = market();
    let universe: [&str; 0] = [];
    let report = scan(&market, &universe, &ScanConfig::default()).unwrap();
    assert!(report.is_empty());
    assert_eq!(market.calls(), 0);
}

#[test]
fn strict_policy_keeps_every_row_ranked() {
    let market = market();
    let report = scan(
        &market,
        &["DOWN", "UPFLAT", "SHORT", "UP", "GONE"],
        &config(ScoringPolicy::ThreeSignalStrict),
    )
    .unwrap();

    assert_eq!(tickers(&report.rows), vec!["UP", "UPFLAT", "DOWN"]);
    let statuses: Vec<Status> = report.rows.iter().map(|r| r.status).collect();
    assert_eq!(statuses, vec![Status::Prime, Status::Candidate, Status::Fail]);
    let scores: Vec<u8> = report.rows.iter().map(|r| r.score).collect();
    assert_eq!(scores, vec![3, 2, 0]);

    let failed: Vec<&str> = report.failures.iter().map(|f| f.ticker.as_str()).collect();
    assert_eq!(failed, vec!["SHORT", "GONE"]);
}

#[test]
fn four_signal_policy_drops_low_scores() {
    let market = market();
    let report = scan(
        &market,
        &["DOWN", "UPFLAT", "UP"],
        &config(ScoringPolicy::FourSignal),
    )
    .unwrap();

    // Catalyst never fires, so three passing signals is the best case.
    assert_eq!(tickers(&report.rows), vec!["UP"]);
    assert_eq!(report.rows[0].score, 3);
    assert_eq!(report.rows[0].status, Status::Candidate);
    assert!(report.failures.is_empty());
}

#[test]
fn failures_are_isolated_and_explained() {
    let market = market();
    let report = scan(
        &market,
        &["SHORT", "GONE", "UP"],
        &config(ScoringPolicy::ThreeSignalStrict),
    )
    .unwrap();

    assert_eq!(tickers(&report.rows), vec!["UP"]);
    assert_eq!(report.failures.len(), 2);
    assert!(report.failures[0].reason.contains("insufficient history"));
    assert!(report.failures[1].reason.contains("after 3 attempt(s)"));
    // SHORT once, GONE 1 + 2 retries, UP once.
    assert_eq!(market.calls(), 5);
}

#[test]
fn unknown_ticker_backs_off_linearly() {
    let market = market();
    let cache = FetchCache::new();
    let recorder = Recorder::default();
    let fetcher = SeriesFetcher::new(&market, &cache).with_backoff(&recorder);
    let report = run_scan(
        &["GONE"],
        &config(ScoringPolicy::ThreeSignalStrict),
        &fetcher,
        &NoProgress,
    )
    .unwrap();

    assert_eq!(report.failures.len(), 1);
    let base = Duration::from_millis(500);
    assert_eq!(*recorder.0.lock().unwrap(), vec![base, base * 2]);
}

#[test]
fn invalid_config_fails_before_any_fetch() {
    let market = market();
    let bad = ScanConfig {
        volume_multiplier: 0.5,
        ..ScanConfig::default()
    };
    let err = scan(&market, &["UP", "DOWN"], &bad).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Invalid {
            field: "volume_multiplier",
            ..
        }
    ));
    assert_eq!(market.calls(), 0);
}

#[test]
fn repeated_ticker_is_fetched_once() {
    let market = market();
    let report = scan(&market, &["UP", "UP"], &ScanConfig::default()).unwrap();
    assert_eq!(report.rows.len(), 2);
    assert_eq!(report.rows[0], report.rows[1]);
    assert_eq!(market.calls(), 1);
}

#[test]
fn sizing_fills_position_size_when_equity_is_known() {
    let market = market();
    let config = ScanConfig {
        account_equity: Some(100_000.0),
        risk_per_trade_pct: 1.0,
        ..ScanConfig::default()
    };
    let report = scan(&market, &["UP", "DOWN"], &config).unwrap();

    let up = &report.rows[0];
    let expected = (1_000.0 / up.risk_distance.unwrap()).floor() as u64;
    assert_eq!(up.position_size, Some(expected));
    // DOWN has no valid stop, so nothing to size.
    assert_eq!(report.rows[1].position_size, None);
}

#[derive(Default)]
struct Log(Mutex<Vec<String>>);

impl ScanProgress for Log {
    fn on_start(&self, ticker: &str, index: usize, total: usize) {
        self.0
            .lock()
            .unwrap()
            .push(format!("start {ticker} {}/{total}", index + 1));
    }

    fn on_complete(
        &self,
        ticker: &str,
        _index: usize,
        _total: usize,
        result: &Result<EvaluationResult, TickerError>,
    ) {
        let outcome = if result.is_ok() { "ok" } else { "err" };
        self.0.lock().unwrap().push(format!("done {ticker} {outcome}"));
    }

    fn on_scan_complete(&self, report: &ScanReport, total: usize) {
        self.0
            .lock()
            .unwrap()
            .push(format!("end {}/{total}", report.rows.len()));
    }
}

#[test]
fn progress_sees_every_ticker_in_order() {
    let market = market();
    let cache = FetchCache::new();
    let recorder = Recorder::default();
    let fetcher = SeriesFetcher::new(&market, &cache).with_backoff(&recorder);
    let log = Log::default();

    run_scan(&["UP", "SHORT"], &ScanConfig::default(), &fetcher, &log).unwrap();

    assert_eq!(
        *log.0.lock().unwrap(),
        vec![
            "start UP 1/2",
            "done UP ok",
            "start SHORT 2/2",
            "done SHORT err",
            "end 1/2",
        ]
    );
}

#[test]
fn report_files_land_in_output_dir() {
    let market = market();
    let report = scan(
        &market,
        &["UP", "GONE"],
        &config(ScoringPolicy::ThreeSignalStrict),
    )
    .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("reports");
    write_report(&report, &out).unwrap();

    let results = std::fs::read_to_string(out.join("results.csv")).unwrap();
    assert_eq!(results, export_rows_csv(&report).unwrap());
    assert!(results.lines().nth(1).unwrap().starts_with("UP,2024-03-01,140.00,"));

    let failures = std::fs::read_to_string(out.join("failures.csv")).unwrap();
    assert!(failures.starts_with("Ticker,Reason\nGONE,"));
}
