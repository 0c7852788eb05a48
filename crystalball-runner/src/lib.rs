//! CrystalBall Runner: scan orchestration, ranking, configuration, export.
//!
//! This crate builds on `crystalball-core` to provide:
//! - TOML scan configuration with validation and ticker-list parsing
//! - The universe scan loop with per-ticker failure isolation
//! - Deterministic ranking of scored rows
//! - CSV and JSON report export

pub mod config;
pub mod export;
pub mod ranker;
pub mod scan;

pub use config::{
    parse_universe, ConfigError, ConfigFile, ScanConfig, DEFAULT_TICKERS, DEFAULT_WINDOW_DAYS,
    MAX_WINDOW_DAYS,
};
pub use export::{
    export_failures_csv, export_json, export_rows_csv, write_report, ReportRow, ROW_HEADERS,
};
pub use ranker::rank;
pub use scan::{
    run_scan, scan_ticker, NoProgress, ScanFailure, ScanProgress, ScanReport, TickerError,
    TracingProgress,
};
