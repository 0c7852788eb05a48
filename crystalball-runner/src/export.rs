//! Report export: CSV for spreadsheets, JSON for everything else.
//!
//! CSV prices and ratios are rounded to two decimals; undefined values are
//! written as empty cells. JSON keeps full precision and writes `null`.

use std::path::Path;

use anyhow::{Context, Result};
use crystalball_core::rules::EvaluationResult;
use serde::Serialize;

use crate::scan::ScanReport;

/// Column order of the results table.
pub const ROW_HEADERS: [&str; 17] = [
    "Ticker",
    "AsOf",
    "Entry",
    "Stop",
    "Target",
    "RiskDist",
    "R/R",
    "TrendOK",
    "VolOK",
    "RROK",
    "MomentumOK",
    "Catalyst",
    "Momentum",
    "Score",
    "AdjRank",
    "Status",
    "Shares",
];

/// One flat results row, prices already rounded for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    #[serde(rename = "Ticker")]
    pub ticker: String,
    #[serde(rename = "AsOf")]
    pub as_of: String,
    #[serde(rename = "Entry")]
    pub entry: String,
    #[serde(rename = "Stop")]
    pub stop: Option<String>,
    #[serde(rename = "Target")]
    pub target: Option<String>,
    #[serde(rename = "RiskDist")]
    pub risk_distance: Option<String>,
    #[serde(rename = "R/R")]
    pub ratio: Option<String>,
    #[serde(rename = "TrendOK")]
    pub trend_ok: bool,
    #[serde(rename = "VolOK")]
    pub volume_ok: bool,
    #[serde(rename = "RROK")]
    pub risk_reward_ok: bool,
    #[serde(rename = "MomentumOK")]
    pub momentum_ok: bool,
    #[serde(rename = "Catalyst")]
    pub catalyst: bool,
    #[serde(rename = "Momentum")]
    pub momentum: &'static str,
    #[serde(rename = "Score")]
    pub score: u8,
    #[serde(rename = "AdjRank")]
    pub adjusted_rank: i32,
    #[serde(rename = "Status")]
    pub status: &'static str,
    #[serde(rename = "Shares")]
    pub shares: Option<u64>,
}

fn price(value: f64) -> String {
    format!("{value:.2}")
}

impl From<&EvaluationResult> for ReportRow {
    fn from(row: &EvaluationResult) -> Self {
        Self {
            ticker: row.ticker.clone(),
            as_of: row.as_of.to_string(),
            entry: price(row.entry),
            stop: row.stop.map(price),
            target: row.target.map(price),
            risk_distance: row.risk_distance.map(price),
            ratio: row.ratio.map(price),
            trend_ok: row.trend_ok,
            volume_ok: row.volume_ok,
            risk_reward_ok: row.risk_reward_ok,
            momentum_ok: row.momentum_ok,
            catalyst: row.catalyst,
            momentum: row.momentum_agreement.label(),
            score: row.score,
            adjusted_rank: row.adjusted_rank,
            status: row.status.label(),
            shares: row.position_size,
        }
    }
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Ranked rows as CSV, header first.
pub fn export_rows_csv(report: &ScanReport) -> Result<String> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(vec![]);
    wtr.write_record(ROW_HEADERS)?;
    for row in &report.rows {
        wtr.serialize(ReportRow::from(row))?;
    }
    let bytes = wtr.into_inner().context("failed to flush results CSV")?;
    String::from_utf8(bytes).context("results CSV is not valid UTF-8")
}

/// Failure log as CSV: `Ticker,Reason`.
pub fn export_failures_csv(report: &ScanReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["Ticker", "Reason"])?;
    for failure in &report.failures {
        wtr.write_record([&failure.ticker, &failure.reason])?;
    }
    let bytes = wtr.into_inner().context("failed to flush failures CSV")?;
    String::from_utf8(bytes).context("failures CSV is not valid UTF-8")
}

// ─── JSON export ────────────────────────────────────────────────────

/// The whole report as pretty JSON.
pub fn export_json(report: &ScanReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize ScanReport to JSON")
}

// ─── Files ──────────────────────────────────────────────────────────

/// Write `results.csv` and `failures.csv` into `dir`, creating it if needed.
pub fn write_report(report: &ScanReport, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;

    let results = dir.join("results.csv");
    std::fs::write(&results, export_rows_csv(report)?)
        .with_context(|| format!("failed to write {}", results.display()))?;

    let failures = dir.join("failures.csv");
    std::fs::write(&failures, export_failures_csv(report)?)
        .with_context(|| format!("failed to write {}", failures.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::ScanFailure;
    use chrono::NaiveDate;
    use crystalball_core::rules::{MomentumAgreement, Status};

    fn sample_row() -> EvaluationResult {
        EvaluationResult {
            ticker: "META".into(),
            as_of: NaiveDate::from_ymd_opt(2024, 6, 28).unwrap(),
            entry: 504.216,
            trend_ok: true,
            volume_ok: false,
            risk_reward_ok: true,
            momentum_ok: true,
            catalyst: false,
            momentum_agreement: MomentumAgreement::AlignedBullish,
            stop: Some(480.004),
            target: Some(552.64),
            risk_distance: Some(24.212),
            ratio: Some(2.0),
            score: 2,
            status: Status::Candidate,
            adjusted_rank: 3,
            position_size: Some(41),
        }
    }

    fn sample_report() -> ScanReport {
        ScanReport {
            rows: vec![sample_row()],
            failures: vec![ScanFailure {
                ticker: "NBIS".into(),
                reason: "insufficient history: need 50 bars, have 12".into(),
            }],
        }
    }

    #[test]
    fn csv_rounds_to_two_decimals() {
        let csv = export_rows_csv(&sample_report()).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next().unwrap(), ROW_HEADERS.join(","));
        let row = lines.next().unwrap();
        assert!(row.starts_with("META,2024-06-28,504.22,480.00,552.64,24.21,2.00,"));
        assert!(row.ends_with(",2,3,Candidate,41"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn undefined_values_are_empty_cells() {
        let mut row = sample_row();
        row.stop = None;
        row.target = None;
        row.risk_distance = None;
        row.ratio = None;
        row.position_size = None;
        let report = ScanReport {
            rows: vec![row],
            failures: Vec::new(),
        };
        let csv = export_rows_csv(&report).unwrap();
        let line = csv.lines().nth(1).unwrap();
        assert_eq!(
            line,
            "META,2024-06-28,504.22,,,,,true,false,true,true,false,aligned-bullish,2,3,Candidate,"
        );
    }

    #[test]
    fn failures_csv_quotes_reasons() {
        let mut report = sample_report();
        report.failures[0].reason = "upstream said: no, really".into();
        let csv = export_failures_csv(&report).unwrap();
        assert_eq!(csv, "Ticker,Reason\nNBIS,\"upstream said: no, really\"\n");
    }

    #[test]
    fn json_keeps_nulls_and_precision() {
        let mut report = sample_report();
        report.rows[0].ratio = None;
        let json = export_json(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["rows"][0]["entry"], 504.216);
        assert!(value["rows"][0]["ratio"].is_null());
        assert_eq!(value["failures"][0]["ticker"], "NBIS");
    }

    #[test]
    fn empty_report_writes_headers_only() {
        let report = ScanReport::default();
        assert_eq!(export_rows_csv(&report).unwrap().lines().count(), 1);
        assert_eq!(export_failures_csv(&report).unwrap(), "Ticker,Reason\n");
    }
}
