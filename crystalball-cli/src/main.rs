//! CrystalBall CLI: scan a ticker universe and export the ranked report.
//!
//! Commands:
//! - `scan`: fetch daily bars, evaluate the swing rules, rank, and print
//!   the table; `--output-dir` also writes `results.csv` and `failures.csv`

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use crystalball_core::data::{FetchCache, SeriesFetcher, YahooProvider};
use crystalball_core::indicators::MacdMode;
use crystalball_core::rules::ScoringPolicy;
use crystalball_runner::{
    export_json, parse_universe, run_scan, write_report, ConfigFile, ScanConfig, ScanReport,
    TracingProgress, DEFAULT_TICKERS,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "crystalball",
    about = "CrystalBall: daily swing-trade screener"
)]
struct Cli {
    /// Emit structured JSON logs instead of human-readable lines.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a universe of tickers and print the ranked table.
    Scan(ScanArgs),
}

#[derive(clap::Args)]
struct ScanArgs {
    /// Comma-separated tickers. Overrides the config file's list.
    #[arg(long)]
    tickers: Option<String>,

    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Latest volume must reach this multiple of the 20-day mean.
    #[arg(long)]
    volume_multiplier: Option<f64>,

    /// Minimum reward-to-risk ratio.
    #[arg(long)]
    rr_min: Option<f64>,

    /// Percent of equity risked per trade.
    #[arg(long)]
    risk_pct: Option<f64>,

    /// Account equity used to suggest a share count.
    #[arg(long)]
    account_equity: Option<f64>,

    /// Extra fetch attempts after the first failure.
    #[arg(long)]
    max_retries: Option<u32>,

    /// Linear backoff unit between fetch attempts, in seconds.
    #[arg(long)]
    retry_delay: Option<f64>,

    /// Trailing calendar days of history to request.
    #[arg(long)]
    window_days: Option<u32>,

    /// Momentum line: classic MACD or volume-weighted MACD-V.
    #[arg(long, value_enum)]
    macd_mode: Option<MacdModeArg>,

    /// Scoring policy.
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,

    /// Break score ties by classic/volume-weighted MACD agreement.
    #[arg(long, default_value_t = false)]
    momentum_overlay: bool,

    /// Directory for results.csv and failures.csv.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Print the report as JSON instead of a table.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum MacdModeArg {
    Classic,
    VolumeWeighted,
}

impl From<MacdModeArg> for MacdMode {
    fn from(arg: MacdModeArg) -> Self {
        match arg {
            MacdModeArg::Classic => MacdMode::Classic,
            MacdModeArg::VolumeWeighted => MacdMode::VolumeWeighted,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    FourSignal,
    ThreeSignalStrict,
}

impl From<PolicyArg> for ScoringPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::FourSignal => ScoringPolicy::FourSignal,
            PolicyArg::ThreeSignalStrict => ScoringPolicy::ThreeSignalStrict,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json_logs);

    match cli.command {
        Commands::Scan(args) => run_scan_cmd(args),
    }
}

/// Logs go to stderr so stdout carries only the report.
fn init_logging(json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// File values first, then flag overrides.
fn build_config(args: &ScanArgs) -> Result<(Vec<String>, ScanConfig)> {
    let file = match &args.config {
        Some(path) => ConfigFile::from_file(path)?,
        None => ConfigFile::default(),
    };
    let mut config = file.scan;

    if let Some(v) = args.volume_multiplier {
        config.volume_multiplier = v;
    }
    if let Some(v) = args.rr_min {
        config.rr_minimum = v;
    }
    if let Some(v) = args.risk_pct {
        config.risk_per_trade_pct = v;
    }
    if let Some(v) = args.account_equity {
        config.account_equity = Some(v);
    }
    if let Some(v) = args.max_retries {
        config.max_retries = v;
    }
    if let Some(v) = args.retry_delay {
        config.retry_base_delay_secs = v;
    }
    if let Some(v) = args.window_days {
        config.window_days = v;
    }
    if let Some(v) = args.macd_mode {
        config.macd_mode = v.into();
    }
    if let Some(v) = args.policy {
        config.scoring_policy = v.into();
    }
    if args.momentum_overlay {
        config.momentum_overlay = true;
    }

    let universe = match &args.tickers {
        Some(list) => parse_universe(list),
        None if !file.tickers.is_empty() => parse_universe(&file.tickers.join(",")),
        None => parse_universe(DEFAULT_TICKERS),
    };
    Ok((universe, config))
}

fn run_scan_cmd(args: ScanArgs) -> Result<()> {
    let (universe, config) = build_config(&args)?;

    let provider = YahooProvider::new().context("failed to build quote client")?;
    let cache = FetchCache::new();
    let fetcher = SeriesFetcher::new(&provider, &cache);

    info!(
        tickers = universe.len(),
        provider = fetcher.provider_name(),
        macd_mode = ?config.macd_mode,
        policy = ?config.scoring_policy,
        "starting scan"
    );
    let report = run_scan(universe.as_slice(), &config, &fetcher, &TracingProgress)?;

    if args.json {
        println!("{}", export_json(&report)?);
    } else {
        print_table(&report);
    }

    if let Some(dir) = &args.output_dir {
        write_report(&report, dir)?;
        info!(dir = %dir.display(), "report files written");
    }

    Ok(())
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".into())
}

fn print_table(report: &ScanReport) {
    println!();
    if report.rows.is_empty() {
        println!("No setups to report.");
    } else {
        println!(
            "{:<7} {:>10} {:>10} {:>10} {:>6}  {:<5} {:<5} {:<5} {:<15} {:>5}  {:<9} {:>7}",
            "Ticker",
            "Entry",
            "Stop",
            "Target",
            "R/R",
            "Trend",
            "Vol",
            "RR",
            "Momentum",
            "Score",
            "Status",
            "Shares"
        );
        for row in &report.rows {
            println!(
                "{:<7} {:>10.2} {:>10} {:>10} {:>6}  {:<5} {:<5} {:<5} {:<15} {:>5}  {:<9} {:>7}",
                row.ticker,
                row.entry,
                fmt_opt(row.stop),
                fmt_opt(row.target),
                fmt_opt(row.ratio),
                row.trend_ok,
                row.volume_ok,
                row.risk_reward_ok,
                row.momentum_agreement.label(),
                row.score,
                row.status.label(),
                row.position_size
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "-".into()),
            );
        }
    }

    if !report.failures.is_empty() {
        println!();
        println!("Failed tickers:");
        for failure in &report.failures {
            println!("  {:<7} {}", failure.ticker, failure.reason);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ScanArgs {
        let cli = Cli::try_parse_from(args.iter().copied()).unwrap();
        match cli.command {
            Commands::Scan(args) => args,
        }
    }

    #[test]
    fn defaults_scan_the_built_in_universe() {
        let (universe, config) = build_config(&parse(&["crystalball", "scan"])).unwrap();
        assert_eq!(universe, parse_universe(DEFAULT_TICKERS));
        assert_eq!(config, ScanConfig::default());
    }

    #[test]
    fn flags_override_defaults() {
        let args = parse(&[
            "crystalball",
            "scan",
            "--tickers",
            "msft, nbis",
            "--volume-multiplier",
            "2",
            "--macd-mode",
            "volume-weighted",
            "--policy",
            "four-signal",
            "--account-equity",
            "50000",
            "--momentum-overlay",
        ]);
        let (universe, config) = build_config(&args).unwrap();
        assert_eq!(universe, vec!["MSFT", "NBIS"]);
        assert_eq!(config.volume_multiplier, 2.0);
        assert_eq!(config.macd_mode, MacdMode::VolumeWeighted);
        assert_eq!(config.scoring_policy, ScoringPolicy::FourSignal);
        assert_eq!(config.account_equity, Some(50_000.0));
        assert!(config.momentum_overlay);
    }

    #[test]
    fn json_logs_flag_is_global() {
        let cli = Cli::try_parse_from(["crystalball", "scan", "--json-logs"]).unwrap();
        assert!(cli.json_logs);
    }
}
