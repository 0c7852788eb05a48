//! Serializable scan configuration.
//!
//! Loaded from TOML (every field optional) and validated before any network
//! request is made.

use crystalball_core::indicators::MacdMode;
use crystalball_core::rules::{RiskSizing, RuleParams, ScoringPolicy};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Universe scanned when none is given.
pub const DEFAULT_TICKERS: &str = "MSFT,ETN,MDT,IONQ,MU,META,ONTO,NBIS";

/// Trailing calendar window pulled per ticker (about six months).
pub const DEFAULT_WINDOW_DAYS: u32 = 180;

/// Longest trailing window accepted (about a century).
pub const MAX_WINDOW_DAYS: u32 = 36_500;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {field} {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// Parameters for one scan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScanConfig {
    /// Latest volume must be at least this multiple of the 20-bar mean.
    pub volume_multiplier: f64,
    /// Minimum reward-to-risk; also the multiple used to project the target.
    pub rr_minimum: f64,
    /// Extra attempts after the first failed fetch.
    pub max_retries: u32,
    /// Linear backoff unit between fetch attempts.
    pub retry_base_delay_secs: f64,
    pub macd_mode: MacdMode,
    pub scoring_policy: ScoringPolicy,
    pub window_days: u32,
    /// Break score ties by momentum agreement before status and R/R.
    pub momentum_overlay: bool,
    pub risk_per_trade_pct: f64,
    pub account_equity: Option<f64>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            volume_multiplier: 1.5,
            rr_minimum: 2.0,
            max_retries: 3,
            retry_base_delay_secs: 0.6,
            macd_mode: MacdMode::Classic,
            scoring_policy: ScoringPolicy::ThreeSignalStrict,
            window_days: DEFAULT_WINDOW_DAYS,
            momentum_overlay: false,
            risk_per_trade_pct: 1.0,
            account_equity: None,
        }
    }
}

impl ScanConfig {
    /// Reject configurations no scan could run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.volume_multiplier.is_finite() || self.volume_multiplier < 1.0 {
            return Err(invalid(
                "volume_multiplier",
                format!("must be >= 1, got {}", self.volume_multiplier),
            ));
        }
        if !self.rr_minimum.is_finite() || self.rr_minimum < 1.0 {
            return Err(invalid(
                "rr_minimum",
                format!("must be >= 1, got {}", self.rr_minimum),
            ));
        }
        if !self.retry_base_delay_secs.is_finite() || self.retry_base_delay_secs < 0.0 {
            return Err(invalid(
                "retry_base_delay_secs",
                format!("must be >= 0, got {}", self.retry_base_delay_secs),
            ));
        }
        if self.window_days == 0 || self.window_days > MAX_WINDOW_DAYS {
            return Err(invalid(
                "window_days",
                format!("must be in 1..={MAX_WINDOW_DAYS}, got {}", self.window_days),
            ));
        }
        if !self.risk_per_trade_pct.is_finite() || self.risk_per_trade_pct <= 0.0 {
            return Err(invalid(
                "risk_per_trade_pct",
                format!("must be > 0, got {}", self.risk_per_trade_pct),
            ));
        }
        if let Some(equity) = self.account_equity {
            if !equity.is_finite() || equity <= 0.0 {
                return Err(invalid("account_equity", format!("must be > 0, got {equity}")));
            }
        }
        Ok(())
    }

    pub fn base_delay(&self) -> Result<Duration, ConfigError> {
        Duration::try_from_secs_f64(self.retry_base_delay_secs)
            .map_err(|e| invalid("retry_base_delay_secs", e.to_string()))
    }

    pub fn rule_params(&self) -> RuleParams {
        RuleParams {
            volume_multiplier: self.volume_multiplier,
            rr_minimum: self.rr_minimum,
        }
    }

    pub fn sizing(&self) -> RiskSizing {
        RiskSizing {
            risk_per_trade_pct: self.risk_per_trade_pct,
            account_equity: self.account_equity,
        }
    }
}

/// On-disk config: an optional ticker list plus a `[scan]` table.
///
/// ```toml
/// tickers = ["MSFT", "META"]
///
/// [scan]
/// volume_multiplier = 1.8
/// macd_mode = "volume_weighted"
/// scoring_policy = "four_signal"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConfigFile {
    pub tickers: Vec<String>,
    pub scan: ScanConfig,
}

impl ConfigFile {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let file: Self = toml::from_str(content)?;
        file.scan.validate()?;
        Ok(file)
    }
}

/// Split a comma-separated ticker list: trimmed, upper-cased, blanks skipped.
pub fn parse_universe(text: &str) -> Vec<String> {
    text.split(',')
        .map(|t| t.trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .collect()
}
