//! The screening predicates.
//!
//! Every operand arrives as `Option<f64>`; an undefined operand makes the
//! predicate false, never true.

use serde::{Deserialize, Serialize};

/// Catalyst/news signal. There is no news integration; it never fires.
pub const CATALYST: bool = false;

/// Slack allowed when checking the constructed risk/reward ratio against its
/// minimum, so a rounding ulp cannot fail a ratio equal to the minimum.
/// Relative to the minimum once it exceeds 1.
pub const RATIO_TOLERANCE: f64 = 1e-9;

/// Absolute tolerance for a ratio compared against `rr_minimum`.
pub fn ratio_tolerance(rr_minimum: f64) -> f64 {
    RATIO_TOLERANCE * rr_minimum.abs().max(1.0)
}

/// EMA20 above EMA50 and close above EMA20.
pub fn trend_ok(close: Option<f64>, ema20: Option<f64>, ema50: Option<f64>) -> bool {
    match (close, ema20, ema50) {
        (Some(close), Some(fast), Some(slow)) => fast > slow && close > fast,
        _ => false,
    }
}

/// Latest volume at least `multiplier` times a positive 20-bar mean.
pub fn volume_ok(volume: Option<f64>, mean20: Option<f64>, multiplier: f64) -> bool {
    match (volume, mean20) {
        (Some(volume), Some(mean)) if mean > 0.0 => volume >= multiplier * mean,
        _ => false,
    }
}

/// MACD above signal, histogram positive and rising.
pub fn momentum_ok(
    macd: Option<f64>,
    signal: Option<f64>,
    histogram: Option<f64>,
    prev_histogram: Option<f64>,
) -> bool {
    match (macd, signal, histogram, prev_histogram) {
        (Some(m), Some(s), Some(h), Some(prev)) => m > s && h > 0.0 && h > prev,
        _ => false,
    }
}

/// Stop/target projection for a long entry with the stop at EMA50.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskReward {
    pub stop: Option<f64>,
    pub target: Option<f64>,
    pub risk_distance: Option<f64>,
    pub ratio: Option<f64>,
    pub ok: bool,
}

impl RiskReward {
    /// A setup with the stop at or above entry (or no usable stop).
    fn invalid(stop: Option<f64>) -> Self {
        Self {
            stop,
            target: None,
            risk_distance: None,
            ratio: None,
            ok: false,
        }
    }
}

/// Project the target as `entry + rr_minimum * risk` and derive the ratio
/// from it, so a valid setup's ratio is `rr_minimum` by construction.
pub fn risk_reward(entry: f64, stop: Option<f64>, rr_minimum: f64) -> RiskReward {
    let Some(stop_price) = stop else {
        return RiskReward::invalid(None);
    };
    if !stop_price.is_finite() {
        return RiskReward::invalid(None);
    }
    if stop_price <= 0.0 || !entry.is_finite() || entry <= stop_price {
        return RiskReward::invalid(stop);
    }

    let risk = entry - stop_price;
    let target = entry + rr_minimum * risk;
    let ratio = (target - entry) / risk;
    if !target.is_finite() || !ratio.is_finite() {
        return RiskReward::invalid(stop);
    }

    RiskReward {
        stop,
        target: Some(target),
        risk_distance: Some(risk),
        ratio: Some(ratio),
        ok: ratio >= rr_minimum - ratio_tolerance(rr_minimum),
    }
}

/// Classic MACD vs MACD-V histogram agreement at the latest bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MomentumAgreement {
    AlignedBullish,
    AlignedBearish,
    Divergent,
    Neutral,
}

impl MomentumAgreement {
    pub fn classify(classic_histogram: Option<f64>, weighted_histogram: Option<f64>) -> Self {
        match (classic_histogram, weighted_histogram) {
            (Some(c), Some(w)) if c > 0.0 && w > 0.0 => Self::AlignedBullish,
            (Some(c), Some(w)) if c < 0.0 && w < 0.0 => Self::AlignedBearish,
            (Some(c), Some(w)) if c * w < 0.0 => Self::Divergent,
            _ => Self::Neutral,
        }
    }

    /// Contribution to the adjusted rank.
    pub fn overlay(self) -> i32 {
        match self {
            Self::AlignedBullish => 1,
            Self::AlignedBearish | Self::Divergent => -1,
            Self::Neutral => 0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::AlignedBullish => "aligned-bullish",
            Self::AlignedBearish => "aligned-bearish",
            Self::Divergent => "divergent",
            Self::Neutral => "neutral",
        }
    }
}
