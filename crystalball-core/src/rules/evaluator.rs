//! Apply the rule set to the latest bar of a ticker and build its result row.

use super::predicates::{
    momentum_ok, risk_reward, trend_ok, volume_ok, MomentumAgreement, RiskReward,
};
use super::scoring::{adjusted_rank, RuleFlags, ScoringPolicy, Status};
use super::sizing::RiskSizing;
use crate::domain::{finite, PriceSeries};
use crate::indicators::{IndicatorError, IndicatorSet, Line, MacdMode};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Thresholds the predicates compare against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuleParams {
    pub volume_multiplier: f64,
    pub rr_minimum: f64,
}

impl Default for RuleParams {
    fn default() -> Self {
        Self {
            volume_multiplier: 1.5,
            rr_minimum: 2.0,
        }
    }
}

/// Raw rule outcomes at the latest bar, before scoring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleEvaluation {
    pub as_of: NaiveDate,
    pub entry: f64,
    pub flags: RuleFlags,
    pub risk_reward: RiskReward,
    pub agreement: MomentumAgreement,
}

/// Evaluate every rule at the last bar.
///
/// `counterpart_histogram` is the histogram of the MACD mode *not* used by
/// `indicators`; it only feeds the momentum agreement signal.
pub fn evaluate(
    series: &PriceSeries,
    indicators: &IndicatorSet,
    counterpart_histogram: &[f64],
    params: &RuleParams,
) -> Result<RuleEvaluation, IndicatorError> {
    let Some(last_bar) = series.last() else {
        return Err(IndicatorError::InsufficientHistory {
            required: 1,
            available: 0,
        });
    };
    let last = series.len() - 1;
    if indicators.len() != series.len() {
        return Err(IndicatorError::IndexOutOfRange {
            index: last,
            len: indicators.len(),
        });
    }

    let close = finite(last_bar.close);
    let ema20 = indicators.get(Line::Ema20, last)?;
    let ema50 = indicators.get(Line::Ema50, last)?;
    let histogram = indicators.get(Line::Histogram, last)?;
    let prev_histogram = match last.checked_sub(1) {
        Some(prev) => indicators.get(Line::Histogram, prev)?,
        None => None,
    };

    let trend = trend_ok(close, ema20, ema50);
    let volume = volume_ok(
        finite(last_bar.volume as f64),
        indicators.get(Line::VolumeMean20, last)?,
        params.volume_multiplier,
    );
    let momentum = momentum_ok(
        indicators.get(Line::Macd, last)?,
        indicators.get(Line::Signal, last)?,
        histogram,
        prev_histogram,
    );
    let rr = risk_reward(last_bar.close, ema50, params.rr_minimum);

    let other = counterpart_histogram.get(last).copied().and_then(finite);
    let agreement = match indicators.mode() {
        MacdMode::Classic => MomentumAgreement::classify(histogram, other),
        MacdMode::VolumeWeighted => MomentumAgreement::classify(other, histogram),
    };

    Ok(RuleEvaluation {
        as_of: last_bar.date,
        entry: last_bar.close,
        flags: RuleFlags::new(trend, volume, rr.ok, momentum),
        risk_reward: rr,
        agreement,
    })
}

/// One scored ticker. Built once per scan and never modified.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    pub ticker: String,
    pub as_of: NaiveDate,
    pub entry: f64,
    pub trend_ok: bool,
    pub volume_ok: bool,
    pub risk_reward_ok: bool,
    pub momentum_ok: bool,
    pub catalyst: bool,
    pub momentum_agreement: MomentumAgreement,
    pub stop: Option<f64>,
    pub target: Option<f64>,
    pub risk_distance: Option<f64>,
    pub ratio: Option<f64>,
    pub score: u8,
    pub status: Status,
    pub adjusted_rank: i32,
    pub position_size: Option<u64>,
}

impl EvaluationResult {
    pub fn from_evaluation(
        ticker: impl Into<String>,
        evaluation: &RuleEvaluation,
        policy: ScoringPolicy,
        sizing: &RiskSizing,
    ) -> Self {
        let flags = evaluation.flags;
        let rr = evaluation.risk_reward;
        let score = policy.score(&flags);
        Self {
            ticker: ticker.into(),
            as_of: evaluation.as_of,
            entry: evaluation.entry,
            trend_ok: flags.trend_ok,
            volume_ok: flags.volume_ok,
            risk_reward_ok: flags.risk_reward_ok,
            momentum_ok: flags.momentum_ok,
            catalyst: flags.catalyst,
            momentum_agreement: evaluation.agreement,
            stop: rr.stop,
            target: rr.target,
            risk_distance: rr.risk_distance,
            ratio: rr.ratio,
            score,
            status: policy.status(score),
            adjusted_rank: adjusted_rank(score, evaluation.agreement.overlay()),
            position_size: sizing.shares(rr.risk_distance),
        }
    }
}
