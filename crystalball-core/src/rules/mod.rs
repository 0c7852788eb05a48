//! Rule evaluation and scoring.
//!
//! - `predicates`: trend, volume, momentum and risk/reward checks on scalars
//! - `evaluator`: applies the predicates to the latest bar of a series
//! - `scoring`: score, status label and retention per scoring policy
//! - `sizing`: optional share count from the risk-per-trade input

pub mod evaluator;
pub mod predicates;
pub mod scoring;
pub mod sizing;

pub use evaluator::{evaluate, EvaluationResult, RuleEvaluation, RuleParams};
pub use predicates::{
    momentum_ok, ratio_tolerance, risk_reward, trend_ok, volume_ok, MomentumAgreement, RiskReward,
    CATALYST, RATIO_TOLERANCE,
};
pub use scoring::{adjusted_rank, RuleFlags, ScoringPolicy, Status};
pub use sizing::RiskSizing;
