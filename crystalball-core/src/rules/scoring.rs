//! Score aggregation and status labels.

use super::predicates::CATALYST;
use serde::{Deserialize, Serialize};

/// Boolean outcome of every rule for one ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RuleFlags {
    pub trend_ok: bool,
    pub volume_ok: bool,
    pub risk_reward_ok: bool,
    /// Reported only; no policy scores it.
    pub momentum_ok: bool,
    pub catalyst: bool,
}

impl RuleFlags {
    pub fn new(trend_ok: bool, volume_ok: bool, risk_reward_ok: bool, momentum_ok: bool) -> Self {
        Self {
            trend_ok,
            volume_ok,
            risk_reward_ok,
            momentum_ok,
            catalyst: CATALYST,
        }
    }
}

/// Screen outcome label. Ordering is the ranking order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Status {
    Prime,
    Candidate,
    Fail,
}

impl Status {
    /// Fixed sort rank: Prime 0, Candidate 1, Fail 2.
    pub fn rank(self) -> u8 {
        match self {
            Status::Prime => 0,
            Status::Candidate => 1,
            Status::Fail => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::Prime => "Prime",
            Status::Candidate => "Candidate",
            Status::Fail => "Fail",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Which flags count toward the score, and which rows are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringPolicy {
    /// Trend, volume, risk/reward and catalyst; rows below 3 are dropped.
    FourSignal,
    /// Trend, volume and risk/reward; every row is reported, Fail included.
    #[default]
    ThreeSignalStrict,
}

impl ScoringPolicy {
    pub fn max_score(self) -> u8 {
        match self {
            ScoringPolicy::FourSignal => 4,
            ScoringPolicy::ThreeSignalStrict => 3,
        }
    }

    pub fn score(self, flags: &RuleFlags) -> u8 {
        let core = [flags.trend_ok, flags.volume_ok, flags.risk_reward_ok];
        let counted = core.iter().filter(|&&f| f).count() as u8;
        match self {
            ScoringPolicy::FourSignal => counted + u8::from(flags.catalyst),
            ScoringPolicy::ThreeSignalStrict => counted,
        }
    }

    pub fn status(self, score: u8) -> Status {
        let max = self.max_score();
        if score >= max {
            Status::Prime
        } else if score + 1 == max {
            Status::Candidate
        } else {
            Status::Fail
        }
    }

    /// Whether a row with this status belongs in the report.
    pub fn retains(self, status: Status) -> bool {
        match self {
            ScoringPolicy::FourSignal => status != Status::Fail,
            ScoringPolicy::ThreeSignalStrict => true,
        }
    }
}

/// Score plus the momentum overlay; only ever used as a sort key.
pub fn adjusted_rank(score: u8, overlay: i32) -> i32 {
    i32::from(score) + overlay
}
