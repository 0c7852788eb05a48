//! Fixed-fractional position sizing from a single risk-per-trade input.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskSizing {
    /// Percent of account equity risked per trade (1.0 = 1%).
    pub risk_per_trade_pct: f64,
    /// Account equity; without it no size is suggested.
    pub account_equity: Option<f64>,
}

impl Default for RiskSizing {
    fn default() -> Self {
        Self {
            risk_per_trade_pct: 1.0,
            account_equity: None,
        }
    }
}

impl RiskSizing {
    /// Whole shares such that hitting the stop loses at most the risk budget.
    pub fn shares(&self, risk_distance: Option<f64>) -> Option<u64> {
        let equity = self.account_equity?;
        let risk = risk_distance?;
        if risk.is_nan() || risk <= 0.0 || equity.is_nan() || equity <= 0.0 {
            return None;
        }
        let budget = equity * self.risk_per_trade_pct / 100.0;
        let shares = (budget / risk).floor();
        shares.is_finite().then_some(shares as u64)
    }
}
