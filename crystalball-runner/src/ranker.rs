//! Deterministic ordering of scored rows.
//!
//! Keys, in order:
//! 1. score, descending
//! 2. adjusted rank (score + momentum overlay), descending, only when the overlay is on
//! 3. status rank, ascending (Prime < Candidate < Fail)
//! 4. risk/reward ratio, descending, with an undefined ratio lowest
//!
//! The sort is stable: rows equal on every key keep their fetch order.

use crystalball_core::rules::EvaluationResult;
use std::cmp::Ordering;

/// Descending ratio order, `None` after every defined ratio.
fn ratio_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Comparator used by [`rank`].
pub fn compare(a: &EvaluationResult, b: &EvaluationResult, momentum_overlay: bool) -> Ordering {
    let by_overlay = if momentum_overlay {
        b.adjusted_rank.cmp(&a.adjusted_rank)
    } else {
        Ordering::Equal
    };
    b.score
        .cmp(&a.score)
        .then(by_overlay)
        .then_with(|| a.status.rank().cmp(&b.status.rank()))
        .then_with(|| ratio_desc(a.ratio, b.ratio))
}

/// Sort rows into report order.
pub fn rank(mut rows: Vec<EvaluationResult>, momentum_overlay: bool) -> Vec<EvaluationResult> {
    rows.sort_by(|a, b| compare(a, b, momentum_overlay));
    rows
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crystalball_core::rules::{MomentumAgreement, Status};

    fn row(ticker: &str, score: u8, status: Status, ratio: Option<f64>) -> EvaluationResult {
        EvaluationResult {
            ticker: ticker.into(),
            as_of: NaiveDate::from_ymd_opt(2024, 6, 28).unwrap(),
            entry: 100.0,
            trend_ok: score > 0,
            volume_ok: score > 1,
            risk_reward_ok: ratio.is_some(),
            momentum_ok: false,
            catalyst: false,
            momentum_agreement: MomentumAgreement::Neutral,
            stop: Some(95.0),
            target: ratio.map(|r| 100.0 + 5.0 * r),
            risk_distance: ratio.map(|_| 5.0),
            ratio,
            score,
            status,
            adjusted_rank: i32::from(score),
            position_size: None,
        }
    }

    fn tickers(rows: &[EvaluationResult]) -> Vec<&str> {
        rows.iter().map(|r| r.ticker.as_str()).collect()
    }

    #[test]
    fn score_descending_first() {
        let rows = vec![
            row("A", 1, Status::Fail, None),
            row("B", 3, Status::Prime, Some(2.0)),
            row("C", 2, Status::Candidate, Some(2.0)),
        ];
        assert_eq!(tickers(&rank(rows, false)), vec!["B", "C", "A"]);
    }

    #[test]
    fn status_breaks_score_ties() {
        let rows = vec![
            row("CAND", 3, Status::Candidate, Some(2.0)),
            row("PRIME", 3, Status::Prime, Some(2.0)),
        ];
        assert_eq!(tickers(&rank(rows, false)), vec!["PRIME", "CAND"]);
    }

    #[test]
    fn undefined_ratio_sorts_last() {
        let rows = vec![
            row("NONE", 2, Status::Candidate, None),
            row("LOW", 2, Status::Candidate, Some(1.5)),
            row("HIGH", 2, Status::Candidate, Some(3.0)),
        ];
        assert_eq!(tickers(&rank(rows, false)), vec!["HIGH", "LOW", "NONE"]);
    }

    #[test]
    fn full_ties_keep_input_order() {
        let rows = vec![
            row("MSFT", 2, Status::Candidate, Some(2.0)),
            row("ETN", 2, Status::Candidate, Some(2.0)),
            row("MDT", 2, Status::Candidate, Some(2.0)),
            row("IONQ", 1, Status::Fail, None),
            row("MU", 1, Status::Fail, None),
        ];
        assert_eq!(
            tickers(&rank(rows, false)),
            vec!["MSFT", "ETN", "MDT", "IONQ", "MU"]
        );
    }

    #[test]
    fn overlay_orders_within_score_only_when_enabled() {
        let mut bearish = row("BEAR", 2, Status::Candidate, Some(3.0));
        bearish.momentum_agreement = MomentumAgreement::AlignedBearish;
        bearish.adjusted_rank = 1;
        let mut bullish = row("BULL", 2, Status::Candidate, Some(2.0));
        bullish.momentum_agreement = MomentumAgreement::AlignedBullish;
        bullish.adjusted_rank = 3;
        let prime = row("TOP", 3, Status::Prime, Some(2.0));

        let rows = vec![bearish, bullish, prime];
        assert_eq!(tickers(&rank(rows.clone(), false)), vec!["TOP", "BEAR", "BULL"]);
        // The overlay never lifts a row above a higher raw score.
        assert_eq!(tickers(&rank(rows, true)), vec!["TOP", "BULL", "BEAR"]);
    }

    #[test]
    fn empty_input() {
        assert!(rank(Vec::new(), true).is_empty());
    }
}
