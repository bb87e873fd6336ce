//! Scoring engine: reduce a completed response set to a ranked list of branches.
//!
//! Pure and total. Answers that do not match any option (or are missing)
//! contribute nothing instead of failing.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::bank::QuestionBank;
use crate::branch::BranchCode;
use crate::responses::{Confidence, ResponseSet};

/// Heuristic knobs applied after the weight reduction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    /// Added to each of `bonus_codes` when the confidence signal equals `bonus_trigger`.
    pub confidence_bonus: f64,
    pub bonus_codes: Vec<BranchCode>,
    pub bonus_trigger: Confidence,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            confidence_bonus: 1.5,
            bonus_codes: vec![BranchCode::It, BranchCode::Ece],
            bonus_trigger: Confidence::NotReally,
        }
    }
}

/// Accumulated score per branch. Always carries every code.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreTable {
    scores: [f64; BranchCode::COUNT],
}

impl ScoreTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, code: BranchCode) -> f64 {
        self.scores[code.index()]
    }

    pub fn add(&mut self, code: BranchCode, amount: f64) {
        self.scores[code.index()] += amount;
    }

    /// `(code, score)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (BranchCode, f64)> + '_ {
        BranchCode::ALL.into_iter().map(|c| (c, self.get(c)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedScore {
    pub code: BranchCode,
    pub score: f64,
}

/// Every branch exactly once, sorted by score descending.
///
/// Ties keep declaration order (stable sort).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    entries: [RankedScore; BranchCode::COUNT],
}

impl RankedResult {
    pub fn top(&self) -> RankedScore {
        self.entries[0]
    }

    /// Ranks 2 and 3.
    pub fn secondaries(&self) -> &[RankedScore] {
        &self.entries[1..3]
    }

    pub fn entries(&self) -> &[RankedScore] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &RankedScore> {
        self.entries.iter()
    }

    /// 0-based rank of a code.
    pub fn rank_of(&self, code: BranchCode) -> usize {
        self.entries
            .iter()
            .position(|e| e.code == code)
            .unwrap_or(BranchCode::COUNT)
    }

    pub fn score_of(&self, code: BranchCode) -> f64 {
        self.entries
            .iter()
            .find(|e| e.code == code)
            .map(|e| e.score)
            .unwrap_or(0.0)
    }
}

/// Sum the weights of the chosen options, then apply the confidence bonus.
pub fn score_responses(
    bank: &QuestionBank,
    responses: &ResponseSet,
    policy: &ScoringPolicy,
) -> ScoreTable {
    let mut table = ScoreTable::new();

    for q in bank.iter() {
        let Some(label) = responses.answer_for(&q.id) else {
            tracing::debug!(question = %q.id, "no answer recorded; contributes nothing");
            continue;
        };
        let Some(option) = q.option_by_label(label) else {
            tracing::debug!(
                question = %q.id,
                label,
                "answer matches no option; contributes nothing"
            );
            continue;
        };
        for (code, weight) in &option.weights {
            table.add(*code, *weight);
        }
    }

    if responses.confidence() == Some(policy.bonus_trigger) {
        // Each listed code gets the bonus once, even if listed twice.
        for code in BranchCode::ALL.into_iter().filter(|c| policy.bonus_codes.contains(c)) {
            table.add(code, policy.confidence_bonus);
        }
    }

    table
}

pub fn rank(table: &ScoreTable) -> RankedResult {
    let mut entries = BranchCode::ALL.map(|code| RankedScore {
        code,
        score: table.get(code),
    });
    entries.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    RankedResult { entries }
}

/// Score and rank in one pass.
pub fn evaluate(
    bank: &QuestionBank,
    responses: &ResponseSet,
    policy: &ScoringPolicy,
) -> RankedResult {
    rank(&score_responses(bank, responses, policy))
}
