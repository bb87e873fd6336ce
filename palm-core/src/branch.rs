//! Engineering branch codes: the closed set of outcomes the quiz can recommend.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Recommendation categories, in declaration order.
///
/// Declaration order doubles as the tie-break order when ranking scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BranchCode {
    #[serde(rename = "CSE")]
    Cse,
    #[serde(rename = "IT")]
    It,
    #[serde(rename = "ECE")]
    Ece,
    #[serde(rename = "ME")]
    Me,
    #[serde(rename = "CE")]
    Ce,
    #[serde(rename = "EEE")]
    Eee,
}

impl BranchCode {
    pub const COUNT: usize = 6;

    pub const ALL: [BranchCode; Self::COUNT] = [
        BranchCode::Cse,
        BranchCode::It,
        BranchCode::Ece,
        BranchCode::Me,
        BranchCode::Ce,
        BranchCode::Eee,
    ];

    /// Position in declaration order (0-based).
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BranchCode::Cse => "CSE",
            BranchCode::It => "IT",
            BranchCode::Ece => "ECE",
            BranchCode::Me => "ME",
            BranchCode::Ce => "CE",
            BranchCode::Eee => "EEE",
        }
    }

    /// Human-readable branch name shown on the result card.
    pub fn label(&self) -> &'static str {
        match self {
            BranchCode::Cse => "Computer Science Engineering (CSE)",
            BranchCode::It => "Information Technology (IT)",
            BranchCode::Ece => "Electronics & Comm. Engineering (ECE)",
            BranchCode::Me => "Mechanical Engineering (ME)",
            BranchCode::Ce => "Civil Engineering (CE)",
            BranchCode::Eee => "Electrical & Electronics Engineering (EEE)",
        }
    }
}

impl fmt::Display for BranchCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown branch code: {0}")]
pub struct UnknownBranch(pub String);

impl FromStr for BranchCode {
    type Err = UnknownBranch;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        BranchCode::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownBranch(s.to_string()))
    }
}

/// Coarse match tier derived from rank position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchLevel {
    High,
    Medium,
    Low,
}

impl MatchLevel {
    /// Rank 0 is High, ranks 1-2 are Medium, everything after is Low.
    pub fn for_rank(rank: usize) -> Self {
        match rank {
            0 => MatchLevel::High,
            1 | 2 => MatchLevel::Medium,
            _ => MatchLevel::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchLevel::High => "High",
            MatchLevel::Medium => "Medium",
            MatchLevel::Low => "Low",
        }
    }
}
