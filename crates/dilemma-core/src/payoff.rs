//! Payoff table and the dynamic temptation adjustment

use serde::{Deserialize, Serialize};
use crate::strategy::Move;

/// Cooperation rate below which the temptation payoff is raised.
pub const LOW_COOPERATION_THRESHOLD: f64 = 0.4;
/// Temptation payoff while global cooperation is low.
pub const RAISED_TEMPTATION: i64 = 7;
/// Baseline temptation payoff.
pub const BASE_TEMPTATION: i64 = 5;

/// Payoff for the row player keyed by (own move, opponent move).
///
/// A key missing from configuration deserializes to zero, so an incomplete
/// table yields zero reward for that outcome instead of failing the match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoffMatrix {
    #[serde(rename = "CC", default)]
    pub cc: i64,
    #[serde(rename = "CD", default)]
    pub cd: i64,
    #[serde(rename = "DC", default)]
    pub dc: i64,
    #[serde(rename = "DD", default)]
    pub dd: i64,
}

impl Default for PayoffMatrix {
    fn default() -> Self {
        Self { cc: 3, cd: 0, dc: 5, dd: 1 }
    }
}

impl PayoffMatrix {
    /// Reward for a player who played `mine` against `theirs`
    pub fn reward(&self, mine: Move, theirs: Move) -> i64 {
        match (mine, theirs) {
            (Move::Cooperate, Move::Cooperate) => self.cc,
            (Move::Cooperate, Move::Defect) => self.cd,
            (Move::Defect, Move::Cooperate) => self.dc,
            (Move::Defect, Move::Defect) => self.dd,
        }
    }

    /// Rewards for both seats of a round: `(reward_a, reward_b)`
    pub fn resolve(&self, move_a: Move, move_b: Move) -> (i64, i64) {
        (self.reward(move_a, move_b), self.reward(move_b, move_a))
    }

    /// Table in force for a match dispatched at `global_cooperation`.
    ///
    /// Only DC moves; CC, CD and DD are returned untouched.
    pub fn adjusted_for(&self, global_cooperation: f64) -> Self {
        let dc = if global_cooperation < LOW_COOPERATION_THRESHOLD {
            RAISED_TEMPTATION
        } else {
            BASE_TEMPTATION
        };
        Self { dc, ..*self }
    }
}
