//! Players whose moves come from an external model
//!
//! The engine builds the prompt and parses the reply; the transport lives
//! behind [`DecisionBackend`]. Backend failures are returned as errors and end
//! the run.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use crate::error::AgentError;
use crate::payoff::PayoffMatrix;
use crate::strategy::Move;

pub const SYSTEM_PROMPT: &str = "You are playing an Iterated Prisoner's Dilemma game. \
You should respond with either 'C' to cooperate or 'D' to defect.";

/// One decision request handed to a backend
#[derive(Clone, Debug)]
pub struct DecisionRequest<'a> {
    pub system: &'a str,
    pub prompt: &'a str,
    pub temperature: f64,
}

/// Transport to a decision-making model (remote API, local server, console)
pub trait DecisionBackend: Send + Sync + fmt::Debug {
    fn complete(&self, request: &DecisionRequest<'_>) -> Result<String, AgentError>;
}

/// Which running reward totals are shown to the model
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardVisibility {
    #[default]
    None,
    #[serde(rename = "self")]
    Own,
    Both,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalParams {
    pub temperature: f64,
    pub extended_prompt: bool,
    pub reward_visibility: RewardVisibility,
}

impl Default for ExternalParams {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            extended_prompt: true,
            reward_visibility: RewardVisibility::None,
        }
    }
}

/// Interpret a model reply: any `D` means defect, anything else cooperates
pub fn parse_decision(reply: &str) -> Move {
    if reply.trim().to_uppercase().contains('D') {
        Move::Defect
    } else {
        Move::Cooperate
    }
}

fn join_moves(moves: &[Move]) -> String {
    moves
        .iter()
        .map(|m| m.as_char().to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[derive(Clone, Debug)]
pub struct ExternalAgent {
    backend: Arc<dyn DecisionBackend>,
    params: ExternalParams,
    /// Filled in by the match before the first round.
    payoff_matrix: Option<PayoffMatrix>,
    round_rewards: Vec<i64>,
    opponent_rewards: Vec<i64>,
}

impl ExternalAgent {
    pub fn new(backend: Arc<dyn DecisionBackend>, params: ExternalParams) -> Self {
        Self {
            backend,
            params,
            payoff_matrix: None,
            round_rewards: Vec::new(),
            opponent_rewards: Vec::new(),
        }
    }

    pub fn install_payoff_matrix(&mut self, matrix: PayoffMatrix) {
        self.payoff_matrix = Some(matrix);
    }

    pub fn payoff_matrix(&self) -> Option<&PayoffMatrix> {
        self.payoff_matrix.as_ref()
    }

    /// Remember the round's rewards. The opponent's share is derived from the
    /// installed table.
    pub fn observe(&mut self, mine: Move, theirs: Move, reward: i64) {
        self.round_rewards.push(reward);
        if let Some(matrix) = &self.payoff_matrix {
            self.opponent_rewards.push(matrix.reward(theirs, mine));
        }
    }

    pub fn reset(&mut self) {
        self.round_rewards.clear();
        self.opponent_rewards.clear();
    }

    fn rewards_info(&self) -> String {
        let own: i64 = self.round_rewards.iter().sum();
        match self.params.reward_visibility {
            RewardVisibility::None => String::new(),
            RewardVisibility::Own => format!("Your total reward: {}", own),
            RewardVisibility::Both => {
                let theirs: i64 = self.opponent_rewards.iter().sum();
                format!("Your total reward: {}\nOpponent's total reward: {}", own, theirs)
            }
        }
    }

    /// Textual description of the game state for the model
    pub fn build_prompt(&self, my_history: &[Move], opponent_history: &[Move], reputation: f64) -> String {
        if my_history.is_empty() {
            return format!(
                "No history. Please choose C or D. Your reputation is {:.2}.",
                reputation
            );
        }

        let history = format!(
            "Your moves: {}; Opponent moves: {}.",
            join_moves(my_history),
            join_moves(opponent_history)
        );

        match (&self.payoff_matrix, self.params.extended_prompt) {
            (Some(m), true) => format!(
                "You are playing Iterated Prisoner's Dilemma.\n\n\
                 GAME RULES:\n\
                 - If both players cooperate (C,C), both get {cc} points\n\
                 - If you cooperate but opponent defects (C,D), you get {cd} and opponent gets {dc}\n\
                 - If you defect but opponent cooperates (D,C), you get {dc} and opponent gets {cd}\n\
                 - If both defect (D,D), both get {dd} points\n\n\
                 GAME STATE:\n\
                 {history}\n\
                 Your current reputation: {reputation:.2}\n\
                 {rewards}\n\n\
                 Based on this information, decide whether to cooperate (C) or defect (D).",
                cc = m.cc,
                cd = m.cd,
                dc = m.dc,
                dd = m.dd,
                history = history,
                reputation = reputation,
                rewards = self.rewards_info(),
            ),
            _ => format!(
                "You are playing Iterated Prisoner's Dilemma.\n\
                 {}\n\
                 Your current reputation is {:.2}.\n\
                 Based on this, decide whether to cooperate (C) or defect (D).",
                history, reputation
            ),
        }
    }

    pub fn decide(
        &self,
        my_history: &[Move],
        opponent_history: &[Move],
        reputation: f64,
    ) -> Result<Move, AgentError> {
        let prompt = self.build_prompt(my_history, opponent_history, reputation);
        let reply = self.backend.complete(&DecisionRequest {
            system: SYSTEM_PROMPT,
            prompt: &prompt,
            temperature: self.params.temperature,
        })?;
        Ok(parse_decision(&reply))
    }
}
