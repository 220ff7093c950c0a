//! Tabular Q-learning player

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use crate::random::SeededRng;
use crate::strategy::Move;

/// How many recent moves (per side) make up a learning state.
pub const STATE_WINDOW: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningParams {
    pub learning_rate: f64,
    pub discount_factor: f64,
    pub exploration_rate: f64,
}

impl Default for LearningParams {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount_factor: 0.9,
            exploration_rate: 0.2,
        }
    }
}

/// Recent own moves and recent opponent moves; `None` before the first round.
pub type LearningState = Option<(Vec<Move>, Vec<Move>)>;

/// Action values for one state, indexed by [Cooperate, Defect].
type ActionValues = [f64; 2];

fn action_index(action: Move) -> usize {
    match action {
        Move::Cooperate => 0,
        Move::Defect => 1,
    }
}

#[derive(Clone, Debug)]
pub struct QLearner {
    params: LearningParams,
    q_values: HashMap<LearningState, ActionValues>,
    last_state: LearningState,
    last_action: Option<Move>,
}

impl QLearner {
    pub fn new(params: LearningParams) -> Self {
        Self {
            params,
            q_values: HashMap::new(),
            last_state: None,
            last_action: None,
        }
    }

    /// Window over both histories
    pub fn state_of(my_history: &[Move], opponent_history: &[Move]) -> LearningState {
        if my_history.is_empty() || opponent_history.is_empty() {
            return None;
        }
        let tail = |h: &[Move]| h[h.len().saturating_sub(STATE_WINDOW)..].to_vec();
        Some((tail(my_history), tail(opponent_history)))
    }

    /// Epsilon-greedy choice; ties go to cooperation
    pub fn choose(
        &mut self,
        my_history: &[Move],
        opponent_history: &[Move],
        rng: &mut SeededRng,
    ) -> Move {
        let state = Self::state_of(my_history, opponent_history);
        let values = *self.q_values.entry(state.clone()).or_insert([0.0; 2]);

        let action = if rng.chance(self.params.exploration_rate) {
            if rng.next_range(2) == 0 { Move::Cooperate } else { Move::Defect }
        } else if values[1] > values[0] {
            Move::Defect
        } else {
            Move::Cooperate
        };

        self.last_state = state;
        self.last_action = Some(action);
        action
    }

    /// Temporal-difference update after the round resolved.
    ///
    /// Histories must already include the round just played.
    pub fn learn(&mut self, reward: i64, my_history: &[Move], opponent_history: &[Move]) {
        let Some(action) = self.last_action else {
            return;
        };
        let new_state = Self::state_of(my_history, opponent_history);
        let future = {
            let next = self.q_values.entry(new_state).or_insert([0.0; 2]);
            next[0].max(next[1])
        };

        let LearningParams { learning_rate, discount_factor, .. } = self.params;
        let values = self.q_values.entry(self.last_state.clone()).or_insert([0.0; 2]);
        let old = values[action_index(action)];
        values[action_index(action)] =
            old + learning_rate * (reward as f64 + discount_factor * future - old);
    }

    /// Forget the pending transition; the value table survives
    pub fn reset(&mut self) {
        self.last_state = None;
        self.last_action = None;
    }

    pub fn value(&self, state: &LearningState, action: Move) -> f64 {
        self.q_values
            .get(state)
            .map(|v| v[action_index(action)])
            .unwrap_or(0.0)
    }

    pub fn known_states(&self) -> usize {
        self.q_values.len()
    }
}
