//! The player contract shared by every strategy variant
//!
//! A [`Player`] owns the match-scoped histories and the reputation; the
//! decision logic lives in a closed set of [`PlayerStrategy`] variants.

use crate::error::AgentError;
use crate::external::ExternalAgent;
use crate::learning::QLearner;
use crate::meta::MetaStrategy;
use crate::payoff::PayoffMatrix;
use crate::random::SeededRng;
use crate::strategy::{execute_strategy, Move, Strategy};

/// Reputation before a player's first completed match.
pub const INITIAL_REPUTATION: f64 = 1.0;

/// Decision logic of a player
#[derive(Clone, Debug)]
pub enum PlayerStrategy {
    /// Deterministic or randomized rule
    Builtin(Strategy),
    /// Tabular Q-learning
    Learning(QLearner),
    /// Decisions delegated to an external model
    External(ExternalAgent),
    /// Rotates between owned sub-players
    Meta(MetaStrategy),
}

#[derive(Clone, Debug)]
pub struct Player {
    name: String,
    my_history: Vec<Move>,
    opponent_history: Vec<Move>,
    reputation: f64,
    strategy: PlayerStrategy,
}

impl Player {
    pub fn new(name: impl Into<String>, strategy: PlayerStrategy) -> Self {
        Self {
            name: name.into(),
            my_history: Vec::new(),
            opponent_history: Vec::new(),
            reputation: INITIAL_REPUTATION,
            strategy,
        }
    }

    pub fn builtin(name: impl Into<String>, strategy: Strategy) -> Self {
        Self::new(name, PlayerStrategy::Builtin(strategy))
    }

    /// Intended move for the next round
    pub fn choose_move(&mut self, rng: &mut SeededRng) -> Result<Move, AgentError> {
        match &mut self.strategy {
            PlayerStrategy::Builtin(strategy) => Ok(execute_strategy(
                strategy,
                &self.opponent_history,
                &self.my_history,
                rng,
            )),
            PlayerStrategy::Learning(learner) => {
                Ok(learner.choose(&self.my_history, &self.opponent_history, rng))
            }
            PlayerStrategy::External(agent) => {
                agent.decide(&self.my_history, &self.opponent_history, self.reputation)
            }
            PlayerStrategy::Meta(meta) => meta.choose(rng),
        }
    }

    /// Append one resolved round (realized moves) and this player's reward
    pub fn record(&mut self, mine: Move, theirs: Move, reward: i64) {
        self.my_history.push(mine);
        self.opponent_history.push(theirs);

        match &mut self.strategy {
            PlayerStrategy::Builtin(_) => {}
            PlayerStrategy::Learning(learner) => {
                learner.learn(reward, &self.my_history, &self.opponent_history)
            }
            PlayerStrategy::External(agent) => agent.observe(mine, theirs, reward),
            PlayerStrategy::Meta(meta) => meta.record(mine, theirs, reward),
        }
    }

    /// Clear everything scoped to a single match
    pub fn reset(&mut self) {
        self.my_history.clear();
        self.opponent_history.clear();

        match &mut self.strategy {
            PlayerStrategy::Builtin(_) => {}
            PlayerStrategy::Learning(learner) => learner.reset(),
            PlayerStrategy::External(agent) => agent.reset(),
            PlayerStrategy::Meta(meta) => meta.reset(),
        }
    }

    /// Reputation = share of cooperative moves in the player's own history.
    /// An empty history keeps the current value.
    pub fn update_reputation(&mut self) {
        if self.my_history.is_empty() {
            return;
        }
        self.reputation = self.cooperations() as f64 / self.my_history.len() as f64;
    }

    /// Hand the match's payoff table to players that want it; a no-op for
    /// everyone else
    pub fn install_payoff_matrix(&mut self, matrix: PayoffMatrix) {
        if let PlayerStrategy::External(agent) = &mut self.strategy {
            agent.install_payoff_matrix(matrix);
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn my_history(&self) -> &[Move] {
        &self.my_history
    }

    pub fn opponent_history(&self) -> &[Move] {
        &self.opponent_history
    }

    pub fn reputation(&self) -> f64 {
        self.reputation
    }

    pub fn strategy(&self) -> &PlayerStrategy {
        &self.strategy
    }

    pub fn cooperations(&self) -> usize {
        self.my_history.iter().filter(|m| **m == Move::Cooperate).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::external::{DecisionBackend, DecisionRequest, ExternalParams};
    use crate::learning::LearningParams;
    use crate::strategy::StrategyBase;
    use crate::strategy::Move::{Cooperate as C, Defect as D};

    #[test]
    fn test_record_appends_both_histories() {
        let mut p = Player::builtin("TitForTat", Strategy::new(StrategyBase::TitForTat));
        p.record(C, D, 0);
        p.record(D, D, 1);
        assert_eq!(p.my_history(), &[C, D]);
        assert_eq!(p.opponent_history(), &[D, D]);
    }

    #[test]
    fn test_reset_clears_histories_but_not_reputation() {
        let mut p = Player::builtin("AlwaysDefect", Strategy::new(StrategyBase::AlwaysDefect));
        p.record(D, C, 5);
        p.update_reputation();
        p.reset();
        assert!(p.my_history().is_empty());
        assert!(p.opponent_history().is_empty());
        assert_eq!(p.reputation(), 0.0);
    }

    #[test]
    fn test_reputation_is_cooperation_fraction() {
        let mut p = Player::builtin("Random", Strategy::new(StrategyBase::Random));
        assert_eq!(p.reputation(), INITIAL_REPUTATION);
        p.update_reputation();
        assert_eq!(p.reputation(), INITIAL_REPUTATION);

        for m in [C, D, C, C] {
            p.record(m, C, 0);
        }
        p.update_reputation();
        assert_eq!(p.reputation(), 0.75);
    }

    #[test]
    fn test_rule_player_sees_realized_history() {
        let mut p = Player::builtin(
            "TitForTat",
            Strategy::with_params(
                StrategyBase::TitForTat,
                crate::strategy::StrategyParams { forgiveness: 0, ..Default::default() },
            ),
        );
        let mut rng = SeededRng::new(3, 0);
        assert_eq!(p.choose_move(&mut rng).unwrap(), C);
        p.record(C, D, 0);
        assert_eq!(p.choose_move(&mut rng).unwrap(), D);
    }

    #[test]
    fn test_learning_player_consumes_reward() {
        let learner = QLearner::new(LearningParams { exploration_rate: 0.0, ..Default::default() });
        let mut p = Player::new("QLearningAgent", PlayerStrategy::Learning(learner));
        let mut rng = SeededRng::new(3, 0);
        let m = p.choose_move(&mut rng).unwrap();
        p.record(m, C, 3);
        match p.strategy() {
            PlayerStrategy::Learning(l) => assert!(l.value(&None, m) > 0.0),
            other => panic!("unexpected strategy {:?}", other),
        }
    }

    #[derive(Debug)]
    struct Silent;

    impl DecisionBackend for Silent {
        fn complete(&self, _request: &DecisionRequest<'_>) -> Result<String, AgentError> {
            Ok("C".into())
        }
    }

    #[test]
    fn test_only_external_players_take_payoff_matrix() {
        let agent = ExternalAgent::new(Arc::new(Silent), ExternalParams::default());
        let mut ext = Player::new("HumanStrategy", PlayerStrategy::External(agent));
        let matrix = PayoffMatrix { cc: 3, cd: 0, dc: 7, dd: 1 };
        ext.install_payoff_matrix(matrix);
        match ext.strategy() {
            PlayerStrategy::External(agent) => assert_eq!(agent.payoff_matrix(), Some(&matrix)),
            other => panic!("unexpected strategy {:?}", other),
        }

        let mut p = Player::builtin("AlwaysCooperate", Strategy::new(StrategyBase::AlwaysCooperate));
        p.install_payoff_matrix(matrix);
        assert!(matches!(p.strategy(), PlayerStrategy::Builtin(_)));
        assert_eq!(p.choose_move(&mut SeededRng::new(1, 0)).unwrap(), C);
    }
}
