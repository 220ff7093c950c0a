//! Meta-strategy that rotates between owned sub-players

use crate::error::AgentError;
use crate::player::Player;
use crate::random::SeededRng;
use crate::strategy::{Move, Strategy, StrategyBase};

#[derive(Clone, Debug)]
pub struct MetaStrategy {
    delegates: Vec<Player>,
    active: usize,
    switch_frequency: u32,
    round_counter: u32,
    delegate_scores: Vec<i64>,
}

impl MetaStrategy {
    /// An empty delegate list falls back to a forgiving Tit-for-Tat.
    pub fn new(mut delegates: Vec<Player>, switch_frequency: u32) -> Self {
        if delegates.is_empty() {
            delegates.push(Player::builtin(
                "TitForTatExtended",
                Strategy::new(StrategyBase::TitForTat),
            ));
        }
        let count = delegates.len();
        Self {
            delegates,
            active: 0,
            switch_frequency: switch_frequency.max(1),
            round_counter: 0,
            delegate_scores: vec![0; count],
        }
    }

    pub fn choose(&mut self, rng: &mut SeededRng) -> Result<Move, AgentError> {
        self.round_counter += 1;
        if self.round_counter % self.switch_frequency == 0 {
            self.switch_delegate(rng);
        }
        self.delegates[self.active].choose_move(rng)
    }

    /// Pick a different delegate uniformly at random
    fn switch_delegate(&mut self, rng: &mut SeededRng) {
        let count = self.delegates.len();
        if count < 2 {
            return;
        }
        let mut next = rng.next_range(count as u32 - 1) as usize;
        if next >= self.active {
            next += 1;
        }
        log::debug!(
            "Meta-strategy switching {} -> {}",
            self.delegates[self.active].name(),
            self.delegates[next].name()
        );
        self.active = next;
    }

    pub fn record(&mut self, mine: Move, theirs: Move, reward: i64) {
        let delegate = &mut self.delegates[self.active];
        delegate.record(mine, theirs, reward);
        delegate.update_reputation();
        self.delegate_scores[self.active] += reward;
    }

    pub fn reset(&mut self) {
        for delegate in &mut self.delegates {
            delegate.reset();
        }
        self.delegate_scores.iter_mut().for_each(|s| *s = 0);
        self.round_counter = 0;
        self.active = 0;
    }

    pub fn active(&self) -> &Player {
        &self.delegates[self.active]
    }

    pub fn delegates(&self) -> &[Player] {
        &self.delegates
    }

    /// Reward earned while each delegate was active, this match
    pub fn delegate_scores(&self) -> &[i64] {
        &self.delegate_scores
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::PlayerStrategy;
    use crate::strategy::Move::{Cooperate as C, Defect as D};

    fn cooperator_and_defector(switch_frequency: u32) -> Player {
        let meta = MetaStrategy::new(
            vec![
                Player::builtin("AlwaysCooperate", Strategy::new(StrategyBase::AlwaysCooperate)),
                Player::builtin("AlwaysDefect", Strategy::new(StrategyBase::AlwaysDefect)),
            ],
            switch_frequency,
        );
        Player::new("MetaAgent", PlayerStrategy::Meta(meta))
    }

    fn meta_of(p: &Player) -> &MetaStrategy {
        match p.strategy() {
            PlayerStrategy::Meta(m) => m,
            other => panic!("unexpected strategy {:?}", other),
        }
    }

    #[test]
    fn test_switches_every_n_rounds() {
        let mut p = cooperator_and_defector(3);
        let mut rng = SeededRng::new(5, 0);
        let mut moves = Vec::new();
        for _ in 0..6 {
            let m = p.choose_move(&mut rng).unwrap();
            p.record(m, C, 0);
            moves.push(m);
        }
        // with two delegates a switch always lands on the other one
        assert_eq!(moves, vec![C, C, D, D, D, C]);
    }

    #[test]
    fn test_record_updates_meta_and_delegate() {
        let mut p = cooperator_and_defector(10);
        let mut rng = SeededRng::new(5, 0);
        let m = p.choose_move(&mut rng).unwrap();
        p.record(m, D, 0);

        assert_eq!(p.my_history(), &[C]);
        let meta = meta_of(&p);
        assert_eq!(meta.active().my_history(), &[C]);
        assert_eq!(meta.active().opponent_history(), &[D]);
        assert_eq!(meta.active().reputation(), 1.0);
    }

    #[test]
    fn test_delegate_scores_track_active_delegate() {
        let mut p = cooperator_and_defector(2);
        let mut rng = SeededRng::new(5, 0);
        for reward in [3, 4, 5] {
            let m = p.choose_move(&mut rng).unwrap();
            p.record(m, C, reward);
        }
        assert_eq!(meta_of(&p).delegate_scores(), &[3, 9]);
    }

    #[test]
    fn test_reset_restores_first_delegate() {
        let mut p = cooperator_and_defector(1);
        let mut rng = SeededRng::new(5, 0);
        let m = p.choose_move(&mut rng).unwrap();
        p.record(m, C, 5);
        assert_eq!(meta_of(&p).active().name(), "AlwaysDefect");

        p.reset();
        let meta = meta_of(&p);
        assert_eq!(meta.active().name(), "AlwaysCooperate");
        assert!(meta.delegates().iter().all(|d| d.my_history().is_empty()));
        assert_eq!(meta.delegate_scores(), &[0, 0]);
        assert!(p.my_history().is_empty());
    }

    #[test]
    fn test_empty_delegates_fall_back() {
        let meta = MetaStrategy::new(Vec::new(), 5);
        assert_eq!(meta.delegates().len(), 1);
        assert_eq!(meta.active().name(), "TitForTatExtended");
    }

    #[test]
    fn test_single_delegate_never_switches() {
        let mut meta = MetaStrategy::new(
            vec![Player::builtin("AlwaysDefect", Strategy::new(StrategyBase::AlwaysDefect))],
            1,
        );
        let mut rng = SeededRng::new(5, 0);
        for _ in 0..5 {
            assert_eq!(meta.choose(&mut rng).unwrap(), D);
        }
    }
}
