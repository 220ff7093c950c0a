//! Match execution engine

use serde::{Deserialize, Serialize};
use crate::error::ArenaError;
use crate::noise::{apply_noise, ShockController};
use crate::payoff::PayoffMatrix;
use crate::player::{Player, PlayerStrategy};
use crate::random::SeededRng;
use crate::strategy::Move;

/// How long a match lasts
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundCount {
    Fixed(u32),
    /// Drawn uniformly from `[min, max]` once, when the match is built
    Random { min: u32, max: u32 },
}

/// Everything a match needs besides its two players
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    pub rounds: RoundCount,
    pub noise: f64,
    pub shock_frequency: f64,
    pub shock_duration: u32,
    pub payoff: PayoffMatrix,
    pub dynamic_payoffs: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            rounds: RoundCount::Fixed(200),
            noise: 0.0,
            shock_frequency: 0.0,
            shock_duration: 0,
            payoff: PayoffMatrix::default(),
            dynamic_payoffs: false,
        }
    }
}

/// Result of a single round
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    pub round: u32,
    pub intended_a: Move,
    pub intended_b: Move,
    pub move_a: Move,
    pub move_b: Move,
    pub score_a: i64,
    pub score_b: i64,
    pub cumulative_a: i64,
    pub cumulative_b: i64,
    pub shock: bool,
}

/// Result of a complete match
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    pub rounds: Vec<RoundResult>,
    pub total_score_a: i64,
    pub total_score_b: i64,
    pub round_count: u32,
    pub payoff: PayoffMatrix,
}

impl MatchReport {
    /// Share of cooperative realized moves over both seats
    pub fn cooperation_rate(&self) -> f64 {
        if self.rounds.is_empty() {
            return 1.0;
        }
        let cooperations: usize = self
            .rounds
            .iter()
            .map(|r| {
                (r.move_a == Move::Cooperate) as usize + (r.move_b == Move::Cooperate) as usize
            })
            .sum();
        cooperations as f64 / (2 * self.rounds.len()) as f64
    }

    pub fn shock_rounds(&self) -> usize {
        self.rounds.iter().filter(|r| r.shock).count()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchState {
    NotStarted,
    Running,
    Finished,
}

/// One pairing played out over a fixed number of rounds
///
/// The match owns its two players; callers hand in snapshots, never the
/// tournament's canonical instances.
#[derive(Debug)]
pub struct Match {
    player_a: Player,
    player_b: Player,
    payoff: PayoffMatrix,
    noise: f64,
    shock: ShockController,
    round_count: u32,
    rng: SeededRng,
    state: MatchState,
}

impl Match {
    /// Build a match. The round count and, in dynamic mode, the payoff table
    /// are fixed here for the whole match.
    pub fn new(
        player_a: Player,
        player_b: Player,
        config: &MatchConfig,
        global_cooperation: f64,
        mut rng: SeededRng,
    ) -> Self {
        let round_count = determine_round_count(&mut rng, config.rounds);
        let payoff = if config.dynamic_payoffs {
            config.payoff.adjusted_for(global_cooperation)
        } else {
            config.payoff
        };

        Self {
            player_a,
            player_b,
            payoff,
            noise: config.noise,
            shock: ShockController::new(config.shock_frequency, config.shock_duration),
            round_count,
            rng,
            state: MatchState::NotStarted,
        }
    }

    /// Run every round and settle reputations
    pub fn play(&mut self) -> Result<MatchReport, ArenaError> {
        if self.state != MatchState::NotStarted {
            return Err(ArenaError::InvalidState);
        }
        self.state = MatchState::Running;

        self.player_a.reset();
        self.player_b.reset();
        self.player_a.install_payoff_matrix(self.payoff);
        self.player_b.install_payoff_matrix(self.payoff);

        let mut rounds: Vec<RoundResult> = Vec::with_capacity(self.round_count as usize);
        let mut total_a = 0i64;
        let mut total_b = 0i64;

        for round in 0..self.round_count {
            // Per-player streams so one seat's draws never shift the other's
            let mut rng_a = self.rng.fork(round as u64 * 2);
            let mut rng_b = self.rng.fork(round as u64 * 2 + 1);

            let intended_a = decide(&mut self.player_a, &mut rng_a)?;
            let intended_b = decide(&mut self.player_b, &mut rng_b)?;

            let (noise, shock) = self.shock.effective_noise(self.noise, &mut self.rng);
            let move_a = apply_noise(intended_a, noise, &mut self.rng);
            let move_b = apply_noise(intended_b, noise, &mut self.rng);

            let (score_a, score_b) = self.payoff.resolve(move_a, move_b);
            total_a += score_a;
            total_b += score_b;

            self.player_a.record(move_a, move_b, score_a);
            self.player_b.record(move_b, move_a, score_b);
            assert_eq!(
                self.player_a.my_history().len(),
                self.player_b.my_history().len(),
                "history length mismatch between {} and {}",
                self.player_a.name(),
                self.player_b.name()
            );

            log::debug!(
                "Round {}: {} played {}, {} played {}. Rewards: ({}, {})",
                round + 1,
                self.player_a.name(),
                move_a,
                self.player_b.name(),
                move_b,
                score_a,
                score_b
            );

            rounds.push(RoundResult {
                round,
                intended_a,
                intended_b,
                move_a,
                move_b,
                score_a,
                score_b,
                cumulative_a: total_a,
                cumulative_b: total_b,
                shock,
            });
        }

        self.player_a.update_reputation();
        self.player_b.update_reputation();
        self.state = MatchState::Finished;

        let report = MatchReport {
            rounds,
            total_score_a: total_a,
            total_score_b: total_b,
            round_count: self.round_count,
            payoff: self.payoff,
        };
        log::debug!(
            "{} vs {} over {} rounds, {} under shock",
            self.player_a.name(),
            self.player_b.name(),
            report.round_count,
            report.shock_rounds()
        );
        for player in [&self.player_a, &self.player_b] {
            if let Some(summary) = strategy_summary(player) {
                log::debug!("{}: {}", player.name(), summary);
            }
        }
        Ok(report)
    }

    pub fn state(&self) -> MatchState {
        self.state
    }

    pub fn round_count(&self) -> u32 {
        self.round_count
    }

    pub fn payoff(&self) -> &PayoffMatrix {
        &self.payoff
    }

    pub fn players(&self) -> (&Player, &Player) {
        (&self.player_a, &self.player_b)
    }

    pub fn into_players(self) -> (Player, Player) {
        (self.player_a, self.player_b)
    }
}

fn decide(player: &mut Player, rng: &mut SeededRng) -> Result<Move, ArenaError> {
    player
        .choose_move(rng)
        .map_err(|source| ArenaError::ExternalAgent {
            player: player.name().to_string(),
            source,
        })
}

/// End-of-match internals worth logging, for strategies that keep any
fn strategy_summary(player: &Player) -> Option<String> {
    match player.strategy() {
        PlayerStrategy::Meta(meta) => {
            let scores = meta
                .delegates()
                .iter()
                .zip(meta.delegate_scores())
                .map(|(delegate, score)| format!("{}={}", delegate.name(), score))
                .collect::<Vec<_>>()
                .join(", ");
            Some(format!("delegate scores {}", scores))
        }
        PlayerStrategy::Learning(learner) => {
            Some(format!("{} states in Q-table", learner.known_states()))
        }
        PlayerStrategy::Builtin(_) | PlayerStrategy::External(_) => None,
    }
}

/// Determine how many rounds this match will have
fn determine_round_count(rng: &mut SeededRng, rounds: RoundCount) -> u32 {
    match rounds {
        RoundCount::Fixed(n) => n,
        RoundCount::Random { min, max } => rng.next_between(min, max),
    }
}

/// Play a match between independent copies of two players
///
/// # Arguments
/// * `player_a` - First player; cloned, never mutated
/// * `player_b` - Second player; cloned, never mutated
/// * `config` - Round count, noise, shock and payoff settings
/// * `global_cooperation` - Tournament cooperation rate captured at dispatch
/// * `rng` - The match's own random stream
///
/// # Returns
/// Round-by-round report plus the played copies of both players
pub fn run_match(
    player_a: &Player,
    player_b: &Player,
    config: &MatchConfig,
    global_cooperation: f64,
    rng: SeededRng,
) -> Result<(MatchReport, Player, Player), ArenaError> {
    let mut game = Match::new(player_a.clone(), player_b.clone(), config, global_cooperation, rng);
    let report = game.play()?;
    let (a, b) = game.into_players();
    Ok((report, a, b))
}
