//! Tournament orchestration
//!
//! The tournament owns the canonical roster. Each match plays on clones, so
//! canonical players keep whatever state they were created with; only the
//! score map, result list and cooperation history change during a run.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use crate::config::TournamentConfig;
use crate::error::ArenaError;
use crate::factory::StrategyFactory;
use crate::game::{run_match, MatchConfig, MatchReport};
use crate::player::Player;
use crate::random::{SeededRng, TOPOLOGY_STREAM};
use crate::topology::{build_topology, pair_rank, round_robin_pairs, PairingGraph, TopologyKind};

/// One completed match, as persisted
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub player1: String,
    pub player2: String,
    pub score1: i64,
    pub score2: i64,
}

#[derive(Debug)]
pub struct Tournament {
    config: TournamentConfig,
    match_config: MatchConfig,
    players: Vec<Player>,
    graph: Option<PairingGraph>,
    scores: BTreeMap<String, i64>,
    results: Vec<MatchResult>,
    cooperation_history: Vec<f64>,
}

impl Tournament {
    /// Build the roster from the configured strategy names.
    /// Unknown names are skipped with a warning.
    pub fn new(config: TournamentConfig, factory: &StrategyFactory) -> Result<Self, ArenaError> {
        config.validate()?;
        let mut players = Vec::with_capacity(config.strategies.len());
        for name in &config.strategies {
            match factory.build(name, &config)? {
                Some(player) => players.push(player),
                None => log::warn!("Unknown strategy {:?}; skipping", name),
            }
        }
        Ok(Self::assemble(config, players))
    }

    /// Use an explicit roster instead of building one from names
    pub fn with_players(config: TournamentConfig, players: Vec<Player>) -> Result<Self, ArenaError> {
        config.validate()?;
        Ok(Self::assemble(config, players))
    }

    fn assemble(config: TournamentConfig, players: Vec<Player>) -> Self {
        let graph = if config.network.enabled {
            let mut rng = SeededRng::new(config.seed, TOPOLOGY_STREAM);
            Some(build_topology(
                players.len(),
                TopologyKind::from_name(&config.network.kind),
                config.network.connectivity,
                &mut rng,
            ))
        } else {
            None
        };

        let scores = players.iter().map(|p| (p.name().to_string(), 0)).collect();

        let tournament = Self {
            match_config: config.match_config(),
            config,
            players,
            graph,
            scores,
            results: Vec::new(),
            cooperation_history: Vec::new(),
        };
        for name in tournament.isolated_players() {
            log::warn!("{} has no pairings in the network", name);
        }
        tournament
    }

    /// Players the pairing graph leaves without an opponent. Empty under
    /// round-robin.
    pub fn isolated_players(&self) -> Vec<&str> {
        match &self.graph {
            Some(graph) => self
                .players
                .iter()
                .enumerate()
                .filter(|(i, _)| graph.degree(*i) == 0)
                .map(|(_, p)| p.name())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Index pairs to play, in dispatch order
    pub fn pairings(&self) -> Vec<(usize, usize)> {
        match &self.graph {
            Some(graph) => graph.edges().collect(),
            None => round_robin_pairs(self.players.len()),
        }
    }

    /// Share of cooperative moves across the canonical players' histories
    pub fn global_cooperation_rate(&self) -> f64 {
        let (cooperations, total) = self.players.iter().fold((0, 0), |(c, t), p| {
            (c + p.cooperations(), t + p.my_history().len())
        });
        if total == 0 {
            1.0
        } else {
            cooperations as f64 / total as f64
        }
    }

    /// Play every pairing one after another
    pub fn run(&mut self) -> Result<(), ArenaError> {
        self.clear();
        for (a, b) in self.pairings() {
            let global_cooperation = self.global_cooperation_rate();
            let report = self.play_pairing(a, b, global_cooperation)?;
            self.aggregate(a, b, &report);
        }
        self.log_leaderboard();
        Ok(())
    }

    /// Play every pairing on the rayon pool. Results are aggregated in
    /// dispatch order, so the outcome matches [`Tournament::run`].
    pub fn run_parallel(&mut self) -> Result<(), ArenaError> {
        self.clear();
        let pairings = self.pairings();
        // canonical players are never mutated, so one snapshot serves every match
        let global_cooperation = self.global_cooperation_rate();

        let reports = pairings
            .par_iter()
            .map(|&(a, b)| self.play_pairing(a, b, global_cooperation))
            .collect::<Result<Vec<_>, _>>()?;

        for (&(a, b), report) in pairings.iter().zip(&reports) {
            self.aggregate(a, b, report);
        }
        self.log_leaderboard();
        Ok(())
    }

    fn play_pairing(&self, a: usize, b: usize, global_cooperation: f64) -> Result<MatchReport, ArenaError> {
        let (player_a, player_b) = (&self.players[a], &self.players[b]);
        log::info!("Match: {} vs {}", player_a.name(), player_b.name());

        let rng = SeededRng::new(self.config.seed, pair_rank(a, b));
        let (report, _, _) = run_match(player_a, player_b, &self.match_config, global_cooperation, rng)?;

        log::info!(
            "Result: {} {} - {} {}",
            player_a.name(),
            report.total_score_a,
            player_b.name(),
            report.total_score_b
        );
        Ok(report)
    }

    fn aggregate(&mut self, a: usize, b: usize, report: &MatchReport) {
        let name_a = self.players[a].name().to_string();
        let name_b = self.players[b].name().to_string();

        *self.scores.entry(name_a.clone()).or_insert(0) += report.total_score_a;
        *self.scores.entry(name_b.clone()).or_insert(0) += report.total_score_b;
        self.cooperation_history.push(report.cooperation_rate());
        self.results.push(MatchResult {
            player1: name_a,
            player2: name_b,
            score1: report.total_score_a,
            score2: report.total_score_b,
        });
    }

    fn clear(&mut self) {
        self.results.clear();
        self.cooperation_history.clear();
        self.scores.values_mut().for_each(|s| *s = 0);
    }

    fn log_leaderboard(&self) {
        log::info!("Tournament finished. Leaderboard:");
        for (rank, (name, score)) in self.leaderboard().iter().enumerate() {
            log::info!("{}. {}: {}", rank + 1, name, score);
        }
    }

    /// Cumulative score per player name
    pub fn scores(&self) -> &BTreeMap<String, i64> {
        &self.scores
    }

    pub fn results(&self) -> &[MatchResult] {
        &self.results
    }

    /// Names by score, highest first; ties broken by name
    pub fn leaderboard(&self) -> Vec<(String, i64)> {
        let mut board: Vec<(String, i64)> =
            self.scores.iter().map(|(name, score)| (name.clone(), *score)).collect();
        board.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        board
    }

    /// Cooperation rate of each match, in dispatch order
    pub fn cooperation_history(&self) -> &[f64] {
        &self.cooperation_history
    }

    pub fn graph(&self) -> Option<&PairingGraph> {
        self.graph.as_ref()
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn config(&self) -> &TournamentConfig {
        &self.config
    }
}
