//! Noisy Iterated Prisoner's Dilemma tournaments
//!
//! Core engine: payoff tables, execution noise and shock windows, the player
//! contract with its rule-based, learning, external and meta variants, the
//! match loop, pairing topologies and the tournament orchestrator.
//!
//! All randomness flows through [`SeededRng`]; a tournament seed fixes every
//! score, in sequential and parallel runs alike.

mod config;
mod error;
mod external;
mod factory;
mod game;
mod learning;
mod meta;
mod noise;
mod payoff;
mod player;
mod random;
mod strategy;
mod topology;
mod tournament;

pub use config::{LocalLlmParams, LoggingConfig, MetaAgentParams, RemoteLlmParams, TournamentConfig};
pub use error::{AgentError, ArenaError, ConfigError};
pub use external::{
    parse_decision, DecisionBackend, DecisionRequest, ExternalAgent, ExternalParams,
    RewardVisibility, SYSTEM_PROMPT,
};
pub use factory::{describe_name, StrategyFactory, EXTERNAL_NAMES, KNOWN_NAMES};
pub use game::{run_match, Match, MatchConfig, MatchReport, MatchState, RoundCount, RoundResult};
pub use learning::{LearningParams, QLearner};
pub use meta::MetaStrategy;
pub use noise::{apply_noise, ShockController};
pub use payoff::PayoffMatrix;
pub use player::{Player, PlayerStrategy, INITIAL_REPUTATION};
pub use random::SeededRng;
pub use strategy::{describe_strategy, execute_strategy, Move, Strategy, StrategyBase, StrategyParams};
pub use topology::{build_topology, round_robin_pairs, NetworkParams, PairingGraph, TopologyKind};
pub use tournament::{MatchResult, Tournament};
