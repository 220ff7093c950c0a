//! Error types for the tournament engine

use thiserror::Error;

/// Failure reported by an external decision backend.
///
/// These are fatal for the run: the engine never retries or substitutes a move.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("decision backend unreachable: {0}")]
    Unreachable(String),

    #[error("missing credential: {0}")]
    MissingCredential(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("backend failure: {0}")]
    Backend(String),
}

#[derive(Debug, Error)]
pub enum ArenaError {
    #[error("invalid match state for this action")]
    InvalidState,

    #[error("external agent {player} failed")]
    ExternalAgent {
        player: String,
        #[source]
        source: AgentError,
    },

    #[error("no decision backend registered for {0}")]
    MissingBackend(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be a probability in [0, 1], got {value}")]
    Probability { field: &'static str, value: f64 },

    #[error("rounds must be at least 1")]
    ZeroRounds,

    #[error("min_rounds ({min}) exceeds max_rounds ({max})")]
    RoundRange { min: u32, max: u32 },

    #[error("meta_agent.switch_frequency must be at least 1")]
    ZeroSwitchFrequency,

    #[error("strategy list is empty")]
    NoStrategies,

    #[error("invalid configuration JSON")]
    Parse(#[from] serde_json::Error),
}
