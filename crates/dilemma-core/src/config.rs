//! Tournament configuration
//!
//! Every field has a default, so a JSON document only needs the keys it
//! changes. [`TournamentConfig::validate`] must pass before a run starts.

use serde::{Deserialize, Serialize};
use crate::error::ConfigError;
use crate::external::ExternalParams;
use crate::game::{MatchConfig, RoundCount};
use crate::learning::LearningParams;
use crate::payoff::PayoffMatrix;
use crate::strategy::StrategyParams;
use crate::topology::NetworkParams;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetaAgentParams {
    pub base_strategies: Vec<String>,
    pub switch_frequency: u32,
}

impl Default for MetaAgentParams {
    fn default() -> Self {
        Self {
            base_strategies: vec![
                "TitForTatExtended".to_string(),
                "AlwaysDefect".to_string(),
                "RandomStrategy".to_string(),
            ],
            switch_frequency: 50,
        }
    }
}

/// Hosted chat-completions endpoint. The API key comes from `OPENAI_API_KEY`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteLlmParams {
    pub api_base: String,
    pub model: String,
}

impl Default for RemoteLlmParams {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o".to_string(),
        }
    }
}

/// Locally served model behind an OpenAI-compatible completions API
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalLlmParams {
    pub endpoint: String,
    pub model: String,
}

impl Default for LocalLlmParams {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8000".to_string(),
            model: "SeaLLMs/SeaLLMs-v3-1.5B-Chat".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_file: String,
    pub verbose: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_file: "tournament.log".to_string(),
            verbose: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TournamentConfig {
    pub strategies: Vec<String>,
    pub rounds: u32,
    pub rounds_random: bool,
    pub min_rounds: u32,
    pub max_rounds: u32,
    pub payoff_matrix: PayoffMatrix,
    pub dynamic_payoffs: bool,
    pub noise: f64,
    pub shock_frequency: f64,
    pub shock_duration: u32,
    /// Root of every random stream in the run
    pub seed: u64,
    pub rule_params: StrategyParams,
    pub rl_params: LearningParams,
    pub meta_agent: MetaAgentParams,
    pub external_agent: ExternalParams,
    pub remote_llm: RemoteLlmParams,
    pub local_llm: LocalLlmParams,
    pub network: NetworkParams,
    pub logging: LoggingConfig,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            strategies: [
                "AlwaysCooperate",
                "AlwaysDefect",
                "RandomStrategy",
                "TitForTatExtended",
                "Grudger",
                "Joss",
                "TitForTwoTats",
                "QLearningAgent",
                "MetaAgent",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            rounds: 200,
            rounds_random: false,
            min_rounds: 150,
            max_rounds: 250,
            payoff_matrix: PayoffMatrix::default(),
            dynamic_payoffs: false,
            noise: 0.05,
            shock_frequency: 0.02,
            shock_duration: 20,
            seed: 0,
            rule_params: StrategyParams::default(),
            rl_params: LearningParams::default(),
            meta_agent: MetaAgentParams::default(),
            external_agent: ExternalParams::default(),
            remote_llm: RemoteLlmParams::default(),
            local_llm: LocalLlmParams::default(),
            network: NetworkParams::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn check_probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Probability { field, value })
    }
}

impl TournamentConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.strategies.is_empty() {
            return Err(ConfigError::NoStrategies);
        }
        if self.rounds_random {
            if self.min_rounds > self.max_rounds {
                return Err(ConfigError::RoundRange { min: self.min_rounds, max: self.max_rounds });
            }
            if self.max_rounds == 0 {
                return Err(ConfigError::ZeroRounds);
            }
        } else if self.rounds == 0 {
            return Err(ConfigError::ZeroRounds);
        }
        check_probability("noise", self.noise)?;
        check_probability("shock_frequency", self.shock_frequency)?;
        check_probability("network.connectivity", self.network.connectivity)?;
        check_probability("rl_params.learning_rate", self.rl_params.learning_rate)?;
        check_probability("rl_params.discount_factor", self.rl_params.discount_factor)?;
        check_probability("rl_params.exploration_rate", self.rl_params.exploration_rate)?;
        if self.meta_agent.switch_frequency == 0 {
            return Err(ConfigError::ZeroSwitchFrequency);
        }
        Ok(())
    }

    /// Per-match settings derived from the tournament configuration
    pub fn match_config(&self) -> MatchConfig {
        let rounds = if self.rounds_random {
            RoundCount::Random { min: self.min_rounds, max: self.max_rounds }
        } else {
            RoundCount::Fixed(self.rounds)
        };
        MatchConfig {
            rounds,
            noise: self.noise,
            shock_frequency: self.shock_frequency,
            shock_duration: self.shock_duration,
            payoff: self.payoff_matrix,
            dynamic_payoffs: self.dynamic_payoffs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = TournamentConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.payoff_matrix, PayoffMatrix { cc: 3, cd: 0, dc: 5, dd: 1 });
        assert!(!config.network.enabled);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = TournamentConfig::from_json(
            r#"{
                "strategies": ["AlwaysCooperate", "AlwaysDefect"],
                "rounds": 10,
                "noise": 0.0,
                "payoff_matrix": {"CC": 3, "CD": 0, "DC": 5, "DD": 1},
                "network": {"enabled": true, "type": "scale_free"},
                "rl_params": {"exploration_rate": 0.05},
                "local_llm": {"endpoint": "http://gpu-box:8000"}
            }"#,
        )
        .unwrap();
        assert_eq!(config.rounds, 10);
        assert_eq!(config.shock_duration, 20);
        assert_eq!(config.network.kind, "scale_free");
        assert_eq!(config.rl_params.learning_rate, 0.1);
        assert_eq!(config.rl_params.exploration_rate, 0.05);
        assert_eq!(config.meta_agent.switch_frequency, 50);
        assert_eq!(config.local_llm.endpoint, "http://gpu-box:8000");
        assert_eq!(config.local_llm.model, "SeaLLMs/SeaLLMs-v3-1.5B-Chat");
        assert_eq!(config.remote_llm.model, "gpt-4o");
    }

    #[test]
    fn test_rejects_bad_probabilities() {
        let config = TournamentConfig { noise: 1.5, ..Default::default() };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Probability { field: "noise", value }) if value == 1.5
        ));

        let mut config = TournamentConfig::default();
        config.network.connectivity = -0.1;
        assert!(matches!(config.validate(), Err(ConfigError::Probability { .. })));
    }

    #[test]
    fn test_rejects_bad_rounds() {
        let config = TournamentConfig { rounds: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroRounds)));

        let config = TournamentConfig {
            rounds_random: true,
            min_rounds: 30,
            max_rounds: 10,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::RoundRange { min: 30, max: 10 })));
    }

    #[test]
    fn test_rejects_empty_roster_and_zero_switch() {
        let config = TournamentConfig { strategies: vec![], ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::NoStrategies)));

        let mut config = TournamentConfig::default();
        config.meta_agent.switch_frequency = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroSwitchFrequency)));
    }

    #[test]
    fn test_malformed_json_keeps_source() {
        use std::error::Error;

        let err = TournamentConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        let source = err.source().expect("parse error should carry its cause");
        assert!(source.downcast_ref::<serde_json::Error>().is_some());
        assert_eq!(err.to_string(), "invalid configuration JSON");
    }

    #[test]
    fn test_match_config_round_modes() {
        let fixed = TournamentConfig { rounds: 12, ..Default::default() }.match_config();
        assert_eq!(fixed.rounds, RoundCount::Fixed(12));

        let random = TournamentConfig { rounds_random: true, ..Default::default() }.match_config();
        assert_eq!(random.rounds, RoundCount::Random { min: 150, max: 250 });
        assert_eq!(random.shock_duration, 20);
    }
}
