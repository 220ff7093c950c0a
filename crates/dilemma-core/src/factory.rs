//! Strategy names → players
//!
//! Rule-based and learning strategies are built from configuration alone.
//! External-model strategies need a [`DecisionBackend`] registered under their
//! name first.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::TournamentConfig;
use crate::error::ArenaError;
use crate::external::{DecisionBackend, ExternalAgent};
use crate::learning::QLearner;
use crate::meta::MetaStrategy;
use crate::player::{Player, PlayerStrategy};
use crate::strategy::{describe_strategy, Strategy, StrategyBase, StrategyParams};

/// Names backed by an external decision model
pub const EXTERNAL_NAMES: [&str; 3] = ["HumanStrategy", "RemoteLLMAgent", "LocalLLMAgent"];

/// Every name the factory understands
pub const KNOWN_NAMES: [&str; 16] = [
    "AlwaysCooperate",
    "AlwaysDefect",
    "RandomStrategy",
    "TitForTat",
    "TitForTatExtended",
    "SuspiciousTitForTat",
    "Grudger",
    "Joss",
    "TitForTwoTats",
    "Pavlov",
    "Gradual",
    "QLearningAgent",
    "MetaAgent",
    "HumanStrategy",
    "RemoteLLMAgent",
    "LocalLLMAgent",
];

/// Rule for a strategy name, or `None` if the name is not a rule
fn rule_for(name: &str, params: StrategyParams) -> Option<Strategy> {
    let strict = StrategyParams { forgiveness: 0, ..params };
    let strategy = match name {
        "AlwaysCooperate" => Strategy::with_params(StrategyBase::AlwaysCooperate, params),
        "AlwaysDefect" => Strategy::with_params(StrategyBase::AlwaysDefect, params),
        "RandomStrategy" => Strategy::with_params(StrategyBase::Random, params),
        "TitForTat" => Strategy::with_params(StrategyBase::TitForTat, strict),
        "TitForTatExtended" => Strategy::with_params(StrategyBase::TitForTat, params),
        "SuspiciousTitForTat" => Strategy::with_params(StrategyBase::SuspiciousTitForTat, strict),
        "Grudger" => Strategy::with_params(StrategyBase::GrimTrigger, params),
        "Joss" => Strategy::with_params(StrategyBase::Joss, params),
        "TitForTwoTats" => Strategy::with_params(StrategyBase::TitForTwoTats, params),
        "Pavlov" => Strategy::with_params(StrategyBase::Pavlov, params),
        "Gradual" => Strategy::with_params(StrategyBase::Gradual, params),
        _ => return None,
    };
    Some(strategy)
}

/// One-line description of a strategy name, for listings
pub fn describe_name(name: &str) -> Option<String> {
    if let Some(rule) = rule_for(name, StrategyParams::default()) {
        return Some(describe_strategy(&rule));
    }
    let desc = match name {
        "QLearningAgent" => "Learns move values from rewards (tabular Q-learning).",
        "MetaAgent" => "Rotates between rule-based strategies at a fixed interval.",
        "HumanStrategy" => "Moves typed by a person at the console.",
        "RemoteLLMAgent" => "Moves chosen by a hosted language model.",
        "LocalLLMAgent" => "Moves chosen by a locally served language model.",
        _ => return None,
    };
    Some(desc.to_string())
}

#[derive(Debug, Default)]
pub struct StrategyFactory {
    backends: HashMap<String, Arc<dyn DecisionBackend>>,
}

impl StrategyFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route decisions of the named external strategy to `backend`
    pub fn register_backend(&mut self, name: impl Into<String>, backend: Arc<dyn DecisionBackend>) {
        self.backends.insert(name.into(), backend);
    }

    pub fn has_backend(&self, name: &str) -> bool {
        self.backends.contains_key(name)
    }

    /// Build a fresh player for `name`.
    ///
    /// Unknown names yield `Ok(None)`; an external name without a registered
    /// backend is an error.
    pub fn build(&self, name: &str, config: &TournamentConfig) -> Result<Option<Player>, ArenaError> {
        if let Some(rule) = rule_for(name, config.rule_params) {
            return Ok(Some(Player::builtin(name, rule)));
        }

        let strategy = match name {
            "QLearningAgent" => PlayerStrategy::Learning(QLearner::new(config.rl_params)),
            "MetaAgent" => PlayerStrategy::Meta(self.build_meta(config)),
            external if EXTERNAL_NAMES.contains(&external) => {
                let backend = self
                    .backends
                    .get(external)
                    .ok_or_else(|| ArenaError::MissingBackend(external.to_string()))?;
                PlayerStrategy::External(ExternalAgent::new(backend.clone(), config.external_agent))
            }
            _ => return Ok(None),
        };
        Ok(Some(Player::new(name, strategy)))
    }

    /// Meta delegates are limited to rule-based strategies
    fn build_meta(&self, config: &TournamentConfig) -> MetaStrategy {
        let delegates = config
            .meta_agent
            .base_strategies
            .iter()
            .filter_map(|name| match rule_for(name, config.rule_params) {
                Some(rule) => Some(Player::builtin(name.as_str(), rule)),
                None => {
                    log::warn!("Meta-agent ignores non-rule strategy {:?}", name);
                    None
                }
            })
            .collect();
        MetaStrategy::new(delegates, config.meta_agent.switch_frequency)
    }
}
