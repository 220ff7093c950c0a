use anyhow::{Context, Result};
use clap::Parser;
use dilemma_core::TournamentConfig;
use std::fs;
use std::path::PathBuf;

/// Noisy Iterated Prisoner's Dilemma tournaments
#[derive(Parser, Debug)]
#[command(name = "dilemma-arena", version, about)]
pub struct CliArgs {
    /// Path to JSON config file (defaults apply when omitted)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Where to write per-match results
    #[arg(short, long, default_value = "tournament_results.csv")]
    pub output: PathBuf,

    /// Run matches on all cores
    #[arg(long)]
    pub parallel: bool,

    /// Per-round output on the terminal
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the available strategy names and exit
    #[arg(long)]
    pub list_strategies: bool,

    // --- Overrides ---
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long)]
    pub rounds: Option<u32>,

    #[arg(long)]
    pub noise: Option<f64>,
}

/// Load the config file (if any), then apply command-line overrides
pub fn load_config(args: &CliArgs) -> Result<TournamentConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            TournamentConfig::from_json(&text)
                .with_context(|| format!("Invalid config file: {}", path.display()))?
        }
        None => TournamentConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(rounds) = args.rounds {
        config.rounds = rounds;
        config.rounds_random = false;
    }
    if let Some(noise) = args.noise {
        config.noise = noise;
    }

    config.validate().context("Invalid configuration after overrides")?;
    Ok(config)
}
