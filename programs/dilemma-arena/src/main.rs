mod cli;
mod human;
mod llm;
mod logging;
mod report;

use anyhow::{Context, Result};
use clap::Parser;
use cli::CliArgs;
use dilemma_core::{describe_name, StrategyFactory, Tournament, KNOWN_NAMES};
use human::ConsoleBackend;
use llm::{LocalBackend, RemoteBackend};
use std::sync::Arc;

fn main() -> Result<()> {
    let args = CliArgs::parse();

    if args.list_strategies {
        for name in KNOWN_NAMES {
            println!("{:<20} {}", name, describe_name(name).unwrap_or_default());
        }
        return Ok(());
    }

    let config = cli::load_config(&args)?;
    logging::init(&config.logging, args.verbose)?;

    log::info!("dilemma-arena v{}", env!("CARGO_PKG_VERSION"));
    log::info!(
        "Seed: {}, noise: {}, strategies: {}",
        config.seed,
        config.noise,
        config.strategies.join(", ")
    );

    let mut factory = StrategyFactory::new();
    factory.register_backend("HumanStrategy", Arc::new(ConsoleBackend));

    // LLM transports are only opened when the roster asks for them
    let wants = |name: &str| config.strategies.iter().any(|s| s == name);
    if wants("RemoteLLMAgent") {
        let backend = RemoteBackend::from_env(&config.remote_llm)
            .context("RemoteLLMAgent is unavailable")?;
        log::info!("RemoteLLMAgent using {:?}", backend);
        factory.register_backend("RemoteLLMAgent", Arc::new(backend));
    }
    if wants("LocalLLMAgent") {
        let backend = LocalBackend::connect(&config.local_llm).with_context(|| {
            format!("Cannot reach local LLM server at {}", config.local_llm.endpoint)
        })?;
        factory.register_backend("LocalLLMAgent", Arc::new(backend));
    }

    // console prompts from several threads would interleave
    let has_human = wants("HumanStrategy");
    let mut tournament = Tournament::new(config, &factory).context("Failed to set up tournament")?;

    if args.parallel && has_human {
        log::warn!("HumanStrategy needs the console; running sequentially");
    }
    if args.parallel && !has_human {
        tournament.run_parallel()
    } else {
        tournament.run()
    }
    .context("Tournament aborted")?;

    report::save_results(&args.output, tournament.results())?;

    println!("Leaderboard:");
    println!("{}", report::format_leaderboard(&tournament.leaderboard()));
    match report::mean_cooperation(tournament.cooperation_history()) {
        Some(rate) => println!("Mean cooperation rate: {:.3}", rate),
        None => println!("Mean cooperation rate: n/a (no matches played)"),
    }

    Ok(())
}
