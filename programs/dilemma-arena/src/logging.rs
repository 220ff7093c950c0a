use anyhow::{Context, Result};
use dilemma_core::LoggingConfig;
use log::LevelFilter;
use simplelog::{ColorChoice, CombinedLogger, ConfigBuilder, TermLogger, TerminalMode, WriteLogger};
use std::fs::File;

/// Terminal threshold: `--verbose` shows per-round detail, the config's
/// `verbose` flag keeps match progress, otherwise only warnings.
pub fn terminal_level(config: &LoggingConfig, cli_verbose: bool) -> LevelFilter {
    if cli_verbose {
        LevelFilter::Debug
    } else if config.verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    }
}

/// Terminal + file logging. The file always receives debug output.
pub fn init(config: &LoggingConfig, cli_verbose: bool) -> Result<()> {
    let log_config = ConfigBuilder::new()
        .set_location_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .build();

    let file = File::create(&config.log_file)
        .with_context(|| format!("Failed to create log file: {}", config.log_file))?;

    let term = TermLogger::new(
        terminal_level(config, cli_verbose),
        log_config.clone(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    );
    let file = WriteLogger::new(LevelFilter::Debug, log_config, file);

    CombinedLogger::init(vec![term, file]).context("Failed to initialize logger")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_level() {
        let quiet = LoggingConfig { verbose: false, ..Default::default() };
        assert_eq!(terminal_level(&quiet, false), LevelFilter::Warn);
        assert_eq!(terminal_level(&LoggingConfig::default(), false), LevelFilter::Info);
        assert_eq!(terminal_level(&quiet, true), LevelFilter::Debug);
    }
}
