//! Result persistence and the end-of-run summary

use anyhow::{Context, Result};
use dilemma_core::MatchResult;
use std::io::Write;
use std::path::Path;

pub const CSV_HEADER: [&str; 4] = ["player1", "player2", "score1", "score2"];

fn builder() -> csv::WriterBuilder {
    let mut builder = csv::WriterBuilder::new();
    // header written by hand so an empty run still gets one
    builder.has_headers(false);
    builder
}

fn write_rows<W: Write>(wtr: &mut csv::Writer<W>, results: &[MatchResult]) -> csv::Result<()> {
    wtr.write_record(CSV_HEADER)?;
    for result in results {
        wtr.serialize(result)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_csv<W: Write>(out: W, results: &[MatchResult]) -> csv::Result<()> {
    write_rows(&mut builder().from_writer(out), results)
}

pub fn save_results(path: &Path, results: &[MatchResult]) -> Result<()> {
    let mut wtr = builder()
        .from_path(path)
        .with_context(|| format!("Failed to create results file: {}", path.display()))?;
    write_rows(&mut wtr, results)
        .with_context(|| format!("Failed to write results to {}", path.display()))?;
    log::info!("Results saved to {}", path.display());
    Ok(())
}

/// Ranked leaderboard, one line per player
pub fn format_leaderboard(board: &[(String, i64)]) -> String {
    let width = board.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    board
        .iter()
        .enumerate()
        .map(|(rank, (name, score))| format!("{:>3}. {:<width$}  {}", rank + 1, name, score, width = width))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Mean of the per-match cooperation rates, `None` when nothing was played
pub fn mean_cooperation(history: &[f64]) -> Option<f64> {
    if history.is_empty() {
        None
    } else {
        Some(history.iter().sum::<f64>() / history.len() as f64)
    }
}
