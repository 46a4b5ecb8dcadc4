//! Play command - simulate one match
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_match(), write_trace(), report_outcome()
//! - Level 3: build_summary()
//! - Level 4: RNG and formatting utilities

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use hexconquest_core::{Faction, Match, MatchOutcome, MatchSnapshot, WinReason};

use crate::config_cmd::load_config;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    /// Match configuration JSON file (reference setup if omitted)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override the configured round limit
    #[arg(long)]
    pub max_rounds: Option<u32>,

    /// Output the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Write one JSON snapshot per line (setup and every round end)
    #[arg(long, value_name = "FILE")]
    pub trace: Option<PathBuf>,
}

/// What gets printed at the end
#[derive(Clone, Debug, Serialize)]
struct MatchSummary {
    seed: u64,
    winner: Option<Faction>,
    reason: Option<WinReason>,
    final_round: u32,
    scores: Vec<(Faction, u32)>,
    survivors: Vec<(Faction, usize)>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// 1. Load configuration
/// 2. Play the match, collecting snapshots
/// 3. Write the trace and report the outcome
pub fn run(args: PlayArgs, seed: Option<u64>) -> Result<()> {
    let config = load_config(args.config.as_deref(), args.max_rounds)?;
    let seed = seed.unwrap_or_else(rand::random);

    tracing::info!(
        "Starting match: {} factions, max {} rounds, seed {}",
        config.factions.len(),
        config.max_rounds,
        seed
    );

    let mut game = Match::new(config, create_rng(seed))?;
    let (outcome, snapshots) = play_match(&mut game, args.trace.is_some());

    if let Some(path) = &args.trace {
        write_trace(path, &snapshots)?;
    }

    let summary = build_summary(&game, &outcome, seed);
    report_outcome(&summary, args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Play to completion; snapshots are taken at setup and after each round end
fn play_match(game: &mut Match, keep_snapshots: bool) -> (MatchOutcome, Vec<MatchSnapshot>) {
    let mut snapshots = Vec::new();
    if keep_snapshots {
        snapshots.push(game.snapshot());
    }

    let outcome = game.run_with(|g, report| {
        if keep_snapshots && report.round_end.is_some() {
            snapshots.push(g.snapshot());
        }
    });

    (outcome, snapshots)
}

/// Write snapshots as JSON lines
fn write_trace(path: &Path, snapshots: &[MatchSnapshot]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create trace file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    for snapshot in snapshots {
        serde_json::to_writer(&mut writer, snapshot)?;
        writeln!(writer)?;
    }
    writer.flush()?;

    tracing::info!("Wrote {} snapshots to {}", snapshots.len(), path.display());
    Ok(())
}

fn report_outcome(summary: &MatchSummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
    } else {
        print_text_summary(summary);
    }
    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn build_summary(game: &Match, outcome: &MatchOutcome, seed: u64) -> MatchSummary {
    MatchSummary {
        seed,
        winner: outcome.winner,
        reason: outcome.reason,
        final_round: outcome.final_round,
        scores: outcome.scores.clone(),
        survivors: game
            .factions()
            .iter()
            .map(|&f| (f, game.board().count_of(f)))
            .collect(),
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn create_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

fn describe_result(winner: Option<Faction>, reason: Option<WinReason>) -> String {
    match (winner, reason) {
        (Some(w), Some(WinReason::Points)) => format!("{} wins on points", w),
        (Some(w), Some(WinReason::Elimination)) => format!("{} wins by elimination", w),
        (None, Some(_)) => "No one survived".to_string(),
        _ => "No winner (round limit reached)".to_string(),
    }
}

fn print_text_summary(summary: &MatchSummary) {
    println!("\n=== Match Result (seed {}) ===", summary.seed);
    println!(
        "{} in round {}",
        describe_result(summary.winner, summary.reason),
        summary.final_round
    );

    println!("\n{:<8} {:>6} {:>6}", "Faction", "Score", "Units");
    for ((faction, score), (_, units)) in summary.scores.iter().zip(&summary.survivors) {
        println!("{:<8} {:>6} {:>6}", faction.name(), score, units);
    }
}
