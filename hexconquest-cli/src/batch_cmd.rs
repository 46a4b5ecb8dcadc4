//! Batch command - many seeded matches, aggregated statistics
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_batch(), report_results()
//! - Level 3: play_single_match(), compute_batch_statistics()
//! - Level 4: formatting utilities

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use rayon::prelude::*;
use serde::Serialize;

use hexconquest_core::{Faction, Match, MatchConfig, WinReason};

use crate::config_cmd::load_config;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct BatchArgs {
    /// Match configuration JSON file (reference setup if omitted)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Number of matches to simulate
    #[arg(long, default_value = "100")]
    pub games: usize,

    /// Override the configured round limit
    #[arg(long)]
    pub max_rounds: Option<u32>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Result of a single match
#[derive(Clone, Debug, Serialize)]
struct GameRecord {
    seed: u64,
    winner: Option<Faction>,
    reason: Option<WinReason>,
    rounds: u32,
}

/// Wins for one faction
#[derive(Clone, Debug, Serialize, PartialEq)]
struct FactionTally {
    faction: Faction,
    by_points: usize,
    by_elimination: usize,
}

impl FactionTally {
    fn total(&self) -> usize {
        self.by_points + self.by_elimination
    }
}

/// Aggregated batch results
#[derive(Clone, Debug, Serialize)]
struct BatchResults {
    games: Vec<GameRecord>,
    tallies: Vec<FactionTally>,
    wipeouts: usize,
    draws: usize,
    avg_rounds: f32,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run batch command
///
/// 1. Load configuration
/// 2. Play every match in parallel
/// 3. Report aggregate results
pub fn run(args: BatchArgs, seed: Option<u64>) -> Result<()> {
    let config = load_config(args.config.as_deref(), args.max_rounds)?;
    let base_seed = seed.unwrap_or(42);

    tracing::info!(
        "Starting batch: {} games, max {} rounds, base seed {}",
        args.games,
        config.max_rounds,
        base_seed
    );

    let results = play_batch(&config, args.games, base_seed)?;
    report_results(&results, args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Play all matches; match `i` uses seed `base_seed + i`
fn play_batch(config: &MatchConfig, games: usize, base_seed: u64) -> Result<BatchResults> {
    let records = (0..games)
        .into_par_iter()
        .map(|i| play_single_match(config, base_seed.wrapping_add(i as u64)))
        .collect::<Result<Vec<_>>>()?;

    let factions: Vec<Faction> = config.factions.iter().map(|s| s.faction).collect();
    Ok(compute_batch_statistics(records, &factions))
}

fn report_results(results: &BatchResults, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(results)?);
    } else {
        print_text_results(results);
    }
    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn play_single_match(config: &MatchConfig, seed: u64) -> Result<GameRecord> {
    let outcome = Match::with_seed(config.clone(), seed)?.run();
    Ok(GameRecord {
        seed,
        winner: outcome.winner,
        reason: outcome.reason,
        rounds: outcome.final_round,
    })
}

fn compute_batch_statistics(mut games: Vec<GameRecord>, factions: &[Faction]) -> BatchResults {
    games.sort_by_key(|g| g.seed);

    let tallies = factions
        .iter()
        .map(|&faction| {
            let won = |reason: WinReason| {
                games
                    .iter()
                    .filter(|g| g.winner == Some(faction) && g.reason == Some(reason))
                    .count()
            };
            FactionTally {
                faction,
                by_points: won(WinReason::Points),
                by_elimination: won(WinReason::Elimination),
            }
        })
        .collect();

    let wipeouts = games
        .iter()
        .filter(|g| g.winner.is_none() && g.reason.is_some())
        .count();
    let draws = games.iter().filter(|g| g.reason.is_none()).count();

    let total_rounds: u32 = games.iter().map(|g| g.rounds).sum();
    let avg_rounds = if games.is_empty() {
        0.0
    } else {
        total_rounds as f32 / games.len() as f32
    };

    BatchResults {
        games,
        tallies,
        wipeouts,
        draws,
        avg_rounds,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn percent(count: usize, total: usize) -> f32 {
    if total > 0 {
        count as f32 / total as f32 * 100.0
    } else {
        0.0
    }
}

fn print_text_results(results: &BatchResults) {
    let total = results.games.len();

    println!("\n=== Batch Results ===");
    println!("Total games: {}", total);
    for tally in &results.tallies {
        println!(
            "{:<8} {:>4} wins ({:.1}%)  points: {}  elimination: {}",
            tally.faction.name(),
            tally.total(),
            percent(tally.total(), total),
            tally.by_points,
            tally.by_elimination
        );
    }
    println!("Wipeouts:  {} ({:.1}%)", results.wipeouts, percent(results.wipeouts, total));
    println!("Draws:     {} ({:.1}%)", results.draws, percent(results.draws, total));
    println!("Avg rounds: {:.1}", results.avg_rounds);
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn record(seed: u64, winner: Option<Faction>, reason: Option<WinReason>, rounds: u32) -> GameRecord {
        GameRecord {
            seed,
            winner,
            reason,
            rounds,
        }
    }

    #[test]
    fn test_compute_batch_statistics_empty() {
        let results = compute_batch_statistics(vec![], &[Faction::Red]);
        assert_eq!(results.draws, 0);
        assert_eq!(results.wipeouts, 0);
        assert_eq!(results.avg_rounds, 0.0);
        assert_eq!(results.tallies[0].total(), 0);
    }

    #[test]
    fn test_compute_batch_statistics() {
        let games = vec![
            record(3, Some(Faction::Red), Some(WinReason::Points), 10),
            record(1, Some(Faction::Red), Some(WinReason::Elimination), 20),
            record(2, None, Some(WinReason::Elimination), 15),
            record(4, None, None, 25),
        ];

        let results = compute_batch_statistics(games, &[Faction::Red, Faction::Blue]);
        assert_eq!(
            results.tallies[0],
            FactionTally {
                faction: Faction::Red,
                by_points: 1,
                by_elimination: 1,
            }
        );
        assert_eq!(results.tallies[1].total(), 0);
        assert_eq!(results.wipeouts, 1);
        assert_eq!(results.draws, 1);
        assert_eq!(results.avg_rounds, 17.5);
        assert_eq!(results.games[0].seed, 1);
    }

    #[test]
    fn test_play_batch_is_deterministic() {
        let config = MatchConfig::default().with_max_rounds(5);
        let a = play_batch(&config, 6, 100).unwrap();
        let b = play_batch(&config, 6, 100).unwrap();

        assert_eq!(a.games.len(), 6);
        let rounds = |r: &BatchResults| r.games.iter().map(|g| (g.seed, g.rounds, g.winner)).collect::<Vec<_>>();
        assert_eq!(rounds(&a), rounds(&b));
        assert!(a.games.iter().all(|g| g.rounds <= 5));
    }
}
