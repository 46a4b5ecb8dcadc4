//! Match controller - round/turn loop, scoring and win conditions
//!
//! Phases:
//! - Setup: `Match::new` places every faction's units and zeroes scores
//! - InRound: `step` plays one faction turn and advances the turn pointer
//! - RoundEnd: when the pointer wraps, control points score and wins are checked
//! - Finished: terminal, `outcome` is set

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::config::{ConfigError, MatchConfig};
use crate::grid::Position;
use crate::turn::{play_turn, TurnReport};
use crate::units::{Faction, Unit, UnitClass, UnitId};

// ============================================================================
// CORE TYPES
// ============================================================================

/// How a match was won
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WinReason {
    Points,
    Elimination,
}

/// Controller phase as seen between steps
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPhase {
    InRound,
    Finished,
}

/// A decided win condition. `winner` is None when elimination left no one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Victory {
    pub winner: Option<Faction>,
    pub reason: WinReason,
}

/// Final result of a match. Both fields None means the round limit was hit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub winner: Option<Faction>,
    pub reason: Option<WinReason>,
    pub final_round: u32,
    /// Scores in turn order
    pub scores: Vec<(Faction, u32)>,
}

impl MatchOutcome {
    pub fn is_draw(&self) -> bool {
        self.reason.is_none()
    }
}

/// Points handed out at one round end
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub round: u32,
    /// Control points held per faction this round (factions holding none omitted)
    pub awards: Vec<(Faction, u32)>,
    pub scores: Vec<(Faction, u32)>,
}

/// Everything that happened in one `step`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StepReport {
    pub turn: TurnReport,
    pub round_end: Option<RoundSummary>,
}

// ============================================================================
// SNAPSHOT (renderer contract)
// ============================================================================

/// One unit as shown to a renderer
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UnitView {
    pub id: UnitId,
    pub label: String,
    pub faction: Faction,
    pub class: UnitClass,
    pub position: Position,
    pub color: String,
}

/// Per-faction scoreboard line
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FactionStanding {
    pub faction: Faction,
    pub color: String,
    pub score: u32,
    pub units: usize,
}

/// Read-only view of the whole match at one instant
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub map_size: i8,
    pub round: u32,
    pub active_faction: Faction,
    pub phase: MatchPhase,
    pub control_points: Vec<Position>,
    pub units: Vec<UnitView>,
    pub standings: Vec<FactionStanding>,
    pub outcome: Option<MatchOutcome>,
}

// ============================================================================
// MATCH
// ============================================================================

/// A running match (owns its board and its random source)
#[derive(Clone, Debug)]
pub struct Match<R: Rng = ChaCha8Rng> {
    config: MatchConfig,
    board: Board,

    /// Turn order
    factions: Vec<Faction>,
    scores: FxHashMap<Faction, u32>,

    /// Round number, starts at 1 and never exceeds `max_rounds`
    round: u32,

    /// Index into `factions` of the next faction to act
    active: usize,

    outcome: Option<MatchOutcome>,
    rng: R,
}

impl Match<ChaCha8Rng> {
    /// Create a match with a seeded ChaCha RNG
    pub fn with_seed(config: MatchConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::new(config, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> Match<R> {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Validate the configuration and set up the opening position
    pub fn new(config: MatchConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut board = Board::with_control_points(config.map_size, config.control_points.clone());
        let mut next_id = 1;
        for setup in &config.factions {
            for (&class, &pos) in config.unit_roster.iter().zip(&setup.starting_positions) {
                board.place(Unit::new(UnitId(next_id), setup.faction, class, pos, setup.traits));
                next_id += 1;
            }
        }

        let factions: Vec<Faction> = config.factions.iter().map(|s| s.faction).collect();
        let scores = factions.iter().map(|&f| (f, 0)).collect();

        tracing::debug!(
            "Match setup: {} factions, {} units, {} control points",
            factions.len(),
            board.unit_count(),
            board.control_points().len()
        );

        Ok(Self {
            config,
            board,
            factions,
            scores,
            round: 1,
            active: 0,
            outcome: None,
            rng,
        })
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    /// Faction whose turn is next
    pub fn active_faction(&self) -> Faction {
        self.factions[self.active]
    }

    pub fn factions(&self) -> &[Faction] {
        &self.factions
    }

    pub fn score(&self, faction: Faction) -> u32 {
        self.scores.get(&faction).copied().unwrap_or(0)
    }

    /// Scores in turn order
    pub fn scores(&self) -> Vec<(Faction, u32)> {
        self.factions.iter().map(|&f| (f, self.score(f))).collect()
    }

    pub fn phase(&self) -> MatchPhase {
        if self.outcome.is_some() {
            MatchPhase::Finished
        } else {
            MatchPhase::InRound
        }
    }

    pub fn outcome(&self) -> Option<&MatchOutcome> {
        self.outcome.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    // ========================================================================
    // ROUND LOOP
    // ========================================================================

    /// Play the active faction's turn. Returns None once the match is finished.
    pub fn step(&mut self) -> Option<StepReport> {
        if self.is_finished() {
            return None;
        }

        let faction = self.active_faction();
        let turn = play_turn(&mut self.board, faction, &mut self.rng);
        tracing::debug!(
            "Round {} turn {}: {} attacks, {} advances",
            self.round,
            faction,
            turn.attacks(),
            turn.advances()
        );

        self.active = (self.active + 1) % self.factions.len();
        let round_end = if self.active == 0 {
            Some(self.end_round())
        } else {
            None
        };

        Some(StepReport { turn, round_end })
    }

    /// Run to completion
    pub fn run(&mut self) -> MatchOutcome {
        self.run_with(|_, _| {})
    }

    /// Run to completion, calling `observe` after every step
    pub fn run_with<F>(&mut self, mut observe: F) -> MatchOutcome
    where
        F: FnMut(&Self, &StepReport),
    {
        loop {
            if let Some(outcome) = &self.outcome {
                return outcome.clone();
            }
            if let Some(report) = self.step() {
                observe(self, &report);
            }
        }
    }

    /// Score control points, then either finish or open the next round
    fn end_round(&mut self) -> RoundSummary {
        let awards = self.score_control_points();
        let summary = RoundSummary {
            round: self.round,
            awards,
            scores: self.scores(),
        };
        tracing::debug!("Round {} ended, scores: {:?}", self.round, summary.scores);

        if let Some(victory) = self.verify_win() {
            self.finish(victory.winner, Some(victory.reason));
        } else if self.round >= self.config.max_rounds {
            self.finish(None, None);
        } else {
            self.round += 1;
        }

        summary
    }

    /// +1 to the occupant's faction for every occupied control point
    fn score_control_points(&mut self) -> Vec<(Faction, u32)> {
        let mut held: FxHashMap<Faction, u32> = FxHashMap::default();
        for &cp in self.board.control_points() {
            if let Some(unit) = self.board.occupant_at(cp) {
                tracing::debug!("Control point {} held by {}", cp, unit.faction);
                *held.entry(unit.faction).or_insert(0) += 1;
            }
        }

        for (&faction, &points) in &held {
            *self.scores.entry(faction).or_insert(0) += points;
        }

        self.factions
            .iter()
            .filter_map(|f| held.get(f).map(|&p| (*f, p)))
            .collect()
    }

    /// Check win conditions: points first (turn order), then elimination
    pub fn verify_win(&self) -> Option<Victory> {
        if let Some(&winner) = self
            .factions
            .iter()
            .find(|&&f| self.score(f) >= self.config.victory_points)
        {
            return Some(Victory {
                winner: Some(winner),
                reason: WinReason::Points,
            });
        }

        let survivors = self.board.live_factions();
        if survivors.len() <= 1 {
            return Some(Victory {
                winner: survivors.into_iter().next(),
                reason: WinReason::Elimination,
            });
        }

        None
    }

    fn finish(&mut self, winner: Option<Faction>, reason: Option<WinReason>) {
        match (winner, reason) {
            (Some(w), Some(r)) => tracing::info!("{} wins by {:?} in round {}", w, r, self.round),
            (None, Some(_)) => tracing::info!("All factions eliminated in round {}", self.round),
            _ => tracing::info!("Round limit {} reached without a winner", self.round),
        }
        self.outcome = Some(MatchOutcome {
            winner,
            reason,
            final_round: self.round,
            scores: self.scores(),
        });
    }

    // ========================================================================
    // SNAPSHOT
    // ========================================================================

    /// Renderer-facing view of the current state
    pub fn snapshot(&self) -> MatchSnapshot {
        let mut units: Vec<UnitView> = self
            .board
            .units()
            .map(|u| UnitView {
                id: u.id,
                label: u.label(),
                faction: u.faction,
                class: u.class,
                position: u.position,
                color: self.config.color_of(u.faction).to_string(),
            })
            .collect();
        units.sort_by_key(|u| u.position);

        let standings = self
            .factions
            .iter()
            .map(|&f| FactionStanding {
                faction: f,
                color: self.config.color_of(f).to_string(),
                score: self.score(f),
                units: self.board.count_of(f),
            })
            .collect();

        MatchSnapshot {
            map_size: self.board.size(),
            round: self.round,
            active_faction: self.active_faction(),
            phase: self.phase(),
            control_points: self.board.control_points().to_vec(),
            units,
            standings,
            outcome: self.outcome.clone(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_ROUNDS;

    fn two_faction_config() -> MatchConfig {
        MatchConfig::default().with_factions(&[Faction::Red, Faction::Blue])
    }

    #[test]
    fn test_setup() {
        let game = Match::with_seed(MatchConfig::default(), 1).unwrap();
        assert_eq!(game.board().unit_count(), 24);
        assert_eq!(game.round(), 1);
        assert_eq!(game.active_faction(), Faction::Red);
        assert_eq!(game.phase(), MatchPhase::InRound);
        assert!(game.scores().iter().all(|&(_, s)| s == 0));

        // Roster order maps onto starting positions
        let first = game.board().occupant_at(Position::new(1, 1)).unwrap();
        assert_eq!(first.class, UnitClass::Infantry);
        assert_eq!(first.faction, Faction::Red);
        let special = game.board().occupant_at(Position::new(10, 9)).unwrap();
        assert_eq!(special.class, UnitClass::Special);
        assert_eq!(special.traits.mutual_support_bonus, 1);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = MatchConfig::default().with_max_rounds(0);
        assert_eq!(Match::with_seed(config, 1).err(), Some(ConfigError::ZeroMaxRounds));
    }

    #[test]
    fn test_round_advances_only_on_wrap() {
        let mut game = Match::with_seed(MatchConfig::default(), 5).unwrap();
        for expected in [Faction::Blue, Faction::Green, Faction::Yellow] {
            let report = game.step().unwrap();
            assert!(report.round_end.is_none());
            assert_eq!(game.round(), 1);
            assert_eq!(game.active_faction(), expected);
        }
        let report = game.step().unwrap();
        assert_eq!(report.round_end.map(|s| s.round), Some(1));
        assert_eq!(game.round(), 2);
        assert_eq!(game.active_faction(), Faction::Red);
    }

    #[test]
    fn test_sole_survivor_wins_by_elimination() {
        let mut game = Match::with_seed(MatchConfig::default().with_factions(&[Faction::Green]), 1).unwrap();
        let positions: Vec<_> = game.board.units().map(|u| u.position).collect();
        for pos in positions.into_iter().skip(1) {
            game.board.remove(pos);
        }
        assert_eq!(game.board.unit_count(), 1);
        assert_eq!(
            game.verify_win(),
            Some(Victory {
                winner: Some(Faction::Green),
                reason: WinReason::Elimination,
            })
        );
    }

    #[test]
    fn test_no_survivors_is_elimination_without_winner() {
        let mut game = Match::with_seed(two_faction_config(), 1).unwrap();
        let positions: Vec<_> = game.board.units().map(|u| u.position).collect();
        for pos in positions {
            game.board.remove(pos);
        }
        assert_eq!(
            game.verify_win(),
            Some(Victory {
                winner: None,
                reason: WinReason::Elimination,
            })
        );
    }

    #[test]
    fn test_two_factions_alive_no_win() {
        let game = Match::with_seed(two_faction_config(), 1).unwrap();
        assert_eq!(game.verify_win(), None);
    }

    #[test]
    fn test_holding_one_point_wins_on_round_ten() {
        let mut config = two_faction_config();
        config.control_points = vec![Position::new(1, 1)]; // Red starts on it
        let mut game = Match::with_seed(config, 1).unwrap();

        for round in 1..=9 {
            let summary = game.end_round();
            assert_eq!(summary.round, round);
            assert_eq!(summary.awards, vec![(Faction::Red, 1)]);
            assert!(!game.is_finished());
        }
        game.end_round();

        let outcome = game.outcome().unwrap();
        assert_eq!(outcome.winner, Some(Faction::Red));
        assert_eq!(outcome.reason, Some(WinReason::Points));
        assert_eq!(outcome.final_round, 10);
        assert_eq!(game.score(Faction::Red), 10);
        assert_eq!(game.score(Faction::Blue), 0);
    }

    #[test]
    fn test_holding_five_points_wins_on_round_two() {
        let mut config = two_faction_config();
        config.control_points = config.factions[0].starting_positions[..5].to_vec();
        let mut game = Match::with_seed(config, 1).unwrap();

        assert_eq!(game.end_round().awards, vec![(Faction::Red, 5)]);
        assert!(!game.is_finished());
        game.end_round();

        let outcome = game.outcome().unwrap();
        assert_eq!(outcome.reason, Some(WinReason::Points));
        assert_eq!(outcome.final_round, 2);
        assert_eq!(game.score(Faction::Red), 10);
    }

    #[test]
    fn test_points_take_priority_over_elimination() {
        let mut game = Match::with_seed(two_faction_config(), 1).unwrap();
        let blue: Vec<_> = game.board.units_of(Faction::Blue).iter().map(|u| u.position).collect();
        for pos in blue {
            game.board.remove(pos);
        }
        game.scores.insert(Faction::Blue, 10);
        assert_eq!(
            game.verify_win(),
            Some(Victory {
                winner: Some(Faction::Blue),
                reason: WinReason::Points,
            })
        );
    }

    #[test]
    fn test_round_limit_ends_in_draw() {
        let config = two_faction_config().with_max_rounds(1);
        let mut game = Match::with_seed(config, 9).unwrap();
        let outcome = game.run();

        assert!(outcome.is_draw());
        assert_eq!(outcome.winner, None);
        assert_eq!(outcome.final_round, 1);
        assert_eq!(game.round(), 1);
        assert!(game.step().is_none());
    }

    #[test]
    fn test_full_runs_terminate_and_keep_invariants() {
        for seed in 0..30 {
            let mut game = Match::with_seed(MatchConfig::default(), seed).unwrap();
            let mut last_round = game.round();
            let outcome = game.run_with(|g, report| {
                assert!(g.round() >= last_round);
                last_round = g.round();

                for unit in g.board().units() {
                    assert_eq!(g.board().occupant_at(unit.position).map(|u| u.id), Some(unit.id));
                }

                if let Some(summary) = &report.round_end {
                    // Awards equal control points held right now
                    for &(faction, points) in &summary.awards {
                        let held = g
                            .board()
                            .control_points()
                            .iter()
                            .filter(|&&cp| g.board().occupant_at(cp).map(|u| u.faction) == Some(faction))
                            .count() as u32;
                        assert_eq!(points, held);
                    }
                }
            });

            assert!(outcome.final_round <= MAX_ROUNDS);
            assert!(game.is_finished());
            if outcome.reason == Some(WinReason::Points) {
                let winner = outcome.winner.unwrap();
                assert!(game.score(winner) >= 10);
            }
        }
    }

    #[test]
    fn test_same_seed_same_match() {
        let a = Match::with_seed(MatchConfig::default(), 77).unwrap().run();
        let b = Match::with_seed(MatchConfig::default(), 77).unwrap().run();
        assert_eq!(a, b);
    }

    #[test]
    fn test_snapshot() {
        let game = Match::with_seed(MatchConfig::default(), 3).unwrap();
        let snap = game.snapshot();
        assert_eq!(snap.map_size, 11);
        assert_eq!(snap.units.len(), 24);
        assert_eq!(snap.control_points.len(), 5);
        assert_eq!(snap.active_faction, Faction::Red);
        assert_eq!(snap.standings.len(), 4);
        assert_eq!(snap.standings[0].color, "firebrick");
        assert!(snap.outcome.is_none());
        assert!(snap.units.windows(2).all(|w| w[0].position < w[1].position));

        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["round"], 1);
    }
}
