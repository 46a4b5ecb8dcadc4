//! HEXCONQUEST Core - Faction conquest simulation engine
//!
//! This crate provides the core game logic for HEXCONQUEST:
//! - Grid geometry (offset-column hex map)
//! - Factions, unit classes and combat modifiers
//! - Board with position and faction indexes
//! - Dice-based combat resolution
//! - Greedy per-unit turn policy
//! - Match controller: rounds, control point scoring, win conditions

pub mod grid;
pub mod units;
pub mod board;
pub mod combat;
pub mod turn;
pub mod game;
pub mod config;

// Re-exports for convenient access
pub use grid::{Position, MAP_SIZE};
pub use units::{Faction, FactionTraits, Unit, UnitClass, UnitId};
pub use board::Board;
pub use combat::{CombatOutcome, CombatResult, CombatRolls};
pub use turn::{play_turn, TurnReport, UnitAction};
pub use game::{
    Match, MatchOutcome, MatchPhase, MatchSnapshot, RoundSummary, StepReport, Victory, WinReason,
};
pub use config::{ConfigError, FactionSetup, MatchConfig, MAX_ROUNDS, VICTORY_POINTS};
