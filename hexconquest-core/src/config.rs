//! MatchConfig - construction-time constants for a match

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::grid::{Position, MAP_SIZE};
use crate::units::{Faction, FactionTraits, UnitClass};

/// Score needed to win by points
pub const VICTORY_POINTS: u32 = 10;

/// Round limit before the match ends without a winner
pub const MAX_ROUNDS: u32 = 25;

/// Largest map extent that still fits `i8` neighbor arithmetic
pub const MAX_MAP_SIZE: i8 = 127;

/// Invalid configuration
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Map size must be between 1 and 127, got {0}")]
    MapSize(i8),

    #[error("At least one faction is required")]
    NoFactions,

    #[error("Faction {0} appears more than once")]
    DuplicateFaction(Faction),

    #[error("Faction {faction} has {got} starting positions, roster needs {expected}")]
    StartingPositions {
        faction: Faction,
        expected: usize,
        got: usize,
    },

    #[error("Position {0} is outside the map")]
    OffMap(Position),

    #[error("Two units start on {0}")]
    OverlappingStart(Position),

    #[error("Control point {0} is listed twice")]
    DuplicateControlPoint(Position),

    #[error("Victory points must be positive")]
    ZeroVictoryPoints,

    #[error("Max rounds must be positive")]
    ZeroMaxRounds,
}

/// One faction's seat at the table
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FactionSetup {
    pub faction: Faction,
    /// Display color, for renderers only
    pub color: String,
    pub starting_positions: Vec<Position>,
    #[serde(default)]
    pub traits: FactionTraits,
}

impl FactionSetup {
    pub fn new(faction: Faction, color: &str, starting_positions: Vec<Position>) -> Self {
        Self {
            faction,
            color: color.to_string(),
            starting_positions,
            traits: FactionTraits::NONE,
        }
    }

    pub fn with_traits(mut self, traits: FactionTraits) -> Self {
        self.traits = traits;
        self
    }
}

/// Every constant a match is built from
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    pub map_size: i8,
    pub victory_points: u32,
    pub max_rounds: u32,
    pub control_points: Vec<Position>,
    /// Classes handed to each faction, one per starting position
    pub unit_roster: Vec<UnitClass>,
    /// Factions in turn order
    pub factions: Vec<FactionSetup>,
}

impl MatchConfig {
    /// Load from JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: MatchConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save to JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Keep only the listed factions, in the given order
    pub fn with_factions(mut self, factions: &[Faction]) -> Self {
        self.factions = factions
            .iter()
            .filter_map(|f| self.factions.iter().find(|s| s.faction == *f).cloned())
            .collect();
        self
    }

    pub fn setup_for(&self, faction: Faction) -> Option<&FactionSetup> {
        self.factions.iter().find(|s| s.faction == faction)
    }

    pub fn color_of(&self, faction: Faction) -> &str {
        self.setup_for(faction).map_or("", |s| s.color.as_str())
    }

    /// Check every invariant a match relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_MAP_SIZE).contains(&self.map_size) {
            return Err(ConfigError::MapSize(self.map_size));
        }
        if self.factions.is_empty() {
            return Err(ConfigError::NoFactions);
        }
        if self.victory_points == 0 {
            return Err(ConfigError::ZeroVictoryPoints);
        }
        if self.max_rounds == 0 {
            return Err(ConfigError::ZeroMaxRounds);
        }

        let mut control_points = HashSet::new();
        for &cp in &self.control_points {
            if !cp.is_valid(self.map_size) {
                return Err(ConfigError::OffMap(cp));
            }
            if !control_points.insert(cp) {
                return Err(ConfigError::DuplicateControlPoint(cp));
            }
        }

        let mut seen_factions = HashSet::new();
        let mut occupied = HashSet::new();
        for setup in &self.factions {
            if !seen_factions.insert(setup.faction) {
                return Err(ConfigError::DuplicateFaction(setup.faction));
            }
            if setup.starting_positions.len() != self.unit_roster.len() {
                return Err(ConfigError::StartingPositions {
                    faction: setup.faction,
                    expected: self.unit_roster.len(),
                    got: setup.starting_positions.len(),
                });
            }
            for &pos in &setup.starting_positions {
                if !pos.is_valid(self.map_size) {
                    return Err(ConfigError::OffMap(pos));
                }
                if !occupied.insert(pos) {
                    return Err(ConfigError::OverlappingStart(pos));
                }
            }
        }

        Ok(())
    }
}

fn positions(coords: &[(i8, i8)]) -> Vec<Position> {
    coords.iter().map(|&(r, c)| Position::new(r, c)).collect()
}

impl Default for MatchConfig {
    /// Reference four-faction setup on an 11x11 map
    fn default() -> Self {
        Self {
            map_size: MAP_SIZE,
            victory_points: VICTORY_POINTS,
            max_rounds: MAX_ROUNDS,
            control_points: positions(&[(6, 6), (3, 3), (3, 9), (9, 3), (9, 9)]),
            unit_roster: vec![
                UnitClass::Infantry,
                UnitClass::Infantry,
                UnitClass::Cavalry,
                UnitClass::Cavalry,
                UnitClass::Archer,
                UnitClass::Special,
            ],
            factions: vec![
                FactionSetup::new(
                    Faction::Red,
                    "firebrick",
                    positions(&[(1, 1), (1, 2), (2, 1), (2, 2), (3, 1), (2, 3)]),
                )
                .with_traits(FactionTraits::offensive(1)),
                FactionSetup::new(
                    Faction::Blue,
                    "royalblue",
                    positions(&[(1, 10), (1, 11), (2, 10), (2, 11), (3, 11), (2, 9)]),
                ),
                FactionSetup::new(
                    Faction::Green,
                    "forestgreen",
                    positions(&[(11, 1), (11, 2), (10, 1), (10, 2), (9, 1), (10, 3)]),
                ),
                FactionSetup::new(
                    Faction::Yellow,
                    "goldenrod",
                    positions(&[(11, 10), (11, 11), (10, 10), (10, 11), (9, 11), (10, 9)]),
                )
                .with_traits(FactionTraits::mutual_support(1)),
            ],
        }
    }
}
