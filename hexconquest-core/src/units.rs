//! Faction and unit definitions

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::grid::Position;

/// Playable faction
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Faction {
    Red,
    Blue,
    Green,
    Yellow,
}

impl Faction {
    pub const ALL: [Faction; 4] = [Faction::Red, Faction::Blue, Faction::Green, Faction::Yellow];

    pub fn name(self) -> &'static str {
        match self {
            Faction::Red => "Red",
            Faction::Blue => "Blue",
            Faction::Green => "Green",
            Faction::Yellow => "Yellow",
        }
    }

    /// Single-letter tag used in unit labels
    pub fn initial(self) -> char {
        match self {
            Faction::Red => 'R',
            Faction::Blue => 'B',
            Faction::Green => 'G',
            Faction::Yellow => 'Y',
        }
    }
}

impl std::fmt::Display for Faction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Unit class (immutable for the unit's lifetime)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitClass {
    Infantry,
    Cavalry,
    Archer,
    Special,
}

impl UnitClass {
    pub fn initial(self) -> char {
        match self {
            UnitClass::Infantry => 'I',
            UnitClass::Cavalry => 'C',
            UnitClass::Archer => 'A',
            UnitClass::Special => 'S',
        }
    }

    /// Class-based attack modifier
    pub fn attack_bonus(self) -> i32 {
        match self {
            UnitClass::Cavalry => 1,
            _ => 0,
        }
    }

    /// Class-based defense modifier
    pub fn defense_bonus(self) -> i32 {
        match self {
            UnitClass::Infantry => 1,
            _ => 0,
        }
    }
}

/// Innate faction traits, attached to every unit at creation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionTraits {
    /// Added to every attack roll
    #[serde(default)]
    pub innate_attack_bonus: i32,
    /// Added once to a defense roll when a friendly unit is adjacent
    #[serde(default)]
    pub mutual_support_bonus: i32,
}

impl FactionTraits {
    pub const NONE: FactionTraits = FactionTraits {
        innate_attack_bonus: 0,
        mutual_support_bonus: 0,
    };

    pub const fn offensive(bonus: i32) -> Self {
        Self {
            innate_attack_bonus: bonus,
            mutual_support_bonus: 0,
        }
    }

    pub const fn mutual_support(bonus: i32) -> Self {
        Self {
            innate_attack_bonus: 0,
            mutual_support_bonus: bonus,
        }
    }
}

/// Stable unit identity (labels and logs only; lookup is by position)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(pub u32);

/// A unit on the board
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub faction: Faction,
    pub class: UnitClass,
    pub position: Position,
    pub traits: FactionTraits,
}

impl Unit {
    pub fn new(
        id: UnitId,
        faction: Faction,
        class: UnitClass,
        position: Position,
        traits: FactionTraits,
    ) -> Self {
        Self {
            id,
            faction,
            class,
            position,
            traits,
        }
    }

    /// Human-readable label, e.g. `R-C-3`
    pub fn label(&self) -> String {
        format!(
            "{}-{}-{}",
            self.faction.initial(),
            self.class.initial(),
            self.id.0
        )
    }

    /// Attack modifier: class plus faction trait
    pub fn attack_bonus(&self) -> i32 {
        self.class.attack_bonus() + self.traits.innate_attack_bonus
    }

    /// Defense modifier: class plus (at most once) faction mutual support
    pub fn defense_bonus(&self, board: &Board) -> i32 {
        let mut bonus = self.class.defense_bonus();
        if self.traits.mutual_support_bonus != 0 && self.has_adjacent_ally(board) {
            bonus += self.traits.mutual_support_bonus;
        }
        bonus
    }

    fn has_adjacent_ally(&self, board: &Board) -> bool {
        board
            .neighbors(self.position)
            .into_iter()
            .any(|pos| matches!(board.occupant_at(pos), Some(u) if u.faction == self.faction))
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} @ {}", self.label(), self.position)
    }
}
