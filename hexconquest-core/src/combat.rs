//! Combat resolution: one d6 per side plus modifiers

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::grid::Position;
use crate::units::UnitId;

/// Faces on the combat die
pub const DIE_SIDES: i32 = 6;

/// Raw die results for one combat
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatRolls {
    pub attack_die: i32,
    pub defense_die: i32,
}

impl CombatRolls {
    pub const fn new(attack_die: i32, defense_die: i32) -> Self {
        Self {
            attack_die,
            defense_die,
        }
    }

    /// Roll attacker first, then defender
    pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let attack_die = rng.gen_range(1..=DIE_SIDES);
        let defense_die = rng.gen_range(1..=DIE_SIDES);
        Self::new(attack_die, defense_die)
    }
}

/// Who survived
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatResult {
    /// Strict attacker win: only the defender is removed
    AttackerWins,
    /// Tie or defender win: both units are removed
    MutualDestruction,
}

/// Full record of a resolved combat
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatOutcome {
    pub attacker: UnitId,
    pub defender: UnitId,
    pub rolls: CombatRolls,
    pub attack_total: i32,
    pub defense_total: i32,
    pub result: CombatResult,
}

/// Decide the result from final totals
pub fn judge(attack_total: i32, defense_total: i32) -> CombatResult {
    if attack_total > defense_total {
        CombatResult::AttackerWins
    } else {
        CombatResult::MutualDestruction
    }
}

/// Roll dice and resolve an attack from `attacker` on `defender`.
///
/// Returns None (board untouched) unless both positions are occupied.
pub fn resolve<R: Rng + ?Sized>(
    board: &mut Board,
    attacker: Position,
    defender: Position,
    rng: &mut R,
) -> Option<CombatOutcome> {
    if board.is_empty_at(attacker) || board.is_empty_at(defender) {
        return None;
    }
    let rolls = CombatRolls::roll(rng);
    resolve_with_rolls(board, attacker, defender, rolls)
}

/// Resolve an attack with predetermined dice
pub fn resolve_with_rolls(
    board: &mut Board,
    attacker: Position,
    defender: Position,
    rolls: CombatRolls,
) -> Option<CombatOutcome> {
    let atk = board.occupant_at(attacker)?;
    let def = board.occupant_at(defender)?;

    // Defense bonus reads the board before anything is removed
    let attack_bonus = atk.attack_bonus();
    let defense_bonus = def.defense_bonus(board);
    let attack_total = rolls.attack_die + attack_bonus;
    let defense_total = rolls.defense_die + defense_bonus;
    let result = judge(attack_total, defense_total);

    let outcome = CombatOutcome {
        attacker: atk.id,
        defender: def.id,
        rolls,
        attack_total,
        defense_total,
        result,
    };

    tracing::debug!(
        "Combat: {} attacks {} | attack {} (d{}+{}) vs defense {} (d{}+{}) -> {:?}",
        atk,
        def,
        attack_total,
        rolls.attack_die,
        attack_bonus,
        defense_total,
        rolls.defense_die,
        defense_bonus,
        result
    );

    match result {
        CombatResult::AttackerWins => {
            board.remove(defender);
        }
        CombatResult::MutualDestruction => {
            board.remove(attacker);
            board.remove(defender);
        }
    }

    Some(outcome)
}
