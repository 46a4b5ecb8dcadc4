//! Turn engine - greedy per-unit policy
//!
//! Each unit of the acting faction, in shuffled order:
//! 1. attacks a random adjacent enemy if there is one
//! 2. otherwise advances to the empty neighbor closest to the map center
//! 3. otherwise holds

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::combat::{self, CombatOutcome};
use crate::grid::Position;
use crate::units::{Faction, UnitId};

/// What one unit did during its step
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitAction {
    Attack {
        unit: UnitId,
        from: Position,
        target: Position,
        outcome: CombatOutcome,
    },
    Advance {
        unit: UnitId,
        from: Position,
        to: Position,
    },
    Hold {
        unit: UnitId,
        at: Position,
    },
    /// Removed earlier in the same turn
    Skipped {
        unit: UnitId,
    },
}

/// All unit actions of one faction turn, in execution order
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TurnReport {
    pub faction: Faction,
    pub actions: Vec<UnitAction>,
}

impl TurnReport {
    pub fn attacks(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| matches!(a, UnitAction::Attack { .. }))
            .count()
    }

    pub fn advances(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| matches!(a, UnitAction::Advance { .. }))
            .count()
    }
}

/// Play one full turn for `faction`
pub fn play_turn<R: Rng + ?Sized>(board: &mut Board, faction: Faction, rng: &mut R) -> TurnReport {
    // Snapshot before any mutation; units lost mid-turn are skipped
    let mut roster: Vec<(UnitId, Position)> = board
        .units_of(faction)
        .into_iter()
        .map(|u| (u.id, u.position))
        .collect();
    roster.shuffle(rng);

    let actions = roster
        .into_iter()
        .map(|(id, pos)| step_unit(board, id, pos, rng))
        .collect();

    TurnReport { faction, actions }
}

/// Act with a single unit, if it is still where the snapshot left it
pub fn step_unit<R: Rng + ?Sized>(
    board: &mut Board,
    id: UnitId,
    pos: Position,
    rng: &mut R,
) -> UnitAction {
    let faction = match board.occupant_at(pos) {
        Some(unit) if unit.id == id => unit.faction,
        _ => return UnitAction::Skipped { unit: id },
    };

    let neighbors = board.neighbors(pos);
    let targets: Vec<Position> = neighbors
        .iter()
        .copied()
        .filter(|&n| matches!(board.occupant_at(n), Some(u) if u.faction != faction))
        .collect();

    if let Some(&target) = targets.choose(rng) {
        if let Some(outcome) = combat::resolve(board, pos, target, rng) {
            return UnitAction::Attack {
                unit: id,
                from: pos,
                target,
                outcome,
            };
        }
    }

    match closest_to_center(board, &neighbors) {
        Some(to) => {
            board.move_unit(pos, to);
            tracing::debug!("Move: {:?} {} -> {}", id, pos, to);
            UnitAction::Advance { unit: id, from: pos, to }
        }
        None => UnitAction::Hold { unit: id, at: pos },
    }
}

/// First empty neighbor with minimal distance to center (ties keep direction order)
fn closest_to_center(board: &Board, neighbors: &[Position]) -> Option<Position> {
    let size = board.size();
    neighbors
        .iter()
        .copied()
        .filter(|&n| board.is_empty_at(n))
        .fold(None, |best: Option<Position>, n| match best {
            Some(b) if b.center_distance_sq(size) <= n.center_distance_sq(size) => Some(b),
            _ => Some(n),
        })
}
