//! Board - unit placement indexed by position and by faction

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;

use crate::grid::Position;
use crate::units::{Faction, Unit};

/// The map: at most one unit per position
#[derive(Clone, Debug)]
pub struct Board {
    size: i8,
    control_points: Vec<Position>,

    /// Position -> unit (sparse representation)
    units: FxHashMap<Position, Unit>,

    /// Faction -> positions of its live units, kept in sync with `units`
    by_faction: FxHashMap<Faction, BTreeSet<Position>>,
}

impl Board {
    /// Empty board with no control points
    pub fn new(size: i8) -> Self {
        Self::with_control_points(size, Vec::new())
    }

    pub fn with_control_points(size: i8, control_points: Vec<Position>) -> Self {
        Self {
            size,
            control_points,
            units: FxHashMap::default(),
            by_faction: FxHashMap::default(),
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn size(&self) -> i8 {
        self.size
    }

    pub fn control_points(&self) -> &[Position] {
        &self.control_points
    }

    pub fn is_control_point(&self, pos: Position) -> bool {
        self.control_points.contains(&pos)
    }

    /// Unit at position, if any
    pub fn occupant_at(&self, pos: Position) -> Option<&Unit> {
        self.units.get(&pos)
    }

    pub fn is_empty_at(&self, pos: Position) -> bool {
        !self.units.contains_key(&pos)
    }

    /// Adjacent on-map positions, in direction order
    pub fn neighbors(&self, pos: Position) -> Vec<Position> {
        pos.neighbors(self.size)
    }

    /// Iterate all units on the board
    pub fn units(&self) -> impl Iterator<Item = &Unit> + '_ {
        self.units.values()
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Live units of a faction, ordered by position
    pub fn units_of(&self, faction: Faction) -> Vec<&Unit> {
        self.by_faction
            .get(&faction)
            .into_iter()
            .flatten()
            .filter_map(|pos| self.units.get(pos))
            .collect()
    }

    pub fn count_of(&self, faction: Faction) -> usize {
        self.by_faction.get(&faction).map_or(0, BTreeSet::len)
    }

    /// Factions with at least one unit on the board
    pub fn live_factions(&self) -> BTreeSet<Faction> {
        self.by_faction
            .iter()
            .filter(|(_, positions)| !positions.is_empty())
            .map(|(&faction, _)| faction)
            .collect()
    }

    // ========================================================================
    // MUTATION
    // ========================================================================

    /// Insert a unit at its own position, replacing any occupant there
    pub fn place(&mut self, unit: Unit) {
        let pos = unit.position;
        self.unindex(pos);
        self.by_faction.entry(unit.faction).or_default().insert(pos);
        self.units.insert(pos, unit);
    }

    /// Relocate the occupant of `from` to `to`. Returns false if `from` is empty.
    pub fn move_unit(&mut self, from: Position, to: Position) -> bool {
        let Some(mut unit) = self.remove(from) else {
            return false;
        };
        unit.position = to;
        self.place(unit);
        true
    }

    /// Take the unit at position off the board
    pub fn remove(&mut self, pos: Position) -> Option<Unit> {
        let unit = self.units.remove(&pos)?;
        if let Some(positions) = self.by_faction.get_mut(&unit.faction) {
            positions.remove(&pos);
        }
        Some(unit)
    }

    fn unindex(&mut self, pos: Position) {
        if let Some(previous) = self.units.get(&pos) {
            if let Some(positions) = self.by_faction.get_mut(&previous.faction) {
                positions.remove(&pos);
            }
        }
    }
}
