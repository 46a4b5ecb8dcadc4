//! Hex grid geometry with offset-column coordinates

use serde::{Deserialize, Serialize};

/// Default map extent (rows and columns)
pub const MAP_SIZE: i8 = 11;

/// Offset-column hex position, 1-indexed
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: i8,
    pub col: i8,
}

impl Position {
    pub const fn new(row: i8, col: i8) -> Self {
        Self { row, col }
    }

    /// Check if this position lies inside a `size` x `size` map
    pub fn is_valid(&self, size: i8) -> bool {
        (1..=size).contains(&self.row) && (1..=size).contains(&self.col)
    }

    /// Direction deltas for this position's column parity
    pub fn directions(&self) -> &'static [(i8, i8); 6] {
        if self.col.rem_euclid(2) == 1 {
            &ODD_COLUMN_DIRECTIONS
        } else {
            &EVEN_COLUMN_DIRECTIONS
        }
    }

    /// Adjacent positions inside a `size` x `size` map, in direction order
    pub fn neighbors(&self, size: i8) -> Vec<Position> {
        self.directions()
            .iter()
            .filter_map(|&(dr, dc)| {
                let row = self.row.checked_add(dr)?;
                let col = self.col.checked_add(dc)?;
                Some(Position::new(row, col))
            })
            .filter(|p| p.is_valid(size))
            .collect()
    }

    /// Squared Euclidean distance to the map center, scaled by 4.
    ///
    /// Computed on doubled coordinates so even map sizes (half-cell center)
    /// stay in integers. Ordering is identical to the unscaled distance.
    pub fn center_distance_sq(&self, size: i8) -> i32 {
        let center = i32::from(size) + 1;
        let dr = 2 * i32::from(self.row) - center;
        let dc = 2 * i32::from(self.col) - center;
        dr * dr + dc * dc
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Direction vectors (drow, dcol) for odd columns
/// Index: 0=N, 1=S, 2=W, 3=E, 4=NW, 5=NE
pub const ODD_COLUMN_DIRECTIONS: [(i8, i8); 6] = [
    (-1, 0),  // N
    (1, 0),   // S
    (0, -1),  // W
    (0, 1),   // E
    (-1, -1), // NW
    (-1, 1),  // NE
];

/// Direction vectors (drow, dcol) for even columns
/// Index: 0=N, 1=S, 2=W, 3=E, 4=SW, 5=SE
pub const EVEN_COLUMN_DIRECTIONS: [(i8, i8); 6] = [
    (-1, 0), // N
    (1, 0),  // S
    (0, -1), // W
    (0, 1),  // E
    (1, -1), // SW
    (1, 1),  // SE
];

/// Iterate every position of a `size` x `size` map, row-major
pub fn all_positions(size: i8) -> impl Iterator<Item = Position> {
    (1..=size).flat_map(move |row| (1..=size).map(move |col| Position::new(row, col)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_validity() {
        assert!(Position::new(1, 1).is_valid(MAP_SIZE));
        assert!(Position::new(11, 11).is_valid(MAP_SIZE));
        assert!(!Position::new(0, 5).is_valid(MAP_SIZE));
        assert!(!Position::new(5, 12).is_valid(MAP_SIZE));
    }

    #[test]
    fn test_interior_has_six_neighbors() {
        let odd = Position::new(5, 5).neighbors(MAP_SIZE);
        assert_eq!(
            odd,
            vec![
                Position::new(4, 5),
                Position::new(6, 5),
                Position::new(5, 4),
                Position::new(5, 6),
                Position::new(4, 4),
                Position::new(4, 6),
            ]
        );

        let even = Position::new(5, 6).neighbors(MAP_SIZE);
        assert_eq!(
            even,
            vec![
                Position::new(4, 6),
                Position::new(6, 6),
                Position::new(5, 5),
                Position::new(5, 7),
                Position::new(6, 5),
                Position::new(6, 7),
            ]
        );
    }

    #[test]
    fn test_corners_are_filtered() {
        // (1,1) is odd: N, W, NW, NE fall off the map
        assert_eq!(
            Position::new(1, 1).neighbors(MAP_SIZE),
            vec![Position::new(2, 1), Position::new(1, 2)]
        );
        // (11,11) is odd: S and E fall off, NW and NE stay
        assert_eq!(Position::new(11, 11).neighbors(MAP_SIZE).len(), 3);
        // (1,2) is even: N falls off
        assert_eq!(Position::new(1, 2).neighbors(MAP_SIZE).len(), 5);
    }

    #[test]
    fn test_far_outside_has_no_neighbors() {
        assert!(Position::new(40, 40).neighbors(MAP_SIZE).is_empty());
        assert!(Position::new(i8::MAX, i8::MIN).neighbors(MAP_SIZE).is_empty());
    }

    #[test]
    fn test_adjacency_is_symmetric_and_bounded() {
        for p in all_positions(MAP_SIZE) {
            let neighbors = p.neighbors(MAP_SIZE);
            assert!(neighbors.len() <= 6);
            for q in neighbors {
                assert!(q.is_valid(MAP_SIZE));
                assert_ne!(p, q);
                assert!(
                    q.neighbors(MAP_SIZE).contains(&p),
                    "{} lists {} but not the reverse",
                    p,
                    q
                );
            }
        }
    }

    #[test]
    fn test_center_distance() {
        assert_eq!(Position::new(6, 6).center_distance_sq(MAP_SIZE), 0);
        // (5,6): unscaled distance 1, scaled by 4
        assert_eq!(Position::new(5, 6).center_distance_sq(MAP_SIZE), 4);
        assert_eq!(Position::new(1, 1).center_distance_sq(MAP_SIZE), 200);
        // Even map: center sits between cells, all four middle cells tie
        assert_eq!(
            Position::new(2, 2).center_distance_sq(4),
            Position::new(3, 3).center_distance_sq(4)
        );
    }
}
