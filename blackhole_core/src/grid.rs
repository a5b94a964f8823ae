//! The fixed 10×10 digit grid and compass movement over it.
//!
//! The grid is a torus: walking off any edge re-enters on the opposite one.

use serde::{Deserialize, Serialize};

/// Width and height of the grid.
pub const GRID_SIZE: usize = 10;

/// Number of distinct digit values (cells hold `0..DIGIT_BASE`).
pub const DIGIT_BASE: u8 = 5;

/// Cell values, indexed `GRID[y][x]`. Row 0 is the northern edge.
pub const GRID: [[u8; GRID_SIZE]; GRID_SIZE] = [
    [3, 0, 4, 1, 2, 4, 0, 3, 1, 2],
    [1, 4, 2, 0, 3, 2, 1, 4, 0, 3],
    [0, 2, 3, 4, 1, 0, 3, 2, 4, 1],
    [4, 1, 0, 2, 3, 1, 4, 0, 2, 3],
    [2, 3, 1, 4, 0, 3, 2, 1, 4, 0],
    [3, 0, 4, 1, 2, 4, 0, 3, 2, 1],
    [1, 4, 2, 3, 0, 2, 3, 4, 1, 0],
    [0, 2, 3, 0, 4, 1, 2, 0, 3, 4],
    [4, 1, 0, 2, 1, 3, 4, 1, 0, 2],
    [2, 3, 1, 4, 3, 0, 1, 2, 4, 3],
];

/// One of the eight compass directions, clockwise from north.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Direction(u8);

impl Direction {
    pub const NORTH: Direction = Direction(0);
    pub const NORTH_EAST: Direction = Direction(1);
    pub const EAST: Direction = Direction(2);
    pub const SOUTH_EAST: Direction = Direction(3);
    pub const SOUTH: Direction = Direction(4);
    pub const SOUTH_WEST: Direction = Direction(5);
    pub const WEST: Direction = Direction(6);
    pub const NORTH_WEST: Direction = Direction(7);

    /// Creates a direction from any integer, reduced modulo 8.
    pub fn from_index(index: u32) -> Self {
        Self((index % 8) as u8)
    }

    /// Returns the compass index (0 = north, clockwise).
    pub fn index(self) -> u8 {
        self.0
    }

    /// Returns the direction one 45° step around, in the given sense.
    pub fn rotated(self, clockwise: bool) -> Self {
        if clockwise {
            Self((self.0 + 1) % 8)
        } else {
            Self((self.0 + 7) % 8)
        }
    }

    /// Returns the direction `steps` 45° increments clockwise.
    pub fn turned_clockwise(self, steps: u32) -> Self {
        Self::from_index(u32::from(self.0) + steps % 8)
    }

    /// Returns the `(dx, dy)` unit step; `dy = -1` is north.
    pub fn offset(self) -> (i8, i8) {
        const DX: [i8; 8] = [0, 1, 1, 1, 0, -1, -1, -1];
        const DY: [i8; 8] = [-1, -1, 0, 1, 1, 1, 0, -1];
        (DX[self.0 as usize], DY[self.0 as usize])
    }

    /// Short compass name, for logs.
    pub fn name(self) -> &'static str {
        ["N", "NE", "E", "SE", "S", "SW", "W", "NW"][self.0 as usize]
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A grid coordinate, always within `[0, 9] × [0, 9]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: u8,
    pub y: u8,
}

impl Cell {
    /// Creates a cell, wrapping both coordinates onto the grid.
    pub fn new(x: u8, y: u8) -> Self {
        Self {
            x: x % GRID_SIZE as u8,
            y: y % GRID_SIZE as u8,
        }
    }

    /// Returns the grid value at this cell.
    pub fn value(self) -> u8 {
        GRID[self.y as usize][self.x as usize]
    }

    /// Returns the neighbouring cell in `direction`, wrapping at the edges.
    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        let size = GRID_SIZE as i16;
        Self {
            x: (i16::from(self.x) + i16::from(dx)).rem_euclid(size) as u8,
            y: (i16::from(self.y) + i16::from(dy)).rem_euclid(size) as u8,
        }
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_grid_values_in_base() {
        assert!(GRID.iter().flatten().all(|&v| v < DIGIT_BASE));
    }

    #[test]
    fn test_step_wraps_edges() {
        assert_eq!(Cell::new(0, 0).step(Direction::NORTH), Cell::new(0, 9));
        assert_eq!(Cell::new(0, 0).step(Direction::NORTH_WEST), Cell::new(9, 9));
        assert_eq!(Cell::new(9, 9).step(Direction::SOUTH_EAST), Cell::new(0, 0));
        assert_eq!(Cell::new(9, 4).step(Direction::EAST), Cell::new(0, 4));
        assert_eq!(Cell::new(3, 5).step(Direction::NORTH), Cell::new(3, 4));
    }

    #[test]
    fn test_rotation_round_trip() {
        let mut d = Direction::NORTH;
        for _ in 0..8 {
            d = d.rotated(true);
        }
        assert_eq!(d, Direction::NORTH);
        assert_eq!(Direction::NORTH.rotated(false), Direction::NORTH_WEST);
        assert_eq!(Direction::WEST.turned_clockwise(3), Direction::NORTH_EAST);
        assert_eq!(Direction::NORTH_WEST.turned_clockwise(u32::MAX), Direction::WEST);
    }

    #[test]
    fn test_opposite_steps_cancel() {
        let start = Cell::new(4, 7);
        for i in 0..8 {
            let d = Direction::from_index(i);
            let back = d.turned_clockwise(4);
            assert_eq!(start.step(d).step(back), start);
        }
    }

    proptest! {
        #[test]
        fn prop_walks_stay_on_grid(
            x in 0u8..10,
            y in 0u8..10,
            moves in proptest::collection::vec(0u32..8, 0..1000),
        ) {
            let mut cell = Cell::new(x, y);
            for m in moves {
                cell = cell.step(Direction::from_index(m));
                prop_assert!(cell.x < 10 && cell.y < 10);
            }
        }
    }
}
