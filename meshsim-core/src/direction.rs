//! The six cardinal directions a [`Core`](crate::core::Core) can route
//! packets in, and the fixed index order used throughout the crate to
//! address per-direction arrays (`in_wires`, `out_wires`, out-slots, merge
//! arbiters).

use std::fmt;

/// One of the six directions a core can route a packet towards.
///
/// `Up`/`Down` only apply to 3D topologies; 2D cores simply leave their
/// up/down wires absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    East,
    West,
    South,
    Up,
    Down,
}

/// Fixed index order for per-direction arrays.
///
/// This ordering is load-bearing for the topology construction's wire
/// sharing (§4.7): a core's north/west wires are literally the same
/// `Wire` objects as its neighbor's south/east out-wires.
pub const ALL_DIRECTIONS: [Direction; 6] = [
    Direction::North,
    Direction::East,
    Direction::West,
    Direction::South,
    Direction::Up,
    Direction::Down,
];

impl Direction {
    /// Index into a 6-element per-direction array.
    pub const fn index(self) -> usize {
        match self {
            Direction::North => 0,
            Direction::East => 1,
            Direction::West => 2,
            Direction::South => 3,
            Direction::Up => 4,
            Direction::Down => 5,
        }
    }

    /// The direction a packet travelling this way arrives from, from the
    /// perspective of the downstream core.
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
            Direction::South => Direction::North,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::North => "north",
            Direction::East => "east",
            Direction::West => "west",
            Direction::South => "south",
            Direction::Up => "up",
            Direction::Down => "down",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_order_matches_lines_in_out_layout() {
        assert_eq!(Direction::North.index(), 0);
        assert_eq!(Direction::East.index(), 1);
        assert_eq!(Direction::West.index(), 2);
        assert_eq!(Direction::South.index(), 3);
        assert_eq!(Direction::Up.index(), 4);
        assert_eq!(Direction::Down.index(), 5);
    }

    #[test]
    fn opposite_is_involutive() {
        for direction in ALL_DIRECTIONS {
            assert_eq!(direction.opposite().opposite(), direction);
        }
    }
}
