//! Locations and directions on the grid.

use serde::{Deserialize, Serialize};

/// A tile location in absolute map coordinates.
///
/// Maps carry an origin offset, so valid coordinates are not necessarily
/// zero-based; conversion to array indices happens in the world container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    /// X coordinate (column).
    pub x: i32,
    /// Y coordinate (row).
    pub y: i32,
}

impl Location {
    /// Create a new location.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another location.
    #[must_use]
    pub const fn distance_squared(self, other: Location) -> i32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Check whether another location lies within a squared-radius budget.
    #[must_use]
    pub const fn is_within_distance_squared(self, other: Location, radius_squared: i32) -> bool {
        self.distance_squared(other) <= radius_squared
    }

    /// The location one step in the given direction.
    #[must_use]
    pub const fn add(self, dir: Direction) -> Self {
        Self {
            x: self.x + dir.dx(),
            y: self.y + dir.dy(),
        }
    }

    /// The location offset by the given deltas.
    #[must_use]
    pub const fn translate(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// One of the eight compass directions, or `Center` (no movement).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    /// No movement.
    Center = 0,
    /// +y.
    North = 1,
    /// +x, +y.
    Northeast = 2,
    /// +x.
    East = 3,
    /// +x, -y.
    Southeast = 4,
    /// -y.
    South = 5,
    /// -x, -y.
    Southwest = 6,
    /// -x.
    West = 7,
    /// -x, +y.
    Northwest = 8,
}

/// The eight compass directions in clockwise order starting north.
pub const COMPASS_DIRECTIONS: [Direction; 8] = [
    Direction::North,
    Direction::Northeast,
    Direction::East,
    Direction::Southeast,
    Direction::South,
    Direction::Southwest,
    Direction::West,
    Direction::Northwest,
];

impl Direction {
    /// X component of this direction.
    #[must_use]
    pub const fn dx(self) -> i32 {
        match self {
            Direction::Center | Direction::North | Direction::South => 0,
            Direction::Northeast | Direction::East | Direction::Southeast => 1,
            Direction::Southwest | Direction::West | Direction::Northwest => -1,
        }
    }

    /// Y component of this direction.
    #[must_use]
    pub const fn dy(self) -> i32 {
        match self {
            Direction::Center | Direction::East | Direction::West => 0,
            Direction::North | Direction::Northeast | Direction::Northwest => 1,
            Direction::South | Direction::Southeast | Direction::Southwest => -1,
        }
    }

    /// The direction pointing the opposite way. `Center` is its own opposite.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Direction::Center => Direction::Center,
            Direction::North => Direction::South,
            Direction::Northeast => Direction::Southwest,
            Direction::East => Direction::West,
            Direction::Southeast => Direction::Northwest,
            Direction::South => Direction::North,
            Direction::Southwest => Direction::Northeast,
            Direction::West => Direction::East,
            Direction::Northwest => Direction::Southeast,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_squared() {
        let a = Location::new(3, 4);
        let b = Location::new(0, 0);
        assert_eq!(a.distance_squared(b), 25);
        assert_eq!(b.distance_squared(a), 25);
        assert_eq!(a.distance_squared(a), 0);
    }

    #[test]
    fn test_within_distance() {
        let a = Location::new(2, 2);
        assert!(a.is_within_distance_squared(Location::new(4, 4), 8));
        assert!(!a.is_within_distance_squared(Location::new(4, 4), 7));
    }

    #[test]
    fn test_direction_deltas_sum_to_zero() {
        let sum: (i32, i32) = COMPASS_DIRECTIONS
            .iter()
            .fold((0, 0), |(x, y), d| (x + d.dx(), y + d.dy()));
        assert_eq!(sum, (0, 0));
    }

    #[test]
    fn test_opposite_round_trips() {
        for dir in COMPASS_DIRECTIONS {
            assert_eq!(dir.opposite().opposite(), dir);
            assert_eq!(dir.dx(), -dir.opposite().dx());
            assert_eq!(dir.dy(), -dir.opposite().dy());
        }
        assert_eq!(Direction::Center.opposite(), Direction::Center);
    }

    #[test]
    fn test_add_direction() {
        let loc = Location::new(10, 10);
        assert_eq!(loc.add(Direction::Northeast), Location::new(11, 11));
        assert_eq!(loc.add(Direction::Center), loc);
        assert_eq!(loc.translate(-3, 2), Location::new(7, 12));
    }
}
