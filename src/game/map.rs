//! The immutable initial-map input.
//!
//! A [`MapInput`] is what a host hands the engine: dimensions, seed, per-tile
//! arrays, and starting robot placements. [`GameMap`] is the validated form;
//! once built it never changes for the life of the match.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::game::constants::{MAP_MAX_DIMENSION, MAP_MIN_DIMENSION};
use crate::game::geometry::{Direction, Location};
use crate::game::island::IslandId;
use crate::game::robot::{Archetype, RobotId};
use crate::game::team::{ResourceKind, Team};

/// The symmetry a map was generated with. Carried for hosts; the engine does
/// not act on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapSymmetry {
    /// 180-degree rotational symmetry.
    Rotational,
    /// Mirrored across the horizontal axis.
    Horizontal,
    /// Mirrored across the vertical axis.
    Vertical,
}

/// One starting robot in the initial map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotPlacement {
    /// Pre-assigned robot ID; placements must be sorted by this, ascending.
    pub id: RobotId,
    /// The robot's archetype.
    pub archetype: Archetype,
    /// The robot's starting tile, in absolute coordinates.
    pub location: Location,
    /// The robot's team.
    pub team: Team,
}

/// Raw map data as supplied by a host.
///
/// All per-tile arrays are row-major, length `width * height`, indexed by
/// `(x - origin.x) + (y - origin.y) * width`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapInput {
    /// Map width in tiles.
    pub width: i32,
    /// Map height in tiles.
    pub height: i32,
    /// Absolute coordinates of the south-west corner tile.
    pub origin: Location,
    /// Seed for the match's random source.
    pub seed: u64,
    /// Round number at which the match ends and tiebreaks run.
    pub round_limit: u32,
    /// The symmetry the map was generated with.
    pub symmetry: MapSymmetry,
    /// Wall flags; wall tiles are impassable.
    pub walls: Vec<bool>,
    /// Cloud flags; cloud tiles slow both teams.
    pub clouds: Vec<bool>,
    /// Per-tile current vectors; `Center` means no current.
    pub currents: Vec<Direction>,
    /// Per-tile island IDs; zero means no island.
    pub islands: Vec<IslandId>,
    /// Per-tile resource-well kinds; `None` means no well.
    pub resources: Vec<Option<ResourceKind>>,
    /// Starting robots, sorted by ID.
    pub placements: Vec<RobotPlacement>,
}

/// Reasons a [`MapInput`] is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapError {
    /// Width or height outside the allowed range.
    BadDimensions {
        /// Offered width.
        width: i32,
        /// Offered height.
        height: i32,
    },
    /// A per-tile array's length does not match `width * height`.
    WrongArrayLength {
        /// Which array.
        name: &'static str,
        /// The required length.
        expected: usize,
        /// The offered length.
        actual: usize,
    },
    /// The round limit is zero.
    ZeroRoundLimit,
    /// A placement lies outside the map.
    PlacementOffMap {
        /// The offending robot.
        id: RobotId,
    },
    /// A placement lies on a wall tile.
    PlacementOnWall {
        /// The offending robot.
        id: RobotId,
    },
    /// Two placements share a tile.
    PlacementCollision {
        /// The later of the colliding robots.
        id: RobotId,
    },
    /// Placement IDs are not strictly increasing.
    PlacementsUnsorted {
        /// The first out-of-order robot.
        id: RobotId,
    },
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::BadDimensions { width, height } => {
                write!(f, "map dimensions {width}x{height} out of range")
            }
            MapError::WrongArrayLength {
                name,
                expected,
                actual,
            } => write!(f, "{name} array has length {actual}, expected {expected}"),
            MapError::ZeroRoundLimit => write!(f, "round limit must be positive"),
            MapError::PlacementOffMap { id } => write!(f, "robot {id} placed off the map"),
            MapError::PlacementOnWall { id } => write!(f, "robot {id} placed on a wall"),
            MapError::PlacementCollision { id } => {
                write!(f, "robot {id} placed on an occupied tile")
            }
            MapError::PlacementsUnsorted { id } => {
                write!(f, "robot {id} breaks placement ID ordering")
            }
        }
    }
}

impl std::error::Error for MapError {}

/// A validated, immutable game map.
#[derive(Debug, Clone)]
pub struct GameMap {
    input: MapInput,
}

impl GameMap {
    /// Validate raw map data.
    ///
    /// # Errors
    ///
    /// Returns a [`MapError`] describing the first problem found.
    pub fn new(input: MapInput) -> Result<Self, MapError> {
        let in_range = |d: i32| (MAP_MIN_DIMENSION..=MAP_MAX_DIMENSION).contains(&d);
        if !in_range(input.width) || !in_range(input.height) {
            return Err(MapError::BadDimensions {
                width: input.width,
                height: input.height,
            });
        }
        if input.round_limit == 0 {
            return Err(MapError::ZeroRoundLimit);
        }

        let expected = usize::try_from(input.width * input.height).unwrap_or(0);
        let lengths: [(&'static str, usize); 5] = [
            ("walls", input.walls.len()),
            ("clouds", input.clouds.len()),
            ("currents", input.currents.len()),
            ("islands", input.islands.len()),
            ("resources", input.resources.len()),
        ];
        for (name, actual) in lengths {
            if actual != expected {
                return Err(MapError::WrongArrayLength {
                    name,
                    expected,
                    actual,
                });
            }
        }

        let map = Self { input };
        let mut last_id = None;
        let mut taken = std::collections::BTreeSet::new();
        for placement in &map.input.placements {
            if last_id.is_some_and(|last| placement.id <= last) {
                return Err(MapError::PlacementsUnsorted { id: placement.id });
            }
            last_id = Some(placement.id);

            let Some(idx) = map.index(placement.location) else {
                return Err(MapError::PlacementOffMap { id: placement.id });
            };
            if map.input.walls[idx] {
                return Err(MapError::PlacementOnWall { id: placement.id });
            }
            if !taken.insert(idx) {
                return Err(MapError::PlacementCollision { id: placement.id });
            }
        }

        Ok(map)
    }

    /// Map width in tiles.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.input.width
    }

    /// Map height in tiles.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.input.height
    }

    /// Absolute coordinates of the south-west corner tile.
    #[must_use]
    pub const fn origin(&self) -> Location {
        self.input.origin
    }

    /// The match's random seed.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.input.seed
    }

    /// Round number at which the match resolves.
    #[must_use]
    pub const fn round_limit(&self) -> u32 {
        self.input.round_limit
    }

    /// The map's symmetry tag.
    #[must_use]
    pub const fn symmetry(&self) -> MapSymmetry {
        self.input.symmetry
    }

    /// Number of tiles.
    #[must_use]
    pub fn size(&self) -> usize {
        usize::try_from(self.input.width * self.input.height).unwrap_or(0)
    }

    /// Whether a location lies on the map.
    #[must_use]
    pub const fn in_bounds(&self, loc: Location) -> bool {
        let x = loc.x - self.input.origin.x;
        let y = loc.y - self.input.origin.y;
        x >= 0 && x < self.input.width && y >= 0 && y < self.input.height
    }

    /// Convert a location to a tile index, or `None` when off-map.
    #[must_use]
    pub fn index(&self, loc: Location) -> Option<usize> {
        if !self.in_bounds(loc) {
            return None;
        }
        let x = loc.x - self.input.origin.x;
        let y = loc.y - self.input.origin.y;
        usize::try_from(x + y * self.input.width).ok()
    }

    /// Recover the location of a tile index. Inverse of [`GameMap::index`].
    #[must_use]
    pub fn location_of(&self, idx: usize) -> Location {
        let idx = i32::try_from(idx).unwrap_or(0);
        Location::new(
            self.input.origin.x + idx % self.input.width,
            self.input.origin.y + idx / self.input.width,
        )
    }

    /// Whether the tile at an index is a wall.
    #[must_use]
    pub fn is_wall(&self, idx: usize) -> bool {
        self.input.walls[idx]
    }

    /// The cloud flags, row-major.
    #[must_use]
    pub fn clouds(&self) -> &[bool] {
        &self.input.clouds
    }

    /// The current vector at a tile index.
    #[must_use]
    pub fn current_at(&self, idx: usize) -> Direction {
        self.input.currents[idx]
    }

    /// The island ID at a tile index; zero means none.
    #[must_use]
    pub fn island_id_at(&self, idx: usize) -> IslandId {
        self.input.islands[idx]
    }

    /// The well kind at a tile index, if any.
    #[must_use]
    pub fn resource_at(&self, idx: usize) -> Option<ResourceKind> {
        self.input.resources[idx]
    }

    /// The starting robots, sorted by ID.
    #[must_use]
    pub fn placements(&self) -> &[RobotPlacement] {
        &self.input.placements
    }
}
