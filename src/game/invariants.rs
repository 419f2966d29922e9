//! Whole-world consistency checks.
//!
//! These are cross-cutting invariants no single subsystem can verify on its
//! own. The round loop runs [`assert_invariants`] after every end phase in
//! debug builds; tests call [`check_invariants`] directly to inspect
//! violations without panicking.

use std::collections::BTreeSet;
use std::fmt;

use crate::game::geometry::Location;
use crate::game::robot::{Robot, RobotId};
use crate::game::team::Team;
use crate::game::world::World;

/// One detected inconsistency in the world state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantViolation {
    /// The occupancy grid and the robot registry disagree at a tile.
    OccupancyMismatch {
        /// The disputed tile.
        loc: Location,
    },
    /// The incrementally maintained multiplier drifted from a from-scratch
    /// recomputation.
    MultiplierDrift {
        /// The tile.
        loc: Location,
        /// The team whose multiplier drifted.
        team: Team,
        /// The incrementally maintained value, in hundredths.
        derived: i32,
        /// The from-scratch value, in hundredths.
        recomputed: i32,
    },
    /// A robot's inventory weight exceeds its capacity.
    OverCapacity {
        /// The overloaded robot.
        id: RobotId,
    },
    /// A living robot's health is zero or above its archetype maximum.
    HealthOutOfBounds {
        /// The robot.
        id: RobotId,
    },
    /// The execution order and the robot registry do not hold the same IDs.
    ExecOrderMismatch {
        /// The ID present on one side only.
        id: RobotId,
    },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvariantViolation::OccupancyMismatch { loc } => {
                write!(f, "occupancy mismatch at ({}, {})", loc.x, loc.y)
            }
            InvariantViolation::MultiplierDrift {
                loc,
                team,
                derived,
                recomputed,
            } => write!(
                f,
                "multiplier drift at ({}, {}) for {team:?}: derived {derived}, recomputed {recomputed}",
                loc.x, loc.y
            ),
            InvariantViolation::OverCapacity { id } => {
                write!(f, "robot {id} is over inventory capacity")
            }
            InvariantViolation::HealthOutOfBounds { id } => {
                write!(f, "robot {id} has out-of-bounds health")
            }
            InvariantViolation::ExecOrderMismatch { id } => {
                write!(f, "robot {id} is missing from one of registry/exec order")
            }
        }
    }
}

/// Sweep the world and collect every violation found.
#[must_use]
pub fn check_invariants(world: &World) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let map = world.map();

    // Occupancy grid and robot registry must be a bijection over tiles
    for idx in 0..map.size() {
        let loc = map.location_of(idx);
        if let Some(id) = world.occupant(idx) {
            let consistent = world
                .robot(id)
                .is_some_and(|robot| robot.location() == loc);
            if !consistent {
                violations.push(InvariantViolation::OccupancyMismatch { loc });
            }
        }
    }
    for robot in world.robots() {
        let loc = robot.location();
        let registered = map
            .index(loc)
            .and_then(|idx| world.occupant(idx))
            .is_some_and(|id| id == robot.id());
        if !registered {
            violations.push(InvariantViolation::OccupancyMismatch { loc });
        }
    }

    // Incremental multipliers must agree with a from-scratch recomputation
    let effects = world.effects();
    for idx in 0..effects.tile_count() {
        for team in [Team::Sol, Team::Umbra] {
            let derived = effects.multiplier_centi(idx, team);
            let recomputed = effects.recompute_centi(idx, team);
            if derived != recomputed {
                violations.push(InvariantViolation::MultiplierDrift {
                    loc: map.location_of(idx),
                    team,
                    derived,
                    recomputed,
                });
            }
        }
    }

    // Per-robot bounds
    for robot in world.robots() {
        if let Some(cap) = robot.archetype().capacity()
            && robot.inventory().weight() > cap
        {
            violations.push(InvariantViolation::OverCapacity { id: robot.id() });
        }
        if robot.health() == 0 || robot.health() > robot.archetype().max_health() {
            violations.push(InvariantViolation::HealthOutOfBounds { id: robot.id() });
        }
    }

    // Execution order must hold exactly the living robot IDs
    let in_order: BTreeSet<RobotId> = world.exec_order().iter().copied().collect();
    let in_registry: BTreeSet<RobotId> = world.robots().map(Robot::id).collect();
    for &id in in_order.symmetric_difference(&in_registry) {
        violations.push(InvariantViolation::ExecOrderMismatch { id });
    }

    violations
}

/// Panic with a readable report if any invariant is violated.
///
/// # Panics
///
/// Panics when [`check_invariants`] finds anything.
pub fn assert_invariants(world: &World) {
    let violations = check_invariants(world);
    assert!(
        violations.is_empty(),
        "world invariants violated in round {}: {}",
        world.round(),
        violations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::geometry::Location;
    use crate::game::map::{GameMap, MapInput, MapSymmetry, RobotPlacement};
    use crate::game::robot::Archetype;
    use crate::game::world::World;

    fn small_world() -> World {
        let size = 20 * 20;
        let map = GameMap::new(MapInput {
            width: 20,
            height: 20,
            origin: Location::new(0, 0),
            seed: 7,
            round_limit: 50,
            symmetry: MapSymmetry::Rotational,
            walls: vec![false; size],
            clouds: vec![false; size],
            currents: vec![crate::game::geometry::Direction::Center; size],
            islands: vec![0; size],
            resources: vec![None; size],
            placements: vec![
                RobotPlacement {
                    id: 1,
                    archetype: Archetype::Bastion,
                    location: Location::new(2, 2),
                    team: crate::game::team::Team::Sol,
                },
                RobotPlacement {
                    id: 2,
                    archetype: Archetype::Bastion,
                    location: Location::new(17, 17),
                    team: crate::game::team::Team::Umbra,
                },
            ],
        })
        .unwrap();
        World::new(map).unwrap()
    }

    #[test]
    fn test_fresh_world_is_consistent() {
        let world = small_world();
        assert!(check_invariants(&world).is_empty());
    }

    #[test]
    fn test_violation_display_is_readable() {
        let violation = InvariantViolation::MultiplierDrift {
            loc: Location::new(3, 4),
            team: Team::Sol,
            derived: 90,
            recomputed: 100,
        };
        let text = violation.to_string();
        assert!(text.contains("(3, 4)"));
        assert!(text.contains("90"));
        assert!(text.contains("100"));
    }
}
