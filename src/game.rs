//! The simulation core: map, robots, world state, and the round loop.

mod actions;
pub mod constants;
mod currents;
mod effects;
mod geometry;
mod invariants;
mod island;
mod map;
mod robot;
mod team;
mod well;
mod world;

pub use actions::{RobotInfo, TurnContext, WellInfo};
pub use currents::{CurrentClaim, plan_forced_moves};
pub use geometry::{COMPASS_DIRECTIONS, Direction, Location};
pub use invariants::{InvariantViolation, assert_invariants, check_invariants};
pub use island::{AnchorState, Island, IslandId};
pub use map::{GameMap, MapError, MapInput, MapSymmetry, RobotPlacement};
pub use robot::{ARCHETYPES, Archetype, IndicatorNote, Inventory, Robot, RobotId};
pub use team::{RESOURCE_KINDS, ResourceKind, Team, TeamLedger};
pub use well::Well;
pub use world::{DominationFactor, RoundState, World};
