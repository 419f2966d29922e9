//! Error types for the match engine.
//!
//! Two severities exist. [`ActionError`] is a recoverable rejection returned
//! to a robot's decision procedure when an action precondition fails; it never
//! aborts the round. [`EngineError`] is a fatal state violation that tears the
//! match down.

use std::fmt;

use crate::game::{Archetype, Location, ResourceKind, RobotId};

/// Reasons an attempted robot action is rejected.
///
/// Every mutating action on a turn context has a `can_*` twin that lets a
/// well-behaved controller avoid these entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionError {
    /// The relevant cooldown counter has not run down yet.
    NotReady {
        /// Current value of the gating cooldown counter.
        cooldown: u32,
    },
    /// The target location is outside the map.
    OffMap(Location),
    /// The target location is beyond the acting robot's reach.
    OutOfRange {
        /// The rejected target.
        loc: Location,
        /// The squared-radius budget that was exceeded.
        radius_squared: i32,
    },
    /// The location cannot be sensed from here.
    OutOfVision(Location),
    /// The target tile already holds a robot.
    Occupied(Location),
    /// The target tile is a wall.
    Impassable(Location),
    /// No robot stands at the target tile.
    NoRobotAt(Location),
    /// The robot at the target tile is on the actor's own team.
    TargetIsFriendly(Location),
    /// The robot at the target tile is not on the actor's own team.
    TargetNotFriendly(Location),
    /// The actor's team or inventory lacks the required resources.
    InsufficientResources {
        /// The resource that ran short.
        kind: ResourceKind,
        /// The amount the action needed.
        needed: u32,
    },
    /// Adding the requested amount would exceed an inventory's capacity.
    CapacityExceeded,
    /// The actor's or target's archetype is unsuitable for this action.
    WrongArchetype(Archetype),
    /// The action needs an anchor and none is held.
    NoAnchor,
    /// The holder already carries an anchor.
    AlreadyHasAnchor,
    /// The target tile has no resource well.
    NotAWell(Location),
    /// The target tile belongs to no island.
    NotAnIsland(Location),
    /// The shared-array index is out of bounds.
    InvalidSharedIndex(usize),
    /// The indicator slot index is out of bounds.
    InvalidIndicatorSlot(usize),
    /// The acting robot no longer exists; it died earlier in its own turn.
    RobotDestroyed,
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionError::NotReady { cooldown } => {
                write!(f, "cooldown not expired ({cooldown} remaining)")
            }
            ActionError::OffMap(loc) => write!(f, "location ({}, {}) is off the map", loc.x, loc.y),
            ActionError::OutOfRange {
                loc,
                radius_squared,
            } => write!(
                f,
                "location ({}, {}) is outside squared radius {radius_squared}",
                loc.x, loc.y
            ),
            ActionError::OutOfVision(loc) => {
                write!(f, "location ({}, {}) cannot be sensed", loc.x, loc.y)
            }
            ActionError::Occupied(loc) => {
                write!(f, "location ({}, {}) is occupied", loc.x, loc.y)
            }
            ActionError::Impassable(loc) => {
                write!(f, "location ({}, {}) is impassable", loc.x, loc.y)
            }
            ActionError::NoRobotAt(loc) => {
                write!(f, "no robot at ({}, {})", loc.x, loc.y)
            }
            ActionError::TargetIsFriendly(loc) => {
                write!(f, "robot at ({}, {}) is friendly", loc.x, loc.y)
            }
            ActionError::TargetNotFriendly(loc) => {
                write!(f, "robot at ({}, {}) is not friendly", loc.x, loc.y)
            }
            ActionError::InsufficientResources { kind, needed } => {
                write!(f, "needs {needed} {kind:?}")
            }
            ActionError::CapacityExceeded => write!(f, "inventory capacity exceeded"),
            ActionError::WrongArchetype(archetype) => {
                write!(f, "{archetype:?} cannot perform this action")
            }
            ActionError::NoAnchor => write!(f, "no anchor held"),
            ActionError::AlreadyHasAnchor => write!(f, "an anchor is already held"),
            ActionError::NotAWell(loc) => write!(f, "no well at ({}, {})", loc.x, loc.y),
            ActionError::NotAnIsland(loc) => write!(f, "no island at ({}, {})", loc.x, loc.y),
            ActionError::InvalidSharedIndex(index) => {
                write!(f, "shared array index {index} out of bounds")
            }
            ActionError::InvalidIndicatorSlot(slot) => {
                write!(f, "indicator slot {slot} out of bounds")
            }
            ActionError::RobotDestroyed => write!(f, "acting robot no longer exists"),
        }
    }
}

impl std::error::Error for ActionError {}

/// Result type for robot actions and sensing queries.
pub type ActionResult<T> = Result<T, ActionError>;

/// Fatal simulation faults.
///
/// Any of these aborts the current round, marks the match done, and is
/// reported upward uninterpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    /// A robot other than a Bastion was registered during first-round setup.
    StartingRobotNotBastion {
        /// The offending robot.
        id: RobotId,
    },
    /// A robot ID was looked up that the registry does not contain.
    UnknownRobot {
        /// The missing robot.
        id: RobotId,
    },
    /// The occupancy grid disagrees with the robot registry at a tile.
    OccupancyCorrupted(Location),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::StartingRobotNotBastion { id } => {
                write!(f, "starting robot {id} is not a Bastion")
            }
            EngineError::UnknownRobot { id } => write!(f, "unknown robot id {id}"),
            EngineError::OccupancyCorrupted(loc) => {
                write!(f, "occupancy grid corrupted at ({}, {})", loc.x, loc.y)
            }
        }
    }
}

impl std::error::Error for EngineError {}
