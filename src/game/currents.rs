//! The forced-movement ("currents") resolver.
//!
//! Currents move every occupying robot along its tile's current vector at
//! once. Resolution is plan-then-commit: all movement decisions are computed
//! against the pre-move world, then applied atomically, so the outcome cannot
//! depend on the order robots are considered in.

use std::collections::{BTreeMap, BTreeSet};

use crate::game::geometry::{Direction, Location};
use crate::game::map::GameMap;
use crate::game::robot::RobotId;

/// One robot's standing at planning time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentClaim {
    /// The robot.
    pub id: RobotId,
    /// Where it stands before resolution.
    pub location: Location,
    /// Whether its archetype can be moved at all. Immovable robots forecast
    /// in place and block like any stationary robot.
    pub movable: bool,
}

/// Plan one currents cycle over the given robots.
///
/// Every robot forecasts the tile its current pushes it toward (its own tile
/// when the current is `Center` or it is immovable). A forecast is blocked
/// when it is off-map, a wall, or claimed by more than one robot; blocking
/// then propagates to any robot forecasting onto a blocked robot's tile,
/// with a visited-tile guard terminating cycles. Everything else moves.
///
/// Returns the moves to apply, sorted by robot ID. The result is a pure
/// function of the claim *set* — permuting `claims` cannot change it.
#[must_use]
pub fn plan_forced_moves(map: &GameMap, claims: &[CurrentClaim]) -> Vec<(RobotId, Location)> {
    // Forecast phase: where each robot is headed, and who claims each tile.
    let mut forecasts: BTreeMap<usize, Vec<RobotId>> = BTreeMap::new();
    let mut targets: BTreeMap<RobotId, (Location, Option<Location>)> = BTreeMap::new();
    for claim in claims {
        let Some(here_idx) = map.index(claim.location) else {
            continue;
        };
        let dir = if claim.movable {
            map.current_at(here_idx)
        } else {
            Direction::Center
        };
        let target = claim.location.add(dir);
        match map.index(target) {
            Some(target_idx) if !map.is_wall(target_idx) => {
                forecasts.entry(target_idx).or_default().push(claim.id);
                targets.insert(claim.id, (claim.location, Some(target)));
            }
            // Off-map or wall forecasts block immediately
            _ => {
                targets.insert(claim.id, (claim.location, None));
            }
        }
    }

    // Seed the blocked set: failed forecasts, contested tiles, and robots
    // that are staying put regardless.
    let mut worklist: Vec<RobotId> = Vec::new();
    for (&id, &(origin, target)) in &targets {
        match target {
            None => worklist.push(id),
            Some(t) if t == origin => worklist.push(id),
            Some(_) => {}
        }
    }
    for ids in forecasts.values() {
        if ids.len() > 1 {
            worklist.extend(ids.iter().copied());
        }
    }

    // Propagate: a robot that stays blocks everyone forecasting its tile.
    let mut not_moving: BTreeSet<RobotId> = BTreeSet::new();
    let mut visited: BTreeSet<Location> = BTreeSet::new();
    while let Some(id) = worklist.pop() {
        let Some(&(origin, _)) = targets.get(&id) else {
            continue;
        };
        not_moving.insert(id);
        if !visited.insert(origin) {
            continue;
        }
        if let Some(origin_idx) = map.index(origin)
            && let Some(claimants) = forecasts.get(&origin_idx)
        {
            worklist.extend(claimants.iter().copied().filter(|c| *c != id));
        }
    }

    targets
        .iter()
        .filter_map(|(&id, &(_, target))| {
            let target = target?;
            (!not_moving.contains(&id)).then_some((id, target))
        })
        .collect()
}
