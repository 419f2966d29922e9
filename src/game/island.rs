//! Sky islands: capturable area-control zones.

use serde::{Deserialize, Serialize};

use crate::game::constants::ANCHOR_STABILIZE_ROUNDS;
use crate::game::geometry::Location;
use crate::game::team::Team;

/// Island identifier from the map's zone array. Zero means "no island".
pub type IslandId = u16;

/// The progression of a planted anchor on an island.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnchorState {
    /// No anchor planted.
    Absent,
    /// An anchor is planted and counting down to its boost.
    Stabilizing {
        /// Rounds remaining until the anchor accelerates.
        rounds_left: u32,
    },
    /// The anchor's area boost is active over the island's tiles.
    Accelerating,
}

/// A capturable island: an immutable tile set plus ownership and anchor state.
///
/// Ownership changes come from plant actions between advance calls; the
/// per-round advance only drives the countdown.
#[derive(Debug, Clone)]
pub struct Island {
    id: IslandId,
    tiles: Vec<Location>,
    team: Option<Team>,
    anchor: AnchorState,
}

impl Island {
    /// Create an unclaimed island over the given member tiles.
    #[must_use]
    pub const fn new(id: IslandId, tiles: Vec<Location>) -> Self {
        Self {
            id,
            tiles,
            team: None,
            anchor: AnchorState::Absent,
        }
    }

    /// This island's nonzero ID.
    #[must_use]
    pub const fn id(&self) -> IslandId {
        self.id
    }

    /// The island's member tiles, in discovery (row-major) order.
    #[must_use]
    pub fn tiles(&self) -> &[Location] {
        &self.tiles
    }

    /// The team currently holding the island, if any.
    #[must_use]
    pub const fn team(&self) -> Option<Team> {
        self.team
    }

    /// The anchor's current state.
    #[must_use]
    pub const fn anchor_state(&self) -> AnchorState {
        self.anchor
    }

    /// Plant an anchor for `team`, capturing the island.
    ///
    /// Restarts the stabilizing countdown. Returns the previous owner if its
    /// anchor was already accelerating, so the caller can retract that
    /// standing boost; it is re-applied when the new countdown finishes, even
    /// on a same-team replant.
    pub fn plant_anchor(&mut self, team: Team) -> Option<Team> {
        let displaced = match (self.team, self.anchor) {
            (Some(prev), AnchorState::Accelerating) => Some(prev),
            _ => None,
        };
        self.team = Some(team);
        self.anchor = AnchorState::Stabilizing {
            rounds_left: ANCHOR_STABILIZE_ROUNDS,
        };
        displaced
    }

    /// Per-round advance: tick the stabilizing countdown.
    ///
    /// Returns `true` exactly when the anchor transitions to accelerating,
    /// meaning its area boost must now be applied.
    pub const fn advance(&mut self) -> bool {
        if let AnchorState::Stabilizing { rounds_left } = self.anchor {
            let rounds_left = rounds_left - 1;
            if rounds_left == 0 {
                self.anchor = AnchorState::Accelerating;
                return true;
            }
            self.anchor = AnchorState::Stabilizing { rounds_left };
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn island() -> Island {
        Island::new(3, vec![Location::new(1, 1), Location::new(2, 1)])
    }

    #[test]
    fn test_anchor_countdown() {
        let mut island = island();
        assert_eq!(island.plant_anchor(Team::Sol), None);
        assert_eq!(island.team(), Some(Team::Sol));

        for _ in 0..ANCHOR_STABILIZE_ROUNDS - 1 {
            assert!(!island.advance());
        }
        assert!(island.advance());
        assert_eq!(island.anchor_state(), AnchorState::Accelerating);

        // No further transitions once accelerating
        assert!(!island.advance());
    }

    #[test]
    fn test_capture_displaces_accelerating_anchor() {
        let mut island = island();
        island.plant_anchor(Team::Sol);
        for _ in 0..ANCHOR_STABILIZE_ROUNDS {
            island.advance();
        }

        assert_eq!(island.plant_anchor(Team::Umbra), Some(Team::Sol));
        assert_eq!(island.team(), Some(Team::Umbra));
        assert_eq!(
            island.anchor_state(),
            AnchorState::Stabilizing {
                rounds_left: ANCHOR_STABILIZE_ROUNDS
            }
        );
    }

    #[test]
    fn test_recapture_before_acceleration_displaces_nothing() {
        let mut island = island();
        island.plant_anchor(Team::Sol);
        island.advance();
        assert_eq!(island.plant_anchor(Team::Umbra), None);
    }

    #[test]
    fn test_same_team_replant_displaces_own_boost() {
        let mut island = island();
        island.plant_anchor(Team::Sol);
        for _ in 0..ANCHOR_STABILIZE_ROUNDS {
            island.advance();
        }

        // The standing boost comes back when the new countdown finishes
        assert_eq!(island.plant_anchor(Team::Sol), Some(Team::Sol));
        assert_eq!(
            island.anchor_state(),
            AnchorState::Stabilizing {
                rounds_left: ANCHOR_STABILIZE_ROUNDS
            }
        );
    }
}
