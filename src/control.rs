//! The decision-procedure collaborator contract.
//!
//! The engine never inspects how decisions are computed; it calls
//! [`ControlProvider::run_robot`] once per robot per round and reads back an
//! outcome. Sandboxing, metering, and scheduling of the untrusted controller
//! code all live behind this trait.

use crate::game::{GameMap, RobotId, Team, TurnContext};

/// How a robot's turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The decision procedure ran to completion (or to its budget).
    Completed {
        /// Execution cost consumed, in the provider's own units.
        cost: u32,
    },
    /// The decision procedure terminated abnormally.
    ///
    /// The engine ends the turn and destroys the robot; the round continues
    /// with the next robot. There is no retry.
    Faulted,
}

/// Supplier of per-robot decision procedures, plus lifecycle notifications.
///
/// All notification hooks default to no-ops; only [`ControlProvider::run_robot`]
/// is mandatory.
pub trait ControlProvider {
    /// A match is starting on the given map.
    fn match_started(&mut self, map: &GameMap) {
        let _ = map;
    }

    /// A round is about to execute robot turns.
    fn round_started(&mut self, round: u32) {
        let _ = round;
    }

    /// Run one robot's turn through the given context.
    fn run_robot(&mut self, ctx: &mut TurnContext<'_>) -> TurnOutcome;

    /// A robot entered the world (initial placement or mid-match build).
    fn robot_spawned(&mut self, id: RobotId) {
        let _ = id;
    }

    /// A robot was destroyed.
    fn robot_killed(&mut self, id: RobotId) {
        let _ = id;
    }

    /// A round's end-phase has completed.
    fn round_ended(&mut self, round: u32) {
        let _ = round;
    }

    /// The match has been decided.
    fn match_ended(&mut self, winner: Team) {
        let _ = winner;
    }
}

/// A provider whose robots do nothing. Useful for tests and benchmarks.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullControlProvider;

impl ControlProvider for NullControlProvider {
    fn run_robot(&mut self, _ctx: &mut TurnContext<'_>) -> TurnOutcome {
        TurnOutcome::Completed { cost: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_outcome_debug() {
        let outcome = TurnOutcome::Completed { cost: 250 };
        let debug = format!("{outcome:?}");
        assert!(debug.contains("Completed"));
        assert!(debug.contains("250"));
    }
}
