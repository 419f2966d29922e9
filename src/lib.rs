// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Aether: a deterministic match engine for a two-team sky-island strategy
//! game.
//!
//! This crate owns the full simulation of one match: the grid world, robots,
//! economy, area control, and the round loop, designed for:
//! - Bit-exact deterministic replays from a map and seed
//! - Validated robot actions that can never corrupt world state
//! - A pluggable decision-procedure boundary
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │       Control Provider (host)       │
//! ├─────────────────────────────────────┤
//! │   Turn Contexts (validated actions) │
//! ├─────────────────────────────────────┤
//! │      World (round loop, state)      │
//! └─────────────────────────────────────┘
//! ```
//!
//! A host builds a [`game::GameMap`], wraps it in a [`game::World`], and
//! drives [`game::World::run_round`] with a [`control::ControlProvider`]
//! until it reports [`game::RoundState::Done`]. The accumulated
//! [`replay::Replay`] stream is the match's full observable record.

pub mod control;
pub mod error;
pub mod game;
pub mod replay;

pub use control::{ControlProvider, NullControlProvider, TurnOutcome};
pub use error::{ActionError, ActionResult, EngineError};

// Re-export key game types at crate root for convenience
pub use game::{
    Archetype, Direction, DominationFactor, GameMap, Location, MapInput, ResourceKind, RobotId,
    RoundState, Team, TurnContext, World,
};
