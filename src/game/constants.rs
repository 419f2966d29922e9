//! Tuning constants for the match engine.
//!
//! Everything here is a rule of the game, not a knob a host is expected to
//! turn. Cooldowns and multipliers are kept in integer units (tenths of a
//! round and hundredths of a multiplier) so round arithmetic stays exact.

/// Minimum allowed map width or height in tiles.
pub const MAP_MIN_DIMENSION: i32 = 20;

/// Maximum allowed map width or height in tiles.
pub const MAP_MAX_DIMENSION: i32 = 64;

/// Cooldown counter value below which an action or move is ready.
pub const COOLDOWN_LIMIT: u32 = 10;

/// Cooldown units removed from both counters at the start of each round.
pub const COOLDOWNS_PER_ROUND: u32 = 10;

/// Ore credited to each team per starting Bastion in the first round.
pub const INITIAL_ORE_AMOUNT: u32 = 200;

/// Mana credited to each team per starting Bastion in the first round.
pub const INITIAL_MANA_AMOUNT: u32 = 200;

/// Ore generated by every Bastion at the end of each round.
pub const PASSIVE_ORE_RATE: u32 = 2;

/// Mana generated by every Bastion at the end of each round.
pub const PASSIVE_MANA_RATE: u32 = 2;

/// Maximum resource units a Courier may draw from a well per action.
pub const WELL_COLLECT_RATE: u32 = 4;

/// Stock a well starts with, and the bound on its inventory.
pub const WELL_CAPACITY: u32 = 1_000;

/// Carrying capacity of a Courier, in resource units.
pub const COURIER_CAPACITY: u32 = 40;

/// Capacity weight of a held anchor.
pub const ANCHOR_WEIGHT: u32 = 40;

/// Ore cost for a Bastion to craft an anchor.
pub const ANCHOR_COST_ORE: u32 = 100;

/// Rounds between an anchor being planted and its boost taking effect.
pub const ANCHOR_STABILIZE_ROUNDS: u32 = 15;

/// Squared radius of a Booster's area effect.
pub const BOOST_RADIUS_SQUARED: i32 = 20;

/// Rounds a boost stack stays active, counted from the round it was added.
pub const BOOST_DURATION: u32 = 10;

/// Multiplier change per boost stack, in hundredths.
pub const BOOST_CENTI: i32 = -10;

/// Boost stacks on one tile beyond which the multiplier stops changing.
pub const MAX_BOOST_STACKS: usize = 2;

/// Squared radius of a Destabilizer's area effect.
pub const DEBUFF_RADIUS_SQUARED: i32 = 13;

/// Rounds a debuff stack stays active, counted from the round it was added.
pub const DEBUFF_DURATION: u32 = 5;

/// Multiplier change per debuff stack, in hundredths.
pub const DEBUFF_CENTI: i32 = 10;

/// Debuff stacks on one tile beyond which the multiplier stops changing.
pub const MAX_DEBUFF_STACKS: usize = 2;

/// Damage dealt when a debuff stack expires under a robot of the debuffed team.
pub const DEBUFF_DAMAGE: u32 = 5;

/// Multiplier change for an accelerating anchor's island tiles, in hundredths.
pub const ANCHOR_BOOST_CENTI: i32 = -15;

/// Anchor-boost stacks on one tile beyond which the multiplier stops changing.
pub const MAX_ANCHOR_STACKS: usize = 1;

/// Flat multiplier contribution of a cloud tile, in hundredths, both teams.
pub const CLOUD_CENTI: i32 = 20;

/// Base cooldown multiplier, in hundredths (1.00).
pub const MULTIPLIER_BASE_CENTI: i32 = 100;

/// Currents move occupying robots every this many rounds.
pub const CURRENT_PERIOD: u32 = 4;

/// Damage dealt by a Lancer's attack.
pub const LANCER_DAMAGE: u32 = 10;

/// Slots in each team's shared array.
pub const SHARED_ARRAY_LEN: usize = 64;

/// Indicator annotation slots per robot.
pub const NUM_INDICATORS: usize = 3;

/// Longest indicator string retained; longer strings are truncated.
pub const INDICATOR_MAX_LEN: usize = 64;
