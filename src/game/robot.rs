//! Robots: archetypes, inventories, and per-robot mutable state.

use serde::{Deserialize, Serialize};

use crate::game::constants::{
    ANCHOR_WEIGHT, COOLDOWN_LIMIT, COOLDOWNS_PER_ROUND, COURIER_CAPACITY, INDICATOR_MAX_LEN,
    LANCER_DAMAGE, NUM_INDICATORS,
};
use crate::game::geometry::Location;
use crate::game::team::{ResourceKind, Team};

/// Unique robot identifier. Never reused within a match.
pub type RobotId = u32;

/// The closed set of robot categories.
///
/// All per-archetype stats and capabilities are table lookups on this enum;
/// there is no subtype dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    /// Immobile structure. Builds robots, crafts anchors, generates income.
    Bastion,
    /// Hauler. Collects from wells, carries anchors, drain-attacks.
    Courier,
    /// Line combatant with a fixed-damage attack.
    Lancer,
    /// Support unit that stacks friendly cooldown boosts around itself.
    Booster,
    /// Support unit that stacks enemy cooldown debuffs around a target tile.
    Destabilizer,
}

/// Every archetype, in build-menu order.
pub const ARCHETYPES: [Archetype; 5] = [
    Archetype::Bastion,
    Archetype::Courier,
    Archetype::Lancer,
    Archetype::Booster,
    Archetype::Destabilizer,
];

impl Archetype {
    /// Maximum (and starting) health.
    #[must_use]
    pub const fn max_health(self) -> u32 {
        match self {
            Archetype::Bastion => 1000,
            Archetype::Courier => 150,
            Archetype::Lancer => 200,
            Archetype::Booster => 400,
            Archetype::Destabilizer => 300,
        }
    }

    /// Squared radius within which actions may target. Zero means self-only.
    #[must_use]
    pub const fn action_radius_squared(self) -> i32 {
        match self {
            Archetype::Bastion | Archetype::Courier => 9,
            Archetype::Lancer => 16,
            Archetype::Booster => 0,
            Archetype::Destabilizer => 13,
        }
    }

    /// Squared radius within which full robot details can be sensed.
    #[must_use]
    pub const fn vision_radius_squared(self) -> i32 {
        match self {
            Archetype::Bastion => 34,
            _ => 20,
        }
    }

    /// Squared radius within which occupancy (but no detail) can be detected.
    #[must_use]
    pub const fn detection_radius_squared(self) -> i32 {
        match self {
            Archetype::Bastion => 34,
            _ => 25,
        }
    }

    /// Base action cooldown added per action, in tenths of a round.
    #[must_use]
    pub const fn action_cooldown(self) -> u32 {
        match self {
            Archetype::Bastion | Archetype::Courier | Archetype::Lancer => 10,
            Archetype::Booster => 30,
            Archetype::Destabilizer => 35,
        }
    }

    /// Base movement cooldown added per move, in tenths of a round.
    #[must_use]
    pub const fn movement_cooldown(self) -> u32 {
        match self {
            Archetype::Bastion => 0,
            Archetype::Courier => 10,
            Archetype::Lancer => 15,
            Archetype::Booster | Archetype::Destabilizer => 25,
        }
    }

    /// Ceiling on the decision procedure's per-turn execution cost.
    #[must_use]
    pub const fn budget_limit(self) -> u32 {
        match self {
            Archetype::Bastion => 20_000,
            Archetype::Courier | Archetype::Lancer => 7_500,
            Archetype::Booster | Archetype::Destabilizer => 5_000,
        }
    }

    /// Inventory capacity. `None` is unbounded (structures).
    #[must_use]
    pub const fn capacity(self) -> Option<u32> {
        match self {
            Archetype::Bastion => None,
            Archetype::Courier => Some(COURIER_CAPACITY),
            _ => Some(0),
        }
    }

    /// Build cost, or `None` if this archetype cannot be built.
    #[must_use]
    pub const fn build_cost(self) -> Option<(ResourceKind, u32)> {
        match self {
            Archetype::Bastion => None,
            Archetype::Courier => Some((ResourceKind::Ore, 50)),
            Archetype::Lancer => Some((ResourceKind::Mana, 60)),
            Archetype::Booster => Some((ResourceKind::Elixir, 150)),
            Archetype::Destabilizer => Some((ResourceKind::Elixir, 200)),
        }
    }

    /// Whether this archetype can attack.
    #[must_use]
    pub const fn can_attack(self) -> bool {
        matches!(self, Archetype::Courier | Archetype::Lancer)
    }

    /// Whether this archetype can move (and be moved by currents).
    #[must_use]
    pub const fn can_move(self) -> bool {
        !matches!(self, Archetype::Bastion)
    }

    /// Whether this archetype can build robots and craft anchors.
    #[must_use]
    pub const fn can_build(self) -> bool {
        matches!(self, Archetype::Bastion)
    }

    /// Whether this archetype can collect from wells and carry anchors.
    #[must_use]
    pub const fn can_carry(self) -> bool {
        matches!(self, Archetype::Courier)
    }

    /// Whether this archetype can stack friendly boosts.
    #[must_use]
    pub const fn can_boost(self) -> bool {
        matches!(self, Archetype::Booster)
    }

    /// Whether this archetype can stack enemy debuffs.
    #[must_use]
    pub const fn can_destabilize(self) -> bool {
        matches!(self, Archetype::Destabilizer)
    }

    /// Damage dealt by an attack against a defender carrying the given total.
    ///
    /// The Courier's drain attack scales with the defender's cargo; the
    /// Lancer's does not. Non-attackers deal nothing.
    #[must_use]
    pub const fn attack_damage(self, defender_carried: u32) -> u32 {
        match self {
            Archetype::Lancer => LANCER_DAMAGE,
            Archetype::Courier => defender_carried,
            _ => 0,
        }
    }
}

/// A capacity-bounded store of resources plus at most one anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inventory {
    capacity: Option<u32>,
    amounts: [u32; 3],
    anchor: bool,
}

impl Inventory {
    /// Create an empty inventory. `None` capacity is unbounded.
    #[must_use]
    pub const fn new(capacity: Option<u32>) -> Self {
        Self {
            capacity,
            amounts: [0; 3],
            anchor: false,
        }
    }

    /// Current weighted load: resource total plus the anchor weight if held.
    #[must_use]
    pub const fn weight(&self) -> u32 {
        let resources = self.amounts[0] + self.amounts[1] + self.amounts[2];
        if self.anchor {
            resources + ANCHOR_WEIGHT
        } else {
            resources
        }
    }

    /// Whether adding `amount` more resource units fits under the capacity.
    #[must_use]
    pub const fn can_add(&self, amount: u32) -> bool {
        match self.capacity {
            None => true,
            Some(cap) => self.weight() + amount <= cap,
        }
    }

    /// Whether picking up an anchor fits under the capacity.
    #[must_use]
    pub const fn can_add_anchor(&self) -> bool {
        if self.anchor {
            return false;
        }
        match self.capacity {
            None => true,
            Some(cap) => self.weight() + ANCHOR_WEIGHT <= cap,
        }
    }

    /// Amount held of one resource.
    #[must_use]
    pub const fn amount(&self, kind: ResourceKind) -> u32 {
        self.amounts[kind.index()]
    }

    /// Total resource units held, ignoring any anchor.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.amounts[0] + self.amounts[1] + self.amounts[2]
    }

    /// Whether an anchor is held.
    #[must_use]
    pub const fn has_anchor(&self) -> bool {
        self.anchor
    }

    /// Add resources. Callers must check [`Inventory::can_add`] first.
    pub const fn add(&mut self, kind: ResourceKind, amount: u32) {
        self.amounts[kind.index()] += amount;
    }

    /// Remove resources if the held amount covers it.
    pub const fn try_remove(&mut self, kind: ResourceKind, amount: u32) -> bool {
        let idx = kind.index();
        if self.amounts[idx] < amount {
            return false;
        }
        self.amounts[idx] -= amount;
        true
    }

    /// Store an anchor. Returns `false` if one is already held or it won't fit.
    pub const fn give_anchor(&mut self) -> bool {
        if !self.can_add_anchor() {
            return false;
        }
        self.anchor = true;
        true
    }

    /// Remove the held anchor. Returns `false` if none is held.
    pub const fn take_anchor(&mut self) -> bool {
        if !self.anchor {
            return false;
        }
        self.anchor = false;
        true
    }

    /// Empty all resources, returning the total that was removed.
    pub const fn drain(&mut self) -> u32 {
        let total = self.total();
        self.amounts = [0; 3];
        total
    }
}

/// One indicator annotation slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorNote {
    /// The annotation text, truncated to [`INDICATOR_MAX_LEN`].
    pub text: String,
    /// The round in which the slot was last written.
    pub round: u32,
}

/// A robot's full mutable state.
///
/// Owned exclusively by the world container; robots reference each other only
/// by ID through it.
#[derive(Debug, Clone)]
pub struct Robot {
    id: RobotId,
    team: Team,
    archetype: Archetype,
    location: Location,
    health: u32,
    action_cooldown: u32,
    movement_cooldown: u32,
    inventory: Inventory,
    cost_used: u32,
    indicators: [Option<IndicatorNote>; NUM_INDICATORS],
}

impl Robot {
    /// Create a robot at full health with cold cooldowns.
    #[must_use]
    pub fn new(id: RobotId, team: Team, archetype: Archetype, location: Location) -> Self {
        Self {
            id,
            team,
            archetype,
            location,
            health: archetype.max_health(),
            action_cooldown: 0,
            movement_cooldown: 0,
            inventory: Inventory::new(archetype.capacity()),
            cost_used: 0,
            indicators: [const { None }; NUM_INDICATORS],
        }
    }

    /// This robot's ID.
    #[must_use]
    pub const fn id(&self) -> RobotId {
        self.id
    }

    /// This robot's team.
    #[must_use]
    pub const fn team(&self) -> Team {
        self.team
    }

    /// This robot's archetype.
    #[must_use]
    pub const fn archetype(&self) -> Archetype {
        self.archetype
    }

    /// Current tile location.
    #[must_use]
    pub const fn location(&self) -> Location {
        self.location
    }

    /// Current health.
    #[must_use]
    pub const fn health(&self) -> u32 {
        self.health
    }

    /// Current action cooldown counter, in tenths of a round.
    #[must_use]
    pub const fn action_cooldown(&self) -> u32 {
        self.action_cooldown
    }

    /// Current movement cooldown counter, in tenths of a round.
    #[must_use]
    pub const fn movement_cooldown(&self) -> u32 {
        self.movement_cooldown
    }

    /// Shared view of the inventory.
    #[must_use]
    pub const fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Mutable view of the inventory.
    pub const fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }

    /// Execution cost reported for this robot's most recent turn.
    #[must_use]
    pub const fn cost_used(&self) -> u32 {
        self.cost_used
    }

    /// Record the execution cost of the turn that just ended.
    pub const fn set_cost_used(&mut self, cost: u32) {
        self.cost_used = cost;
    }

    /// Whether the action cooldown permits acting.
    #[must_use]
    pub const fn action_ready(&self) -> bool {
        self.action_cooldown < COOLDOWN_LIMIT
    }

    /// Whether the movement cooldown permits moving.
    #[must_use]
    pub const fn movement_ready(&self) -> bool {
        self.movement_cooldown < COOLDOWN_LIMIT
    }

    /// Begin-of-round hook: both cooldown counters run down.
    pub const fn begin_round(&mut self) {
        self.action_cooldown = self.action_cooldown.saturating_sub(COOLDOWNS_PER_ROUND);
        self.movement_cooldown = self.movement_cooldown.saturating_sub(COOLDOWNS_PER_ROUND);
    }

    /// Add already-multiplier-scaled units to the action cooldown.
    pub const fn add_action_cooldown(&mut self, scaled: u32) {
        self.action_cooldown += scaled;
    }

    /// Add already-multiplier-scaled units to the movement cooldown.
    pub const fn add_movement_cooldown(&mut self, scaled: u32) {
        self.movement_cooldown += scaled;
    }

    /// Apply a signed health change, clamped to `[0, max_health]`.
    ///
    /// Death is signaled by the resulting health, not performed here; the
    /// container destroys robots whose health reaches zero.
    pub fn apply_health_delta(&mut self, delta: i32) {
        let next = i64::from(self.health) + i64::from(delta);
        let max = i64::from(self.archetype.max_health());
        self.health = u32::try_from(next.clamp(0, max)).unwrap_or(0);
    }

    /// Whether health has reached zero.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.health == 0
    }

    /// Relocate the robot. Occupancy bookkeeping is the container's job.
    pub(crate) const fn set_location(&mut self, loc: Location) {
        self.location = loc;
    }

    /// Write an indicator slot, truncating over-long text on a character
    /// boundary.
    ///
    /// Returns `false` if the slot index is out of bounds.
    pub fn set_indicator(&mut self, slot: usize, text: &str, round: u32) -> bool {
        let Some(entry) = self.indicators.get_mut(slot) else {
            return false;
        };
        let mut text = text.to_owned();
        if text.len() > INDICATOR_MAX_LEN {
            let mut cut = INDICATOR_MAX_LEN;
            while !text.is_char_boundary(cut) {
                cut -= 1;
            }
            text.truncate(cut);
        }
        *entry = Some(IndicatorNote { text, round });
        true
    }

    /// Read an indicator slot.
    #[must_use]
    pub fn indicator(&self, slot: usize) -> Option<&IndicatorNote> {
        self.indicators.get(slot).and_then(Option::as_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cooldown_readiness() {
        let mut robot = Robot::new(1, Team::Sol, Archetype::Lancer, Location::new(0, 0));
        assert!(robot.action_ready());

        robot.add_action_cooldown(25);
        assert!(!robot.action_ready());

        robot.begin_round();
        assert_eq!(robot.action_cooldown(), 15);
        assert!(!robot.action_ready());

        robot.begin_round();
        assert_eq!(robot.action_cooldown(), 5);
        assert!(robot.action_ready());

        robot.begin_round();
        assert_eq!(robot.action_cooldown(), 0);
    }

    #[test]
    fn test_health_clamps() {
        let mut robot = Robot::new(1, Team::Sol, Archetype::Courier, Location::new(0, 0));
        robot.apply_health_delta(-100);
        assert_eq!(robot.health(), 50);

        robot.apply_health_delta(500);
        assert_eq!(robot.health(), Archetype::Courier.max_health());

        robot.apply_health_delta(-1000);
        assert_eq!(robot.health(), 0);
        assert!(robot.is_dead());
    }

    #[test]
    fn test_inventory_capacity_with_anchor() {
        let mut inv = Inventory::new(Some(COURIER_CAPACITY));
        assert!(inv.give_anchor());
        // Anchor fills the whole Courier capacity
        assert_eq!(inv.weight(), ANCHOR_WEIGHT);
        assert!(!inv.can_add(1));
        assert!(inv.can_add(0));

        assert!(inv.take_anchor());
        assert!(inv.can_add(COURIER_CAPACITY));
        inv.add(ResourceKind::Mana, 40);
        assert!(!inv.can_add_anchor());
    }

    #[test]
    fn test_inventory_drain() {
        let mut inv = Inventory::new(None);
        inv.add(ResourceKind::Ore, 3);
        inv.add(ResourceKind::Elixir, 9);
        assert_eq!(inv.drain(), 12);
        assert_eq!(inv.total(), 0);
    }

    #[test]
    fn test_attack_damage_table() {
        assert_eq!(Archetype::Lancer.attack_damage(100), LANCER_DAMAGE);
        assert_eq!(Archetype::Courier.attack_damage(23), 23);
        assert_eq!(Archetype::Booster.attack_damage(23), 0);
    }

    #[test]
    fn test_build_costs_only_for_buildable() {
        assert!(Archetype::Bastion.build_cost().is_none());
        for archetype in ARCHETYPES {
            if archetype != Archetype::Bastion {
                assert!(archetype.build_cost().is_some());
            }
        }
    }

    #[test]
    fn test_indicator_slots() {
        let mut robot = Robot::new(1, Team::Umbra, Archetype::Booster, Location::new(2, 3));
        assert!(robot.set_indicator(0, "scouting", 4));
        assert!(!robot.set_indicator(NUM_INDICATORS, "bad", 4));
        let note = robot.indicator(0).unwrap();
        assert_eq!(note.text, "scouting");
        assert_eq!(note.round, 4);
        assert!(robot.indicator(1).is_none());
    }

    #[test]
    fn test_indicator_truncates_multibyte_text() {
        let mut robot = Robot::new(1, Team::Sol, Archetype::Courier, Location::new(0, 0));
        // 30 three-byte chars: byte 64 is mid-character
        let text = "\u{20AC}".repeat(30);
        assert!(robot.set_indicator(0, &text, 1));

        let note = robot.indicator(0).unwrap();
        assert_eq!(note.text.len(), 63);
        assert_eq!(note.text.chars().count(), 21);
        assert!(note.text.chars().all(|c| c == '\u{20AC}'));
    }
}
