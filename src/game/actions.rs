//! The validated action and sensing surface handed to decision procedures.
//!
//! A [`TurnContext`] borrows the world for exactly one robot's turn. Every
//! mutating action validates its preconditions and returns a typed
//! [`ActionError`] on failure; the `can_*` twins run the same checks without
//! mutating, so a careful controller never has to see an error at all.

use crate::error::{ActionError, ActionResult};
use crate::game::constants::{ANCHOR_COST_ORE, WELL_COLLECT_RATE};
use crate::game::geometry::{Direction, Location};
use crate::game::island::IslandId;
use crate::game::robot::{Archetype, Robot, RobotId};
use crate::game::team::{ResourceKind, Team};
use crate::game::world::World;
use crate::replay::Event;

/// A sensed snapshot of another robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RobotInfo {
    /// The robot's ID.
    pub id: RobotId,
    /// Its team.
    pub team: Team,
    /// Its archetype.
    pub archetype: Archetype,
    /// Where it stands.
    pub location: Location,
    /// Its current health.
    pub health: u32,
}

impl RobotInfo {
    fn of(robot: &Robot) -> Self {
        Self {
            id: robot.id(),
            team: robot.team(),
            archetype: robot.archetype(),
            location: robot.location(),
            health: robot.health(),
        }
    }
}

/// A sensed snapshot of a well.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WellInfo {
    /// The well's tile.
    pub location: Location,
    /// Its resource kind.
    pub kind: ResourceKind,
    /// Units left in stock.
    pub stock: u32,
}

/// One robot's window onto the world for the duration of its turn.
#[derive(Debug)]
pub struct TurnContext<'w> {
    world: &'w mut World,
    id: RobotId,
    team: Team,
    archetype: Archetype,
}

impl<'w> TurnContext<'w> {
    /// Open a context for a living robot. Callers guarantee the robot is
    /// registered when the turn starts.
    pub(crate) fn new(world: &'w mut World, id: RobotId) -> Self {
        let (team, archetype) = world
            .robot(id)
            .map_or((Team::Sol, Archetype::Bastion), |robot| {
                (robot.team(), robot.archetype())
            });
        Self {
            world,
            id,
            team,
            archetype,
        }
    }

    fn me(&self) -> ActionResult<&Robot> {
        self.world.robot(self.id).ok_or(ActionError::RobotDestroyed)
    }

    // ---- identity and self-queries ------------------------------------

    /// The acting robot's ID.
    #[must_use]
    pub const fn id(&self) -> RobotId {
        self.id
    }

    /// The acting robot's team.
    #[must_use]
    pub const fn team(&self) -> Team {
        self.team
    }

    /// The acting robot's archetype.
    #[must_use]
    pub const fn archetype(&self) -> Archetype {
        self.archetype
    }

    /// The per-turn execution budget for this archetype.
    #[must_use]
    pub const fn budget_limit(&self) -> u32 {
        self.archetype.budget_limit()
    }

    /// The current round number.
    #[must_use]
    pub fn round(&self) -> u32 {
        self.world.round()
    }

    /// Map width in tiles.
    #[must_use]
    pub fn map_width(&self) -> i32 {
        self.world.map().width()
    }

    /// Map height in tiles.
    #[must_use]
    pub fn map_height(&self) -> i32 {
        self.world.map().height()
    }

    /// Where the acting robot stands.
    ///
    /// # Errors
    ///
    /// Fails only if the robot destroyed itself earlier this turn.
    pub fn location(&self) -> ActionResult<Location> {
        Ok(self.me()?.location())
    }

    /// The acting robot's health.
    ///
    /// # Errors
    ///
    /// Fails only if the robot destroyed itself earlier this turn.
    pub fn health(&self) -> ActionResult<u32> {
        Ok(self.me()?.health())
    }

    /// The acting robot's action cooldown counter.
    ///
    /// # Errors
    ///
    /// Fails only if the robot destroyed itself earlier this turn.
    pub fn action_cooldown(&self) -> ActionResult<u32> {
        Ok(self.me()?.action_cooldown())
    }

    /// The acting robot's movement cooldown counter.
    ///
    /// # Errors
    ///
    /// Fails only if the robot destroyed itself earlier this turn.
    pub fn movement_cooldown(&self) -> ActionResult<u32> {
        Ok(self.me()?.movement_cooldown())
    }

    /// Whether the action cooldown permits acting this turn.
    #[must_use]
    pub fn action_ready(&self) -> bool {
        self.me().is_ok_and(Robot::action_ready)
    }

    /// Whether the movement cooldown permits moving this turn.
    #[must_use]
    pub fn movement_ready(&self) -> bool {
        self.me().is_ok_and(Robot::movement_ready)
    }

    /// Units of a resource the acting robot carries.
    ///
    /// # Errors
    ///
    /// Fails only if the robot destroyed itself earlier this turn.
    pub fn carried(&self, kind: ResourceKind) -> ActionResult<u32> {
        Ok(self.me()?.inventory().amount(kind))
    }

    /// Whether the acting robot holds an anchor.
    #[must_use]
    pub fn has_anchor(&self) -> bool {
        self.me().is_ok_and(|robot| robot.inventory().has_anchor())
    }

    // ---- sensing ------------------------------------------------------

    fn assert_on_map(&self, loc: Location) -> ActionResult<()> {
        if self.world.map().in_bounds(loc) {
            Ok(())
        } else {
            Err(ActionError::OffMap(loc))
        }
    }

    fn assert_can_sense(&self, loc: Location) -> ActionResult<()> {
        self.assert_on_map(loc)?;
        let here = self.me()?.location();
        if here.is_within_distance_squared(loc, self.archetype.vision_radius_squared()) {
            Ok(())
        } else {
            Err(ActionError::OutOfVision(loc))
        }
    }

    /// Whether a location is on the map and within vision range.
    #[must_use]
    pub fn can_sense_location(&self, loc: Location) -> bool {
        self.assert_can_sense(loc).is_ok()
    }

    /// The robot on a sensed tile, if any.
    ///
    /// # Errors
    ///
    /// Fails if the tile cannot be sensed.
    pub fn sense_robot_at(&self, loc: Location) -> ActionResult<Option<RobotInfo>> {
        self.assert_can_sense(loc)?;
        Ok(self
            .world
            .robot_at(loc)
            .and_then(|id| self.world.robot(id))
            .map(RobotInfo::of))
    }

    /// All other robots within a squared radius, capped at vision range.
    ///
    /// Results come back in robot-ID order.
    ///
    /// # Errors
    ///
    /// Fails only if the robot destroyed itself earlier this turn.
    pub fn sense_nearby_robots(&self, radius_squared: i32) -> ActionResult<Vec<RobotInfo>> {
        let here = self.me()?.location();
        let budget = radius_squared.min(self.archetype.vision_radius_squared());
        Ok(self
            .world
            .robots()
            .filter(|robot| robot.id() != self.id)
            .filter(|robot| here.is_within_distance_squared(robot.location(), budget))
            .map(RobotInfo::of)
            .collect())
    }

    /// Whether a sensed tile is passable.
    ///
    /// # Errors
    ///
    /// Fails if the tile cannot be sensed.
    pub fn sense_passability(&self, loc: Location) -> ActionResult<bool> {
        self.assert_can_sense(loc)?;
        let idx = self.world.map().index(loc).ok_or(ActionError::OffMap(loc))?;
        Ok(!self.world.map().is_wall(idx))
    }

    /// The island a sensed tile belongs to, if any.
    ///
    /// # Errors
    ///
    /// Fails if the tile cannot be sensed.
    pub fn sense_island(&self, loc: Location) -> ActionResult<Option<IslandId>> {
        self.assert_can_sense(loc)?;
        Ok(self.world.island_at(loc))
    }

    /// The well on a sensed tile, if any.
    ///
    /// # Errors
    ///
    /// Fails if the tile cannot be sensed.
    pub fn sense_well(&self, loc: Location) -> ActionResult<Option<WellInfo>> {
        self.assert_can_sense(loc)?;
        Ok(self.world.well_at(loc).map(|well| WellInfo {
            location: well.location(),
            kind: well.kind(),
            stock: well.stock(),
        }))
    }

    /// Whether a location is on the map and within detection range.
    #[must_use]
    pub fn can_detect_location(&self, loc: Location) -> bool {
        self.assert_on_map(loc).is_ok()
            && self.me().is_ok_and(|robot| {
                robot
                    .location()
                    .is_within_distance_squared(loc, self.archetype.detection_radius_squared())
            })
    }

    /// Whether a detected tile is occupied. Reveals nothing else.
    ///
    /// # Errors
    ///
    /// Fails if the tile is beyond detection range.
    pub fn detect_robot_at(&self, loc: Location) -> ActionResult<bool> {
        if !self.can_detect_location(loc) {
            return Err(ActionError::OutOfVision(loc));
        }
        Ok(self.world.robot_at(loc).is_some())
    }

    // ---- shared array and annotations ---------------------------------

    /// Read a slot of the team's shared array.
    ///
    /// # Errors
    ///
    /// Fails on an out-of-bounds index.
    pub fn read_shared(&self, index: usize) -> ActionResult<u16> {
        self.world
            .ledger(self.team)
            .read_shared(index)
            .ok_or(ActionError::InvalidSharedIndex(index))
    }

    /// Write a slot of the team's shared array.
    ///
    /// # Errors
    ///
    /// Fails on an out-of-bounds index.
    pub fn write_shared(&mut self, index: usize, value: u16) -> ActionResult<()> {
        if self.world.ledger_mut(self.team).write_shared(index, value) {
            Ok(())
        } else {
            Err(ActionError::InvalidSharedIndex(index))
        }
    }

    /// Update a debug annotation slot; the text lands in the replay stream.
    ///
    /// # Errors
    ///
    /// Fails on an out-of-bounds slot.
    pub fn set_indicator(&mut self, slot: usize, text: &str) -> ActionResult<()> {
        let round = self.world.round();
        let robot = self
            .world
            .robot_mut(self.id)
            .ok_or(ActionError::RobotDestroyed)?;
        if !robot.set_indicator(slot, text, round) {
            return Err(ActionError::InvalidIndicatorSlot(slot));
        }
        let text = robot
            .indicator(slot)
            .map_or_else(String::new, |note| note.text.clone());
        self.world.record(Event::Indicator {
            id: self.id,
            slot,
            text,
        });
        Ok(())
    }

    // ---- movement -----------------------------------------------------

    fn assert_can_move(&self, dir: Direction) -> ActionResult<Location> {
        let robot = self.me()?;
        if !self.archetype.can_move() {
            return Err(ActionError::WrongArchetype(self.archetype));
        }
        if !robot.movement_ready() {
            return Err(ActionError::NotReady {
                cooldown: robot.movement_cooldown(),
            });
        }
        let target = robot.location().add(dir);
        let idx = self
            .world
            .map()
            .index(target)
            .ok_or(ActionError::OffMap(target))?;
        if self.world.map().is_wall(idx) {
            return Err(ActionError::Impassable(target));
        }
        if self.world.robot_at(target).is_some() {
            return Err(ActionError::Occupied(target));
        }
        Ok(target)
    }

    /// Whether a step in the given direction would succeed.
    #[must_use]
    pub fn can_move(&self, dir: Direction) -> bool {
        self.assert_can_move(dir).is_ok()
    }

    /// Step one tile in the given direction.
    ///
    /// The movement cooldown is scaled by the multiplier at the *destination*
    /// tile.
    ///
    /// # Errors
    ///
    /// Fails per the movement preconditions; nothing mutates on failure.
    pub fn move_robot(&mut self, dir: Direction) -> ActionResult<()> {
        let target = self.assert_can_move(dir)?;
        self.world.relocate_robot(self.id, target);
        let scaled =
            self.world
                .scaled_cooldown_at(target, self.team, self.archetype.movement_cooldown());
        if let Some(robot) = self.world.robot_mut(self.id) {
            robot.add_movement_cooldown(scaled);
        }
        self.world.record(Event::Moved {
            id: self.id,
            loc: target,
        });
        Ok(())
    }

    // ---- action-gated operations --------------------------------------

    fn assert_action_ready(&self) -> ActionResult<()> {
        let robot = self.me()?;
        if robot.action_ready() {
            Ok(())
        } else {
            Err(ActionError::NotReady {
                cooldown: robot.action_cooldown(),
            })
        }
    }

    fn assert_in_action_range(&self, loc: Location) -> ActionResult<()> {
        self.assert_on_map(loc)?;
        let here = self.me()?.location();
        let budget = self.archetype.action_radius_squared();
        if here.is_within_distance_squared(loc, budget) {
            Ok(())
        } else {
            Err(ActionError::OutOfRange {
                loc,
                radius_squared: budget,
            })
        }
    }

    /// Charge the action cooldown, scaled at the robot's own tile.
    fn apply_action_cooldown(&mut self) {
        let Ok(here) = self.location() else {
            return;
        };
        let scaled =
            self.world
                .scaled_cooldown_at(here, self.team, self.archetype.action_cooldown());
        if let Some(robot) = self.world.robot_mut(self.id) {
            robot.add_action_cooldown(scaled);
        }
    }

    fn assert_can_attack(&self, loc: Location) -> ActionResult<RobotId> {
        if !self.archetype.can_attack() {
            return Err(ActionError::WrongArchetype(self.archetype));
        }
        self.assert_action_ready()?;
        self.assert_in_action_range(loc)?;
        let target = self.world.robot_at(loc).ok_or(ActionError::NoRobotAt(loc))?;
        let defender = self.world.robot(target).ok_or(ActionError::NoRobotAt(loc))?;
        if defender.team() == self.team {
            return Err(ActionError::TargetIsFriendly(loc));
        }
        Ok(target)
    }

    /// Whether attacking the given tile would succeed.
    #[must_use]
    pub fn can_attack(&self, loc: Location) -> bool {
        self.assert_can_attack(loc).is_ok()
    }

    /// Attack the enemy robot on a tile.
    ///
    /// A Lancer deals its fixed damage. A Courier's drain attack deals
    /// damage equal to the defender's carried-resource total and empties the
    /// defender's inventory. A defender brought to zero health is destroyed.
    ///
    /// # Errors
    ///
    /// Fails per the attack preconditions; nothing mutates on failure.
    pub fn attack(&mut self, loc: Location) -> ActionResult<()> {
        let target = self.assert_can_attack(loc)?;
        let carried = self
            .world
            .robot(target)
            .map_or(0, |defender| defender.inventory().total());
        let damage = self.archetype.attack_damage(carried);

        if let Some(defender) = self.world.robot_mut(target) {
            defender.apply_health_delta(-i32::try_from(damage).unwrap_or(i32::MAX));
            if self.archetype == Archetype::Courier {
                defender.inventory_mut().drain();
            }
        }
        self.apply_action_cooldown();
        self.world.record(Event::Attacked {
            id: self.id,
            target,
            damage,
        });
        if self.world.robot(target).is_some_and(Robot::is_dead) {
            self.world.destroy_robot(target);
        }
        Ok(())
    }

    fn assert_can_collect(&self, loc: Location, amount: u32) -> ActionResult<u32> {
        if !self.archetype.can_carry() {
            return Err(ActionError::WrongArchetype(self.archetype));
        }
        self.assert_action_ready()?;
        self.assert_in_action_range(loc)?;
        let well = self.world.well_at(loc).ok_or(ActionError::NotAWell(loc))?;
        let actual = amount.min(WELL_COLLECT_RATE).min(well.stock());
        if actual == 0 {
            return Err(ActionError::InsufficientResources {
                kind: well.kind(),
                needed: amount.min(WELL_COLLECT_RATE).max(1),
            });
        }
        if !self.me()?.inventory().can_add(actual) {
            return Err(ActionError::CapacityExceeded);
        }
        Ok(actual)
    }

    /// Whether collecting from the well at `loc` would succeed.
    #[must_use]
    pub fn can_collect(&self, loc: Location, amount: u32) -> bool {
        self.assert_can_collect(loc, amount).is_ok()
    }

    /// Draw resources from a well in action range.
    ///
    /// The amount is capped by the per-action collect rate and the well's
    /// remaining stock; the units actually drawn are returned.
    ///
    /// # Errors
    ///
    /// Fails per the collect preconditions; nothing mutates on failure.
    pub fn collect(&mut self, loc: Location, amount: u32) -> ActionResult<u32> {
        let actual = self.assert_can_collect(loc, amount)?;
        let Some(well) = self.world.well_at_mut(loc) else {
            return Err(ActionError::NotAWell(loc));
        };
        let kind = well.kind();
        if !well.try_draw(actual) {
            return Err(ActionError::InsufficientResources {
                kind,
                needed: actual,
            });
        }
        if let Some(robot) = self.world.robot_mut(self.id) {
            robot.inventory_mut().add(kind, actual);
        }
        self.apply_action_cooldown();
        self.world.record(Event::Collected {
            id: self.id,
            loc,
            kind,
            amount: actual,
        });
        Ok(actual)
    }

    fn assert_can_transfer(
        &self,
        loc: Location,
        kind: ResourceKind,
        amount: u32,
    ) -> ActionResult<RobotId> {
        if !self.archetype.can_carry() {
            return Err(ActionError::WrongArchetype(self.archetype));
        }
        self.assert_action_ready()?;
        self.assert_in_action_range(loc)?;
        let target_id = self.world.robot_at(loc).ok_or(ActionError::NoRobotAt(loc))?;
        let target = self
            .world
            .robot(target_id)
            .ok_or(ActionError::NoRobotAt(loc))?;
        if target.team() != self.team {
            return Err(ActionError::TargetNotFriendly(loc));
        }
        if target.archetype() != Archetype::Bastion {
            return Err(ActionError::WrongArchetype(target.archetype()));
        }
        if self.me()?.inventory().amount(kind) < amount {
            return Err(ActionError::InsufficientResources {
                kind,
                needed: amount,
            });
        }
        Ok(target_id)
    }

    /// Whether depositing at the Bastion on `loc` would succeed.
    #[must_use]
    pub fn can_transfer(&self, loc: Location, kind: ResourceKind, amount: u32) -> bool {
        self.assert_can_transfer(loc, kind, amount).is_ok()
    }

    /// Deposit carried resources at a friendly Bastion, crediting the
    /// team's ledger.
    ///
    /// # Errors
    ///
    /// Fails per the transfer preconditions; nothing mutates on failure.
    pub fn transfer(&mut self, loc: Location, kind: ResourceKind, amount: u32) -> ActionResult<()> {
        let target = self.assert_can_transfer(loc, kind, amount)?;
        let Some(robot) = self.world.robot_mut(self.id) else {
            return Err(ActionError::RobotDestroyed);
        };
        if !robot.inventory_mut().try_remove(kind, amount) {
            return Err(ActionError::InsufficientResources {
                kind,
                needed: amount,
            });
        }
        if let Some(bastion) = self.world.robot_mut(target) {
            bastion.inventory_mut().add(kind, amount);
        }
        self.world.ledger_mut(self.team).add(kind, amount);
        self.apply_action_cooldown();
        self.world.record(Event::Transferred {
            id: self.id,
            target,
            kind,
            amount,
        });
        Ok(())
    }

    fn assert_can_build(&self, archetype: Archetype, loc: Location) -> ActionResult<(ResourceKind, u32)> {
        if !self.archetype.can_build() {
            return Err(ActionError::WrongArchetype(self.archetype));
        }
        let (kind, cost) = archetype
            .build_cost()
            .ok_or(ActionError::WrongArchetype(archetype))?;
        self.assert_action_ready()?;
        self.assert_in_action_range(loc)?;
        let idx = self.world.map().index(loc).ok_or(ActionError::OffMap(loc))?;
        if self.world.map().is_wall(idx) {
            return Err(ActionError::Impassable(loc));
        }
        if self.world.robot_at(loc).is_some() {
            return Err(ActionError::Occupied(loc));
        }
        if self.world.ledger(self.team).balance(kind) < cost {
            return Err(ActionError::InsufficientResources { kind, needed: cost });
        }
        Ok((kind, cost))
    }

    /// Whether building the given archetype at `loc` would succeed.
    #[must_use]
    pub fn can_build(&self, archetype: Archetype, loc: Location) -> bool {
        self.assert_can_build(archetype, loc).is_ok()
    }

    /// Build a robot on an empty passable tile in action range, spending
    /// from the team ledger.
    ///
    /// The new robot takes its first turn next round.
    ///
    /// # Errors
    ///
    /// Fails per the build preconditions; nothing mutates on failure.
    pub fn build(&mut self, archetype: Archetype, loc: Location) -> ActionResult<RobotId> {
        let (kind, cost) = self.assert_can_build(archetype, loc)?;
        if !self.world.ledger_mut(self.team).try_spend(kind, cost) {
            return Err(ActionError::InsufficientResources { kind, needed: cost });
        }
        let built = self
            .world
            .spawn_robot(self.team, archetype, loc)
            .map_err(|_| ActionError::Occupied(loc))?;
        self.apply_action_cooldown();
        self.world.record(Event::Built {
            id: self.id,
            built,
        });
        Ok(built)
    }

    fn assert_can_craft_anchor(&self) -> ActionResult<()> {
        if !self.archetype.can_build() {
            return Err(ActionError::WrongArchetype(self.archetype));
        }
        self.assert_action_ready()?;
        if self.me()?.inventory().has_anchor() {
            return Err(ActionError::AlreadyHasAnchor);
        }
        if self.world.ledger(self.team).balance(ResourceKind::Ore) < ANCHOR_COST_ORE {
            return Err(ActionError::InsufficientResources {
                kind: ResourceKind::Ore,
                needed: ANCHOR_COST_ORE,
            });
        }
        Ok(())
    }

    /// Whether crafting an anchor would succeed.
    #[must_use]
    pub fn can_craft_anchor(&self) -> bool {
        self.assert_can_craft_anchor().is_ok()
    }

    /// Craft an anchor at this Bastion, spending Ore from the team ledger.
    ///
    /// A Bastion stores one anchor at a time.
    ///
    /// # Errors
    ///
    /// Fails per the craft preconditions; nothing mutates on failure.
    pub fn craft_anchor(&mut self) -> ActionResult<()> {
        self.assert_can_craft_anchor()?;
        if !self
            .world
            .ledger_mut(self.team)
            .try_spend(ResourceKind::Ore, ANCHOR_COST_ORE)
        {
            return Err(ActionError::InsufficientResources {
                kind: ResourceKind::Ore,
                needed: ANCHOR_COST_ORE,
            });
        }
        if let Some(robot) = self.world.robot_mut(self.id) {
            robot.inventory_mut().give_anchor();
        }
        self.apply_action_cooldown();
        self.world.record(Event::AnchorCrafted { id: self.id });
        Ok(())
    }

    fn assert_can_take_anchor(&self, loc: Location) -> ActionResult<RobotId> {
        if !self.archetype.can_carry() {
            return Err(ActionError::WrongArchetype(self.archetype));
        }
        self.assert_action_ready()?;
        self.assert_in_action_range(loc)?;
        let source_id = self.world.robot_at(loc).ok_or(ActionError::NoRobotAt(loc))?;
        let source = self
            .world
            .robot(source_id)
            .ok_or(ActionError::NoRobotAt(loc))?;
        if source.team() != self.team {
            return Err(ActionError::TargetNotFriendly(loc));
        }
        if source.archetype() != Archetype::Bastion {
            return Err(ActionError::WrongArchetype(source.archetype()));
        }
        if !source.inventory().has_anchor() {
            return Err(ActionError::NoAnchor);
        }
        if !self.me()?.inventory().can_add_anchor() {
            if self.me()?.inventory().has_anchor() {
                return Err(ActionError::AlreadyHasAnchor);
            }
            return Err(ActionError::CapacityExceeded);
        }
        Ok(source_id)
    }

    /// Whether taking an anchor from the Bastion on `loc` would succeed.
    #[must_use]
    pub fn can_take_anchor(&self, loc: Location) -> bool {
        self.assert_can_take_anchor(loc).is_ok()
    }

    /// Pick an anchor up from a friendly Bastion in action range.
    ///
    /// # Errors
    ///
    /// Fails per the take preconditions; nothing mutates on failure.
    pub fn take_anchor(&mut self, loc: Location) -> ActionResult<()> {
        let source = self.assert_can_take_anchor(loc)?;
        if let Some(bastion) = self.world.robot_mut(source) {
            bastion.inventory_mut().take_anchor();
        }
        if let Some(robot) = self.world.robot_mut(self.id) {
            robot.inventory_mut().give_anchor();
        }
        self.apply_action_cooldown();
        self.world.record(Event::AnchorTaken {
            id: self.id,
            from: source,
        });
        Ok(())
    }

    fn assert_can_plant_anchor(&self) -> ActionResult<IslandId> {
        if !self.archetype.can_carry() {
            return Err(ActionError::WrongArchetype(self.archetype));
        }
        self.assert_action_ready()?;
        let robot = self.me()?;
        if !robot.inventory().has_anchor() {
            return Err(ActionError::NoAnchor);
        }
        let here = robot.location();
        self.world
            .island_at(here)
            .ok_or(ActionError::NotAnIsland(here))
    }

    /// Whether planting the held anchor here would succeed.
    #[must_use]
    pub fn can_plant_anchor(&self) -> bool {
        self.assert_can_plant_anchor().is_ok()
    }

    /// Plant the held anchor on the island underfoot, capturing it.
    ///
    /// # Errors
    ///
    /// Fails per the plant preconditions; nothing mutates on failure.
    pub fn plant_anchor(&mut self) -> ActionResult<IslandId> {
        let island = self.assert_can_plant_anchor()?;
        if let Some(robot) = self.world.robot_mut(self.id) {
            robot.inventory_mut().take_anchor();
        }
        self.world.plant_anchor_at(island, self.team);
        self.apply_action_cooldown();
        self.world.record(Event::AnchorPlanted {
            id: self.id,
            island,
        });
        Ok(island)
    }

    fn assert_can_boost(&self) -> ActionResult<()> {
        if !self.archetype.can_boost() {
            return Err(ActionError::WrongArchetype(self.archetype));
        }
        self.assert_action_ready()
    }

    /// Whether boosting would succeed.
    #[must_use]
    pub fn can_boost(&self) -> bool {
        self.assert_can_boost().is_ok()
    }

    /// Stack a cooldown boost for the team on every tile around the robot.
    ///
    /// # Errors
    ///
    /// Fails per the boost preconditions; nothing mutates on failure.
    pub fn boost(&mut self) -> ActionResult<()> {
        self.assert_can_boost()?;
        let here = self.location()?;
        self.world.add_boost(here, self.team);
        self.apply_action_cooldown();
        self.world.record(Event::Boosted {
            id: self.id,
            loc: here,
        });
        Ok(())
    }

    fn assert_can_destabilize(&self, loc: Location) -> ActionResult<()> {
        if !self.archetype.can_destabilize() {
            return Err(ActionError::WrongArchetype(self.archetype));
        }
        self.assert_action_ready()?;
        self.assert_in_action_range(loc)
    }

    /// Whether destabilizing around `loc` would succeed.
    #[must_use]
    pub fn can_destabilize(&self, loc: Location) -> bool {
        self.assert_can_destabilize(loc).is_ok()
    }

    /// Stack a cooldown debuff against the enemy on every tile around a
    /// target tile in action range.
    ///
    /// # Errors
    ///
    /// Fails per the destabilize preconditions; nothing mutates on failure.
    pub fn destabilize(&mut self, loc: Location) -> ActionResult<()> {
        self.assert_can_destabilize(loc)?;
        self.world.add_debuff(loc, self.team);
        self.apply_action_cooldown();
        self.world.record(Event::Destabilized {
            id: self.id,
            loc,
        });
        Ok(())
    }

    // ---- endings ------------------------------------------------------

    /// Destroy the acting robot immediately.
    ///
    /// Subsequent calls on this context fail with
    /// [`ActionError::RobotDestroyed`]; the turn should end.
    pub fn disintegrate(&mut self) {
        self.world.destroy_robot(self.id);
    }

    /// Destroy every robot on the acting robot's team, ending its game.
    pub fn resign(&mut self) {
        let doomed: Vec<RobotId> = self
            .world
            .robots()
            .filter(|robot| robot.team() == self.team)
            .map(Robot::id)
            .collect();
        for id in doomed {
            self.world.destroy_robot(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::constants::{ANCHOR_COST_ORE, COURIER_CAPACITY};
    use crate::game::map::{GameMap, MapInput, MapSymmetry, RobotPlacement};

    fn world_with(tweak: impl FnOnce(&mut MapInput)) -> World {
        let size = 20 * 20;
        let mut input = MapInput {
            width: 20,
            height: 20,
            origin: Location::new(0, 0),
            seed: 3,
            round_limit: 100,
            symmetry: MapSymmetry::Rotational,
            walls: vec![false; size],
            clouds: vec![false; size],
            currents: vec![Direction::Center; size],
            islands: vec![0; size],
            resources: vec![None; size],
            placements: vec![
                RobotPlacement {
                    id: 1,
                    archetype: Archetype::Bastion,
                    location: Location::new(1, 1),
                    team: Team::Sol,
                },
                RobotPlacement {
                    id: 2,
                    archetype: Archetype::Bastion,
                    location: Location::new(18, 18),
                    team: Team::Umbra,
                },
            ],
        };
        tweak(&mut input);
        World::new(GameMap::new(input).unwrap()).unwrap()
    }

    fn idx(x: i32, y: i32) -> usize {
        usize::try_from(x + y * 20).unwrap()
    }

    #[test]
    fn test_move_updates_occupancy_and_cooldown() {
        let mut world = world_with(|_| {});
        let id = world
            .spawn_robot(Team::Sol, Archetype::Lancer, Location::new(5, 5))
            .unwrap();

        let mut ctx = TurnContext::new(&mut world, id);
        assert!(ctx.can_move(Direction::East));
        ctx.move_robot(Direction::East).unwrap();
        assert_eq!(ctx.location().unwrap(), Location::new(6, 5));
        assert_eq!(ctx.movement_cooldown().unwrap(), 15);
        assert!(!ctx.movement_ready());
        drop(ctx);

        assert_eq!(world.robot_at(Location::new(6, 5)), Some(id));
        assert_eq!(world.robot_at(Location::new(5, 5)), None);
    }

    #[test]
    fn test_move_into_occupied_tile_rejected() {
        let mut world = world_with(|_| {});
        let mover = world
            .spawn_robot(Team::Sol, Archetype::Courier, Location::new(5, 5))
            .unwrap();
        world
            .spawn_robot(Team::Sol, Archetype::Courier, Location::new(6, 5))
            .unwrap();

        let mut ctx = TurnContext::new(&mut world, mover);
        assert_eq!(
            ctx.move_robot(Direction::East),
            Err(ActionError::Occupied(Location::new(6, 5)))
        );
        // Nothing mutated on the failed attempt
        assert_eq!(ctx.location().unwrap(), Location::new(5, 5));
        assert_eq!(ctx.movement_cooldown().unwrap(), 0);
    }

    #[test]
    fn test_lancer_attack_deals_fixed_damage() {
        let mut world = world_with(|_| {});
        let lancer = world
            .spawn_robot(Team::Sol, Archetype::Lancer, Location::new(5, 5))
            .unwrap();
        let victim = world
            .spawn_robot(Team::Umbra, Archetype::Courier, Location::new(5, 6))
            .unwrap();

        let mut ctx = TurnContext::new(&mut world, lancer);
        ctx.attack(Location::new(5, 6)).unwrap();
        assert!(!ctx.action_ready());
        // A second attack this round is rejected
        assert!(matches!(
            ctx.attack(Location::new(5, 6)),
            Err(ActionError::NotReady { .. })
        ));
        drop(ctx);

        let health = world.robot(victim).unwrap().health();
        assert_eq!(health, Archetype::Courier.max_health() - 10);
    }

    #[test]
    fn test_attack_rejects_friendly_and_empty_targets() {
        let mut world = world_with(|_| {});
        let lancer = world
            .spawn_robot(Team::Sol, Archetype::Lancer, Location::new(5, 5))
            .unwrap();
        world
            .spawn_robot(Team::Sol, Archetype::Courier, Location::new(5, 6))
            .unwrap();

        let mut ctx = TurnContext::new(&mut world, lancer);
        assert_eq!(
            ctx.attack(Location::new(5, 6)),
            Err(ActionError::TargetIsFriendly(Location::new(5, 6)))
        );
        assert_eq!(
            ctx.attack(Location::new(6, 5)),
            Err(ActionError::NoRobotAt(Location::new(6, 5)))
        );
        assert!(matches!(
            ctx.attack(Location::new(15, 15)),
            Err(ActionError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_courier_drain_attack_scales_with_cargo() {
        let mut world = world_with(|_| {});
        let attacker = world
            .spawn_robot(Team::Sol, Archetype::Courier, Location::new(5, 5))
            .unwrap();
        let victim = world
            .spawn_robot(Team::Umbra, Archetype::Courier, Location::new(5, 6))
            .unwrap();
        world
            .robot_mut(victim)
            .unwrap()
            .inventory_mut()
            .add(ResourceKind::Mana, 25);

        let mut ctx = TurnContext::new(&mut world, attacker);
        ctx.attack(Location::new(5, 6)).unwrap();
        drop(ctx);

        let victim = world.robot(victim).unwrap();
        assert_eq!(victim.health(), Archetype::Courier.max_health() - 25);
        assert_eq!(victim.inventory().total(), 0);
    }

    #[test]
    fn test_collect_caps_at_rate_and_capacity() {
        let mut world = world_with(|input| {
            input.resources[idx(5, 6)] = Some(ResourceKind::Ore);
        });
        let courier = world
            .spawn_robot(Team::Sol, Archetype::Courier, Location::new(5, 5))
            .unwrap();

        let mut ctx = TurnContext::new(&mut world, courier);
        assert!(ctx.can_collect(Location::new(5, 6), 10));
        assert_eq!(ctx.collect(Location::new(5, 6), 10).unwrap(), WELL_COLLECT_RATE);
        assert_eq!(ctx.carried(ResourceKind::Ore).unwrap(), WELL_COLLECT_RATE);
        drop(ctx);

        let well = world.well_at(Location::new(5, 6)).unwrap();
        assert_eq!(
            well.stock(),
            crate::game::constants::WELL_CAPACITY - WELL_COLLECT_RATE
        );

        // A full inventory refuses further draws
        world
            .robot_mut(courier)
            .unwrap()
            .inventory_mut()
            .add(ResourceKind::Ore, COURIER_CAPACITY - WELL_COLLECT_RATE);
        world.robot_mut(courier).unwrap().begin_round();
        let ctx = TurnContext::new(&mut world, courier);
        assert!(!ctx.can_collect(Location::new(5, 6), 1));
    }

    #[test]
    fn test_transfer_credits_team_ledger() {
        let mut world = world_with(|_| {});
        let courier = world
            .spawn_robot(Team::Sol, Archetype::Courier, Location::new(2, 1))
            .unwrap();
        world
            .robot_mut(courier)
            .unwrap()
            .inventory_mut()
            .add(ResourceKind::Ore, 30);

        let mut ctx = TurnContext::new(&mut world, courier);
        ctx.transfer(Location::new(1, 1), ResourceKind::Ore, 30)
            .unwrap();
        assert_eq!(ctx.carried(ResourceKind::Ore).unwrap(), 0);
        drop(ctx);

        assert_eq!(world.ledger(Team::Sol).balance(ResourceKind::Ore), 30);
    }

    #[test]
    fn test_transfer_to_enemy_bastion_rejected() {
        let mut world = world_with(|_| {});
        let courier = world
            .spawn_robot(Team::Sol, Archetype::Courier, Location::new(17, 18))
            .unwrap();
        world
            .robot_mut(courier)
            .unwrap()
            .inventory_mut()
            .add(ResourceKind::Ore, 5);

        let mut ctx = TurnContext::new(&mut world, courier);
        assert_eq!(
            ctx.transfer(Location::new(18, 18), ResourceKind::Ore, 5),
            Err(ActionError::TargetNotFriendly(Location::new(18, 18)))
        );
    }

    #[test]
    fn test_build_spends_and_spawns() {
        let mut world = world_with(|_| {});
        world.ledger_mut(Team::Sol).add(ResourceKind::Ore, 100);

        let mut ctx = TurnContext::new(&mut world, 1);
        assert!(ctx.can_build(Archetype::Courier, Location::new(2, 2)));
        let built = ctx.build(Archetype::Courier, Location::new(2, 2)).unwrap();
        drop(ctx);

        assert_eq!(world.ledger(Team::Sol).balance(ResourceKind::Ore), 50);
        let robot = world.robot(built).unwrap();
        assert_eq!(robot.archetype(), Archetype::Courier);
        assert_eq!(robot.location(), Location::new(2, 2));

        // Too poor for another one plus its cost
        world.robot_mut(1).unwrap().begin_round();
        let mut ctx = TurnContext::new(&mut world, 1);
        assert_eq!(
            ctx.build(Archetype::Lancer, Location::new(3, 3)),
            Err(ActionError::InsufficientResources {
                kind: ResourceKind::Mana,
                needed: 60,
            })
        );
    }

    #[test]
    fn test_anchor_craft_take_plant_flow() {
        let mut world = world_with(|input| {
            input.islands[idx(5, 5)] = 3;
            input.islands[idx(6, 5)] = 3;
        });
        world
            .ledger_mut(Team::Sol)
            .add(ResourceKind::Ore, ANCHOR_COST_ORE);
        let courier = world
            .spawn_robot(Team::Sol, Archetype::Courier, Location::new(2, 1))
            .unwrap();

        let mut ctx = TurnContext::new(&mut world, 1);
        ctx.craft_anchor().unwrap();
        assert!(ctx.has_anchor());
        drop(ctx);

        // Only one anchor fits, even with the cooldown run down
        world
            .ledger_mut(Team::Sol)
            .add(ResourceKind::Ore, ANCHOR_COST_ORE);
        world.robot_mut(1).unwrap().begin_round();
        let mut ctx = TurnContext::new(&mut world, 1);
        assert_eq!(ctx.craft_anchor(), Err(ActionError::AlreadyHasAnchor));
        drop(ctx);

        let mut ctx = TurnContext::new(&mut world, courier);
        ctx.take_anchor(Location::new(1, 1)).unwrap();
        assert!(ctx.has_anchor());
        drop(ctx);

        // Not standing on an island yet
        world.robot_mut(courier).unwrap().begin_round();
        let mut ctx = TurnContext::new(&mut world, courier);
        assert_eq!(
            ctx.plant_anchor(),
            Err(ActionError::NotAnIsland(Location::new(2, 1)))
        );
        drop(ctx);

        world.relocate_robot(courier, Location::new(5, 5));
        let mut ctx = TurnContext::new(&mut world, courier);
        assert_eq!(ctx.plant_anchor().unwrap(), 3);
        assert!(!ctx.has_anchor());
        drop(ctx);

        assert_eq!(world.island(3).unwrap().team(), Some(Team::Sol));
        assert_eq!(world.ledger(Team::Sol).anchors_planted(), 1);
    }

    #[test]
    fn test_boost_lowers_own_multiplier() {
        let mut world = world_with(|_| {});
        let booster = world
            .spawn_robot(Team::Sol, Archetype::Booster, Location::new(10, 10))
            .unwrap();

        let mut ctx = TurnContext::new(&mut world, booster);
        ctx.boost().unwrap();
        drop(ctx);

        let center = Location::new(10, 10);
        assert_eq!(world.cooldown_multiplier_centi(center, Team::Sol), Some(90));
        assert_eq!(
            world.cooldown_multiplier_centi(center, Team::Umbra),
            Some(100)
        );
    }

    #[test]
    fn test_destabilize_raises_enemy_multiplier() {
        let mut world = world_with(|_| {});
        let destabilizer = world
            .spawn_robot(Team::Umbra, Archetype::Destabilizer, Location::new(10, 10))
            .unwrap();

        let mut ctx = TurnContext::new(&mut world, destabilizer);
        ctx.destabilize(Location::new(12, 10)).unwrap();
        drop(ctx);

        let center = Location::new(12, 10);
        assert_eq!(world.cooldown_multiplier_centi(center, Team::Sol), Some(110));
        assert_eq!(
            world.cooldown_multiplier_centi(center, Team::Umbra),
            Some(100)
        );
    }

    #[test]
    fn test_wrong_archetype_rejections() {
        let mut world = world_with(|_| {});
        let lancer = world
            .spawn_robot(Team::Sol, Archetype::Lancer, Location::new(5, 5))
            .unwrap();

        let mut ctx = TurnContext::new(&mut world, lancer);
        assert!(matches!(
            ctx.collect(Location::new(5, 6), 4),
            Err(ActionError::WrongArchetype(Archetype::Lancer))
        ));
        assert!(matches!(
            ctx.boost(),
            Err(ActionError::WrongArchetype(Archetype::Lancer))
        ));
        assert!(matches!(
            ctx.build(Archetype::Courier, Location::new(6, 5)),
            Err(ActionError::WrongArchetype(Archetype::Lancer))
        ));
    }

    #[test]
    fn test_sensing_respects_vision_radius() {
        let mut world = world_with(|_| {});
        let lancer = world
            .spawn_robot(Team::Sol, Archetype::Lancer, Location::new(5, 5))
            .unwrap();
        let near = world
            .spawn_robot(Team::Umbra, Archetype::Courier, Location::new(7, 5))
            .unwrap();
        world
            .spawn_robot(Team::Umbra, Archetype::Courier, Location::new(15, 15))
            .unwrap();

        let ctx = TurnContext::new(&mut world, lancer);
        let seen = ctx.sense_robot_at(Location::new(7, 5)).unwrap().unwrap();
        assert_eq!(seen.id, near);
        assert_eq!(seen.team, Team::Umbra);

        assert_eq!(
            ctx.sense_robot_at(Location::new(15, 15)),
            Err(ActionError::OutOfVision(Location::new(15, 15)))
        );

        let nearby = ctx.sense_nearby_robots(i32::MAX).unwrap();
        assert_eq!(nearby.len(), 1);
        assert_eq!(nearby[0].id, near);
    }

    #[test]
    fn test_detection_sees_occupancy_beyond_vision() {
        let mut world = world_with(|_| {});
        let lancer = world
            .spawn_robot(Team::Sol, Archetype::Lancer, Location::new(5, 5))
            .unwrap();
        world
            .spawn_robot(Team::Umbra, Archetype::Courier, Location::new(10, 5))
            .unwrap();

        let ctx = TurnContext::new(&mut world, lancer);
        // Distance 25: beyond vision (20), at the detection edge
        assert!(!ctx.can_sense_location(Location::new(10, 5)));
        assert!(ctx.detect_robot_at(Location::new(10, 5)).unwrap());
        assert!(!ctx.detect_robot_at(Location::new(9, 5)).unwrap());
    }

    #[test]
    fn test_shared_array_round_trips() {
        let mut world = world_with(|_| {});
        let mut ctx = TurnContext::new(&mut world, 1);
        ctx.write_shared(5, 999).unwrap();
        assert_eq!(ctx.read_shared(5).unwrap(), 999);
        assert_eq!(
            ctx.write_shared(crate::game::constants::SHARED_ARRAY_LEN, 1),
            Err(ActionError::InvalidSharedIndex(
                crate::game::constants::SHARED_ARRAY_LEN
            ))
        );
    }

    #[test]
    fn test_disintegrate_poisons_the_context() {
        let mut world = world_with(|_| {});
        let courier = world
            .spawn_robot(Team::Sol, Archetype::Courier, Location::new(5, 5))
            .unwrap();

        let mut ctx = TurnContext::new(&mut world, courier);
        ctx.disintegrate();
        assert_eq!(ctx.location(), Err(ActionError::RobotDestroyed));
        assert_eq!(ctx.move_robot(Direction::East), Err(ActionError::RobotDestroyed));
        drop(ctx);

        assert!(world.robot(courier).is_none());
        assert_eq!(world.robot_at(Location::new(5, 5)), None);
    }

    #[test]
    fn test_resign_destroys_whole_team() {
        let mut world = world_with(|_| {});
        let sol_courier = world
            .spawn_robot(Team::Sol, Archetype::Courier, Location::new(5, 5))
            .unwrap();

        let mut ctx = TurnContext::new(&mut world, sol_courier);
        ctx.resign();
        drop(ctx);

        assert!(world.robot(1).is_none());
        assert!(world.robot(sol_courier).is_none());
        // The other team is untouched
        assert!(world.robot(2).is_some());
    }
}
