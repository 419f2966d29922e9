//! The world state container and round loop.
//!
//! `World` is the single ownership root for all mutable match state: the
//! robot registry, the occupancy grid, islands, wells, the stacking field,
//! and the team ledgers. Subsystems reference each other only by ID or tile
//! index through it. An external driver repeatedly calls
//! [`World::run_round`]; everything else happens as a side effect.

use std::collections::BTreeMap;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::control::{ControlProvider, TurnOutcome};
use crate::error::EngineError;
use crate::game::actions::TurnContext;
use crate::game::constants::{
    BOOST_DURATION, BOOST_RADIUS_SQUARED, CURRENT_PERIOD, DEBUFF_DAMAGE, DEBUFF_DURATION,
    DEBUFF_RADIUS_SQUARED, INITIAL_MANA_AMOUNT, INITIAL_ORE_AMOUNT, PASSIVE_MANA_RATE,
    PASSIVE_ORE_RATE,
};
use crate::game::currents::{CurrentClaim, plan_forced_moves};
use crate::game::effects::{EffectField, EffectKind};
use crate::game::geometry::Location;
use crate::game::island::{Island, IslandId};
use crate::game::map::GameMap;
use crate::game::robot::{Archetype, Robot, RobotId};
use crate::game::team::{ResourceKind, Team, TeamLedger};
use crate::game::well::Well;
use crate::replay::{Event, Replay};

/// Whether the match is still in progress after a round call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundState {
    /// The match continues; call again.
    Running,
    /// The match is decided (or torn down); further calls are no-ops.
    Done,
}

/// The criterion that decided the match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DominationFactor {
    /// More islands held at the round limit.
    MoreIslands,
    /// More anchors planted over the match.
    MoreAnchorsPlanted,
    /// Greater net Elixir across ledger and living robots.
    MoreElixir,
    /// Greater net Mana across ledger and living robots.
    MoreMana,
    /// Greater net Ore across ledger and living robots.
    MoreOre,
    /// Dead tie; the seeded coin decided.
    CoinFlip,
}

/// A lifecycle notification queued for the control provider.
///
/// The provider cannot be re-entered while a robot's turn holds the world,
/// so spawns and deaths are queued and drained between turns.
#[derive(Debug, Clone, Copy)]
enum LifecycleNotice {
    Spawned(RobotId),
    Killed(RobotId),
}

/// The authoritative match state.
#[derive(Debug)]
pub struct World {
    map: GameMap,
    round: u32,
    running: bool,
    started: bool,
    footer_written: bool,
    winner: Option<Team>,
    domination: Option<DominationFactor>,
    rng: ChaCha8Rng,
    next_id: RobotId,
    robots: BTreeMap<RobotId, Robot>,
    exec_order: Vec<RobotId>,
    occupancy: Vec<Option<RobotId>>,
    islands: BTreeMap<IslandId, Island>,
    wells: BTreeMap<usize, Well>,
    effects: EffectField,
    ledgers: [TeamLedger; 2],
    replay: Replay,
    notices: Vec<LifecycleNotice>,
}

impl World {
    /// Build a world from a validated map and emit the match header.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] if the map's placements cannot be
    /// registered consistently.
    pub fn new(map: GameMap) -> Result<Self, EngineError> {
        let size = map.size();

        let mut island_tiles: BTreeMap<IslandId, Vec<Location>> = BTreeMap::new();
        for idx in 0..size {
            let island_id = map.island_id_at(idx);
            if island_id != 0 {
                island_tiles
                    .entry(island_id)
                    .or_default()
                    .push(map.location_of(idx));
            }
        }
        let islands = island_tiles
            .into_iter()
            .map(|(id, tiles)| (id, Island::new(id, tiles)))
            .collect();

        let wells = (0..size)
            .filter_map(|idx| {
                map.resource_at(idx)
                    .map(|kind| (idx, Well::new(map.location_of(idx), kind)))
            })
            .collect();

        let effects = EffectField::new(map.clouds());
        let rng = ChaCha8Rng::seed_from_u64(map.seed());
        let next_id = map
            .placements()
            .iter()
            .map(|p| p.id)
            .max()
            .map_or(1, |max| max + 1);

        let placements = map.placements().to_vec();
        let mut world = Self {
            round: 0,
            running: true,
            started: false,
            footer_written: false,
            winner: None,
            domination: None,
            rng,
            next_id,
            robots: BTreeMap::new(),
            exec_order: Vec::new(),
            occupancy: vec![None; size],
            islands,
            wells,
            effects,
            ledgers: [TeamLedger::default(), TeamLedger::default()],
            replay: Replay::default(),
            notices: Vec::new(),
            map,
        };

        world.replay.push(Event::MatchHeader {
            width: world.map.width(),
            height: world.map.height(),
            round_limit: world.map.round_limit(),
            seed: world.map.seed(),
        });

        for placement in placements {
            world.register_robot(
                placement.id,
                placement.team,
                placement.archetype,
                placement.location,
            )?;
        }

        Ok(world)
    }

    // ---- queries ------------------------------------------------------

    /// The immutable map this match is played on.
    #[must_use]
    pub const fn map(&self) -> &GameMap {
        &self.map
    }

    /// The current round number. Zero before the first round runs.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Whether the match is still undecided.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// The winning team, once the match is decided.
    #[must_use]
    pub const fn winner(&self) -> Option<Team> {
        self.winner
    }

    /// The criterion that decided the match.
    #[must_use]
    pub const fn domination(&self) -> Option<DominationFactor> {
        self.domination
    }

    /// The replay stream accumulated so far.
    #[must_use]
    pub const fn replay(&self) -> &Replay {
        &self.replay
    }

    /// A team's ledger.
    #[must_use]
    pub const fn ledger(&self, team: Team) -> &TeamLedger {
        &self.ledgers[team.index()]
    }

    pub(crate) const fn ledger_mut(&mut self, team: Team) -> &mut TeamLedger {
        &mut self.ledgers[team.index()]
    }

    /// Look up a robot by ID.
    #[must_use]
    pub fn robot(&self, id: RobotId) -> Option<&Robot> {
        self.robots.get(&id)
    }

    pub(crate) fn robot_mut(&mut self, id: RobotId) -> Option<&mut Robot> {
        self.robots.get_mut(&id)
    }

    /// All living robots, in ID order.
    pub fn robots(&self) -> impl Iterator<Item = &Robot> {
        self.robots.values()
    }

    /// The robot standing on a tile, if any.
    #[must_use]
    pub fn robot_at(&self, loc: Location) -> Option<RobotId> {
        self.map.index(loc).and_then(|idx| self.occupancy[idx])
    }

    /// Look up an island by ID.
    #[must_use]
    pub fn island(&self, id: IslandId) -> Option<&Island> {
        self.islands.get(&id)
    }

    /// All islands, in ID order.
    pub fn islands(&self) -> impl Iterator<Item = &Island> {
        self.islands.values()
    }

    /// The island a tile belongs to, if any.
    #[must_use]
    pub fn island_at(&self, loc: Location) -> Option<IslandId> {
        let idx = self.map.index(loc)?;
        let id = self.map.island_id_at(idx);
        (id != 0).then_some(id)
    }

    /// The well on a tile, if any.
    #[must_use]
    pub fn well_at(&self, loc: Location) -> Option<&Well> {
        self.map.index(loc).and_then(|idx| self.wells.get(&idx))
    }

    pub(crate) fn well_at_mut(&mut self, loc: Location) -> Option<&mut Well> {
        let idx = self.map.index(loc)?;
        self.wells.get_mut(&idx)
    }

    /// All wells, in tile-index order.
    pub fn wells(&self) -> impl Iterator<Item = &Well> {
        self.wells.values()
    }

    /// The cooldown multiplier at a tile for a team, in hundredths, or
    /// `None` off-map.
    #[must_use]
    pub fn cooldown_multiplier_centi(&self, loc: Location, team: Team) -> Option<i32> {
        self.map
            .index(loc)
            .map(|idx| self.effects.multiplier_centi(idx, team))
    }

    /// Every on-map location within a squared radius of a center, in
    /// row-major order.
    ///
    /// Deterministic ordering is part of the contract; callers may depend on
    /// it for reproducibility.
    #[must_use]
    pub fn locations_within_radius_squared(
        &self,
        center: Location,
        radius_squared: i32,
    ) -> Vec<Location> {
        if radius_squared < 0 {
            return Vec::new();
        }
        // ceil(sqrt(r^2)) + 1 bounding box, clamped to the map rectangle.
        // Widened arithmetic keeps huge budgets from overflowing.
        let mut ceil_radius: i64 = 0;
        while ceil_radius * ceil_radius < i64::from(radius_squared) {
            ceil_radius += 1;
        }
        let margin = ceil_radius + 1;

        let origin = self.map.origin();
        let min_x = i64::from(origin.x);
        let min_y = i64::from(origin.y);
        let max_x = min_x + i64::from(self.map.width()) - 1;
        let max_y = min_y + i64::from(self.map.height()) - 1;
        let clamp = |v: i64, min: i64, max: i64, fallback: i32| {
            i32::try_from(v.clamp(min, max)).unwrap_or(fallback)
        };
        let lo_x = clamp(i64::from(center.x) - margin, min_x, max_x, origin.x);
        let hi_x = clamp(i64::from(center.x) + margin, min_x, max_x, origin.x);
        let lo_y = clamp(i64::from(center.y) - margin, min_y, max_y, origin.y);
        let hi_y = clamp(i64::from(center.y) + margin, min_y, max_y, origin.y);

        let mut result = Vec::new();
        for y in lo_y..=hi_y {
            for x in lo_x..=hi_x {
                let dx = i64::from(x) - i64::from(center.x);
                let dy = i64::from(y) - i64::from(center.y);
                if dx * dx + dy * dy <= i64::from(radius_squared) {
                    result.push(Location::new(x, y));
                }
            }
        }
        result
    }

    pub(crate) const fn effects(&self) -> &EffectField {
        &self.effects
    }

    pub(crate) fn exec_order(&self) -> &[RobotId] {
        &self.exec_order
    }

    pub(crate) fn occupant(&self, idx: usize) -> Option<RobotId> {
        self.occupancy.get(idx).copied().flatten()
    }

    /// Scale a base cooldown by the multiplier at a tile for a team.
    pub(crate) fn scaled_cooldown_at(&self, loc: Location, team: Team, base: u32) -> u32 {
        self.map
            .index(loc)
            .map_or(base, |idx| self.effects.scaled_cooldown(idx, team, base))
    }

    // ---- mutations used by robot actions ------------------------------

    pub(crate) fn record(&mut self, event: Event) {
        self.replay.push(event);
    }

    /// Register a robot under a caller-chosen ID.
    fn register_robot(
        &mut self,
        id: RobotId,
        team: Team,
        archetype: Archetype,
        loc: Location,
    ) -> Result<(), EngineError> {
        let idx = self
            .map
            .index(loc)
            .ok_or(EngineError::OccupancyCorrupted(loc))?;
        if self.occupancy[idx].is_some() {
            return Err(EngineError::OccupancyCorrupted(loc));
        }
        self.occupancy[idx] = Some(id);
        self.robots.insert(id, Robot::new(id, team, archetype, loc));
        self.exec_order.push(id);
        self.replay.push(Event::Spawned {
            id,
            team,
            archetype,
            loc,
        });
        self.notices.push(LifecycleNotice::Spawned(id));
        Ok(())
    }

    /// Spawn a robot mid-match with a fresh ID.
    pub(crate) fn spawn_robot(
        &mut self,
        team: Team,
        archetype: Archetype,
        loc: Location,
    ) -> Result<RobotId, EngineError> {
        let id = self.next_id;
        self.next_id += 1;
        self.register_robot(id, team, archetype, loc)?;
        Ok(id)
    }

    /// Destroy a robot: deregister everywhere and queue the notification.
    pub(crate) fn destroy_robot(&mut self, id: RobotId) {
        let Some(robot) = self.robots.remove(&id) else {
            return;
        };
        if let Some(idx) = self.map.index(robot.location())
            && self.occupancy[idx] == Some(id)
        {
            self.occupancy[idx] = None;
        }
        self.exec_order.retain(|&other| other != id);
        self.replay.push(Event::Died { id });
        self.notices.push(LifecycleNotice::Killed(id));
    }

    /// Apply a validated (caused) move.
    pub(crate) fn relocate_robot(&mut self, id: RobotId, to: Location) {
        let Some(robot) = self.robots.get_mut(&id) else {
            return;
        };
        let from = robot.location();
        robot.set_location(to);
        if let Some(from_idx) = self.map.index(from)
            && self.occupancy[from_idx] == Some(id)
        {
            self.occupancy[from_idx] = None;
        }
        if let Some(to_idx) = self.map.index(to) {
            self.occupancy[to_idx] = Some(id);
        }
    }

    /// Stack a boost for `team` on every tile around `center`.
    pub(crate) fn add_boost(&mut self, center: Location, team: Team) {
        let expiry = self.round + BOOST_DURATION;
        for loc in self.locations_within_radius_squared(center, BOOST_RADIUS_SQUARED) {
            if let Some(idx) = self.map.index(loc) {
                self.effects.add_stack(idx, team, EffectKind::Boost, expiry);
            }
        }
    }

    /// Stack a debuff against `caster`'s opponent on every tile around
    /// `center`.
    pub(crate) fn add_debuff(&mut self, center: Location, caster: Team) {
        let expiry = self.round + DEBUFF_DURATION;
        let victim = caster.opponent();
        for loc in self.locations_within_radius_squared(center, DEBUFF_RADIUS_SQUARED) {
            if let Some(idx) = self.map.index(loc) {
                self.effects
                    .add_stack(idx, victim, EffectKind::Debuff, expiry);
            }
        }
    }

    /// Capture an island for `team` by planting an anchor on it.
    ///
    /// If a previous anchor was already accelerating, its standing boost is
    /// retracted from every member tile first.
    pub(crate) fn plant_anchor_at(&mut self, island_id: IslandId, team: Team) {
        let Some(island) = self.islands.get_mut(&island_id) else {
            return;
        };
        let displaced = island.plant_anchor(team);
        let tiles = island.tiles().to_vec();
        if let Some(previous) = displaced {
            for loc in tiles {
                if let Some(idx) = self.map.index(loc) {
                    self.effects.remove_anchor_boost(idx, previous, island_id);
                }
            }
        }
        self.ledgers[team.index()].record_anchor_planted();
    }

    // ---- the round loop -----------------------------------------------

    /// Advance the match by one round.
    ///
    /// While the match is undecided this processes the begin, execute, and
    /// end phases and returns [`RoundState::Running`]. The first call after
    /// the match is decided emits the match footer and returns
    /// [`RoundState::Done`]; later calls return `Done` without emitting
    /// anything further.
    ///
    /// # Errors
    ///
    /// A fatal invariant violation aborts the round, marks the match done,
    /// and is returned uninterpreted. No footer is emitted on that path.
    pub fn run_round(
        &mut self,
        provider: &mut dyn ControlProvider,
    ) -> Result<RoundState, EngineError> {
        if !self.running {
            if !self.footer_written
                && let (Some(winner), Some(reason)) = (self.winner, self.domination)
            {
                self.replay.push(Event::MatchFooter {
                    winner,
                    reason,
                    rounds: self.round,
                });
                self.footer_written = true;
                provider.match_ended(winner);
            }
            return Ok(RoundState::Done);
        }

        if !self.started {
            self.started = true;
            provider.match_started(&self.map);
            self.flush_notices(provider);
        }

        match self.process_round(provider) {
            Ok(()) => Ok(RoundState::Running),
            Err(err) => {
                self.running = false;
                Err(err)
            }
        }
    }

    fn process_round(&mut self, provider: &mut dyn ControlProvider) -> Result<(), EngineError> {
        // Begin phase
        self.round += 1;
        let order = self.exec_order.clone();
        for &id in &order {
            if let Some(robot) = self.robots.get_mut(&id) {
                robot.begin_round();
            }
        }
        provider.round_started(self.round);

        // Execute phase
        if self.round == 1 {
            self.grant_initial_endowments(&order)?;
        }
        for &id in &order {
            if !self.robots.contains_key(&id) {
                continue;
            }
            let outcome = {
                let mut ctx = TurnContext::new(self, id);
                provider.run_robot(&mut ctx)
            };
            match outcome {
                TurnOutcome::Completed { cost } => {
                    if let Some(robot) = self.robots.get_mut(&id) {
                        robot.set_cost_used(cost);
                    }
                }
                TurnOutcome::Faulted => {
                    // A faulted controller forfeits its robot; no retry
                    self.destroy_robot(id);
                }
            }
            self.flush_notices(provider);
        }
        provider.round_ended(self.round);

        // End phase
        self.process_end_of_round(provider);
        Ok(())
    }

    /// Mandatory first-round setup: every starting robot must be a Bastion,
    /// and each one endows its team's ledger.
    fn grant_initial_endowments(&mut self, order: &[RobotId]) -> Result<(), EngineError> {
        for &id in order {
            let robot = self
                .robots
                .get(&id)
                .ok_or(EngineError::UnknownRobot { id })?;
            if robot.archetype() != Archetype::Bastion {
                return Err(EngineError::StartingRobotNotBastion { id });
            }
            let team = robot.team();
            self.ledgers[team.index()].add(ResourceKind::Ore, INITIAL_ORE_AMOUNT);
            self.ledgers[team.index()].add(ResourceKind::Mana, INITIAL_MANA_AMOUNT);
        }
        Ok(())
    }

    fn process_end_of_round(&mut self, provider: &mut dyn ControlProvider) {
        self.advance_islands();
        self.settle_expired_effects();

        // Robot end-of-round hooks: Bastions settle passive income
        let order = self.exec_order.clone();
        for &id in &order {
            let Some(robot) = self.robots.get(&id) else {
                continue;
            };
            if robot.archetype() == Archetype::Bastion {
                let team = robot.team();
                self.ledgers[team.index()].add(ResourceKind::Ore, PASSIVE_ORE_RATE);
                self.ledgers[team.index()].add(ResourceKind::Mana, PASSIVE_MANA_RATE);
            }
        }

        // Well and team status
        for well in self.wells.values() {
            self.replay.push(Event::WellStatus {
                loc: well.location(),
                kind: well.kind(),
                stock: well.stock(),
            });
        }
        for team in [Team::Sol, Team::Umbra] {
            let ledger = &self.ledgers[team.index()];
            self.replay.push(Event::TeamStatus {
                team,
                ore_delta: ledger.round_delta(ResourceKind::Ore),
                mana_delta: ledger.round_delta(ResourceKind::Mana),
                elixir_delta: ledger.round_delta(ResourceKind::Elixir),
            });
            self.ledgers[team.index()].end_round();
        }

        // Forced movement, every CURRENT_PERIOD rounds
        if self.round % CURRENT_PERIOD == 0 {
            self.apply_currents();
        }

        // Position notifications for every living robot, in execution order
        let order = self.exec_order.clone();
        for &id in &order {
            if let Some(robot) = self.robots.get(&id) {
                self.replay.push(Event::Moved {
                    id,
                    loc: robot.location(),
                });
            }
        }

        // End-of-match check
        if self.round >= self.map.round_limit() {
            self.resolve_match();
        }
        if self.winner.is_some() {
            self.running = false;
        }

        self.replay.push(Event::RoundEnd { round: self.round });
        self.flush_notices(provider);

        #[cfg(debug_assertions)]
        crate::game::invariants::assert_invariants(self);
    }

    /// Islands advance in ID order; an anchor that finishes stabilizing
    /// applies its boost over the island's tiles.
    fn advance_islands(&mut self) {
        let island_ids: Vec<IslandId> = self.islands.keys().copied().collect();
        for island_id in island_ids {
            let Some(island) = self.islands.get_mut(&island_id) else {
                continue;
            };
            let accelerated = island.advance();
            let team = island.team();
            let anchor = island.anchor_state();
            let tiles = island.tiles().to_vec();
            if accelerated && let Some(owner) = team {
                for loc in tiles {
                    if let Some(idx) = self.map.index(loc) {
                        self.effects.add_stack(
                            idx,
                            owner,
                            EffectKind::AnchorBoost,
                            u32::from(island_id),
                        );
                    }
                }
            }
            self.replay.push(Event::IslandStatus {
                island: island_id,
                team,
                anchor,
            });
        }
    }

    /// Expire stacks; each expired debuff damages an occupying robot of the
    /// debuffed team.
    fn settle_expired_effects(&mut self) {
        let expired = self.effects.expire(self.round);
        for (idx, team) in expired {
            let Some(id) = self.occupancy[idx] else {
                continue;
            };
            let Some(robot) = self.robots.get_mut(&id) else {
                continue;
            };
            if robot.team() != team {
                continue;
            }
            robot.apply_health_delta(-i32::try_from(DEBUFF_DAMAGE).unwrap_or(i32::MAX));
            if robot.is_dead() {
                self.destroy_robot(id);
            }
        }
    }

    /// One currents cycle: plan against the frozen world, then commit.
    fn apply_currents(&mut self) {
        let claims: Vec<CurrentClaim> = self
            .robots
            .values()
            .map(|robot| CurrentClaim {
                id: robot.id(),
                location: robot.location(),
                movable: robot.archetype().can_move(),
            })
            .collect();
        let moves = plan_forced_moves(&self.map, &claims);

        // Vacate every mover's old tile before occupying any new one, so
        // chains and swaps land atomically
        for &(id, _) in &moves {
            if let Some(robot) = self.robots.get(&id)
                && let Some(idx) = self.map.index(robot.location())
                && self.occupancy[idx] == Some(id)
            {
                self.occupancy[idx] = None;
            }
        }
        for (id, target) in moves {
            if let Some(robot) = self.robots.get_mut(&id) {
                robot.set_location(target);
            }
            if let Some(idx) = self.map.index(target) {
                self.occupancy[idx] = Some(id);
            }
        }
    }

    /// The tiebreak cascade. Only the first non-tied criterion applies.
    fn resolve_match(&mut self) {
        let islands_held = |team: Team| -> u64 {
            let count = self
                .islands
                .values()
                .filter(|island| island.team() == Some(team))
                .count();
            u64::try_from(count).unwrap_or(u64::MAX)
        };
        let net_worth = |team: Team, kind: ResourceKind| -> u64 {
            let carried: u64 = self
                .robots
                .values()
                .filter(|robot| robot.team() == team)
                .map(|robot| u64::from(robot.inventory().amount(kind)))
                .sum();
            u64::from(self.ledgers[team.index()].balance(kind)) + carried
        };

        let cascade = [
            (
                DominationFactor::MoreIslands,
                islands_held(Team::Sol),
                islands_held(Team::Umbra),
            ),
            (
                DominationFactor::MoreAnchorsPlanted,
                u64::from(self.ledgers[Team::Sol.index()].anchors_planted()),
                u64::from(self.ledgers[Team::Umbra.index()].anchors_planted()),
            ),
            (
                DominationFactor::MoreElixir,
                net_worth(Team::Sol, ResourceKind::Elixir),
                net_worth(Team::Umbra, ResourceKind::Elixir),
            ),
            (
                DominationFactor::MoreMana,
                net_worth(Team::Sol, ResourceKind::Mana),
                net_worth(Team::Umbra, ResourceKind::Mana),
            ),
            (
                DominationFactor::MoreOre,
                net_worth(Team::Sol, ResourceKind::Ore),
                net_worth(Team::Umbra, ResourceKind::Ore),
            ),
        ];
        for (factor, sol, umbra) in cascade {
            if sol != umbra {
                self.winner = Some(if sol > umbra { Team::Sol } else { Team::Umbra });
                self.domination = Some(factor);
                return;
            }
        }

        let winner = if self.rng.gen_range(0..2) == 0 {
            Team::Sol
        } else {
            Team::Umbra
        };
        self.winner = Some(winner);
        self.domination = Some(DominationFactor::CoinFlip);
    }

    fn flush_notices(&mut self, provider: &mut dyn ControlProvider) {
        for notice in std::mem::take(&mut self.notices) {
            match notice {
                LifecycleNotice::Spawned(id) => provider.robot_spawned(id),
                LifecycleNotice::Killed(id) => provider.robot_killed(id),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::geometry::Direction;
    use crate::game::map::{MapInput, MapSymmetry, RobotPlacement};

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

    struct Script<F> {
        act: F,
    }

    impl<F: FnMut(&mut TurnContext<'_>)> ControlProvider for Script<F> {
        fn run_robot(&mut self, ctx: &mut TurnContext<'_>) -> TurnOutcome {
            (self.act)(ctx);
            TurnOutcome::Completed { cost: 0 }
        }
    }

    #[test]
    fn test_debuff_expiry_damages_occupant_once() {
        let mut world = world_with(|_| {});
        let target = Location::new(12, 10);
        let mut provider = Script {
            act: move |ctx: &mut TurnContext<'_>| {
                if ctx.archetype() == Archetype::Destabilizer
                    && ctx.round() == 2
                    && ctx.can_destabilize(target)
                {
                    ctx.destabilize(target).unwrap();
                }
            },
        };

        assert_eq!(world.run_round(&mut provider).unwrap(), RoundState::Running);
        world
            .spawn_robot(Team::Sol, Archetype::Destabilizer, Location::new(10, 10))
            .unwrap();
        let victim = world
            .spawn_robot(Team::Umbra, Archetype::Courier, target)
            .unwrap();

        // The debuff lands in round 2 and expires at the end of round
        // 2 + DEBUFF_DURATION; the parked victim takes the damage then
        for _ in 0..DEBUFF_DURATION {
            world.run_round(&mut provider).unwrap();
            assert_eq!(
                world.robot(victim).unwrap().health(),
                Archetype::Courier.max_health()
            );
        }
        world.run_round(&mut provider).unwrap();
        assert_eq!(
            world.robot(victim).unwrap().health(),
            Archetype::Courier.max_health() - DEBUFF_DAMAGE
        );

        // Exactly once: further rounds leave health alone
        world.run_round(&mut provider).unwrap();
        assert_eq!(
            world.robot(victim).unwrap().health(),
            Archetype::Courier.max_health() - DEBUFF_DAMAGE
        );
    }

    #[test]
    fn test_radius_query_with_huge_budget_covers_the_map() {
        let world = world_with(|_| {});
        let all = world.locations_within_radius_squared(Location::new(10, 10), i32::MAX);
        assert_eq!(all.len(), 400);
        // Row-major over the clamped rectangle
        assert_eq!(all[0], Location::new(0, 0));
        assert_eq!(all[399], Location::new(19, 19));
    }

    #[test]
    fn test_radius_query_clamps_at_map_edge() {
        let world = world_with(|_| {});
        let corner = world.locations_within_radius_squared(Location::new(0, 0), 2);
        assert_eq!(
            corner,
            vec![
                Location::new(0, 0),
                Location::new(1, 0),
                Location::new(0, 1),
                Location::new(1, 1),
            ]
        );
    }
}
