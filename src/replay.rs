//! The replay event stream.
//!
//! The world emits an append-only, round-keyed stream of events as a side
//! effect of round processing: a match header, per-round deltas, and a match
//! footer. Events are serde-serializable so hosts can persist them however
//! they like; no encoding is owned here.

use serde::{Deserialize, Serialize};

use crate::game::{
    AnchorState, Archetype, DominationFactor, IslandId, Location, ResourceKind, RobotId, Team,
};

/// One entry in the replay stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// Initial map snapshot, emitted once before round 1.
    MatchHeader {
        /// Map width in tiles.
        width: i32,
        /// Map height in tiles.
        height: i32,
        /// Configured round limit.
        round_limit: u32,
        /// The match's random seed.
        seed: u64,
    },
    /// A robot entered the world.
    Spawned {
        /// The new robot.
        id: RobotId,
        /// Its team.
        team: Team,
        /// Its archetype.
        archetype: Archetype,
        /// Its starting tile.
        loc: Location,
    },
    /// A robot left the world.
    Died {
        /// The destroyed robot.
        id: RobotId,
    },
    /// A robot's position after a caused move, or at the end of a round.
    Moved {
        /// The robot.
        id: RobotId,
        /// Where it now stands.
        loc: Location,
    },
    /// A robot attacked another.
    Attacked {
        /// The attacker.
        id: RobotId,
        /// The defender.
        target: RobotId,
        /// Damage dealt.
        damage: u32,
    },
    /// A Courier drew resources from a well.
    Collected {
        /// The collector.
        id: RobotId,
        /// The well's tile.
        loc: Location,
        /// The resource drawn.
        kind: ResourceKind,
        /// Units drawn.
        amount: u32,
    },
    /// A Courier deposited resources at a Bastion.
    Transferred {
        /// The depositor.
        id: RobotId,
        /// The receiving Bastion.
        target: RobotId,
        /// The resource deposited.
        kind: ResourceKind,
        /// Units deposited.
        amount: u32,
    },
    /// A Bastion built a robot.
    Built {
        /// The builder.
        id: RobotId,
        /// The robot it produced.
        built: RobotId,
    },
    /// A Bastion crafted an anchor.
    AnchorCrafted {
        /// The crafting Bastion.
        id: RobotId,
    },
    /// A Courier picked an anchor up from a Bastion.
    AnchorTaken {
        /// The Courier.
        id: RobotId,
        /// The Bastion it took from.
        from: RobotId,
    },
    /// A Courier planted an anchor, capturing an island.
    AnchorPlanted {
        /// The Courier.
        id: RobotId,
        /// The captured island.
        island: IslandId,
    },
    /// A Booster stacked a boost around itself.
    Boosted {
        /// The Booster.
        id: RobotId,
        /// The effect center.
        loc: Location,
    },
    /// A Destabilizer stacked a debuff around a target tile.
    Destabilized {
        /// The Destabilizer.
        id: RobotId,
        /// The effect center.
        loc: Location,
    },
    /// A robot updated a debug annotation slot.
    Indicator {
        /// The robot.
        id: RobotId,
        /// The slot written.
        slot: usize,
        /// The new text.
        text: String,
    },
    /// An island's state at the end of a round.
    IslandStatus {
        /// The island.
        island: IslandId,
        /// Its holding team.
        team: Option<Team>,
        /// Its anchor state.
        anchor: AnchorState,
    },
    /// A well's stock at the end of a round.
    WellStatus {
        /// The well's tile.
        loc: Location,
        /// Its resource kind.
        kind: ResourceKind,
        /// Units left in stock.
        stock: u32,
    },
    /// A team's ledger deltas over the round just ended.
    TeamStatus {
        /// The team.
        team: Team,
        /// Net Ore change.
        ore_delta: i64,
        /// Net Mana change.
        mana_delta: i64,
        /// Net Elixir change.
        elixir_delta: i64,
    },
    /// Marks the end of a round's events.
    RoundEnd {
        /// The round that just completed.
        round: u32,
    },
    /// Match result, emitted once after the match is decided.
    MatchFooter {
        /// The winning team.
        winner: Team,
        /// Which criterion decided the match.
        reason: DominationFactor,
        /// Rounds played.
        rounds: u32,
    },
}

/// The in-memory replay stream for one match.
#[derive(Debug, Clone, Default)]
pub struct Replay {
    events: Vec<Event>,
}

impl Replay {
    /// Append an event.
    pub(crate) fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    /// All events, in emission order.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Iterate the stream split into per-round chunks.
    ///
    /// Each chunk ends with its `RoundEnd` marker; the header rides with the
    /// first round and the footer trails the final chunk.
    pub fn rounds(&self) -> impl Iterator<Item = &[Event]> {
        self.events
            .split_inclusive(|event| matches!(event, Event::RoundEnd { .. }))
    }

    /// The match footer, once the match has been decided and flushed.
    #[must_use]
    pub fn footer(&self) -> Option<&Event> {
        self.events
            .iter()
            .rfind(|event| matches!(event, Event::MatchFooter { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounds_split_on_markers() {
        let mut replay = Replay::default();
        replay.push(Event::MatchHeader {
            width: 20,
            height: 20,
            round_limit: 10,
            seed: 1,
        });
        replay.push(Event::RoundEnd { round: 1 });
        replay.push(Event::Died { id: 7 });
        replay.push(Event::RoundEnd { round: 2 });

        let rounds: Vec<_> = replay.rounds().collect();
        assert_eq!(rounds.len(), 2);
        assert_eq!(rounds[0].len(), 2);
        assert_eq!(rounds[1][0], Event::Died { id: 7 });
    }

    #[test]
    fn test_footer_lookup() {
        let mut replay = Replay::default();
        assert!(replay.footer().is_none());
        replay.push(Event::MatchFooter {
            winner: Team::Sol,
            reason: DominationFactor::CoinFlip,
            rounds: 3,
        });
        assert!(replay.footer().is_some());
    }
}
