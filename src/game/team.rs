//! Teams, resources, and per-team ledgers.

use serde::{Deserialize, Serialize};

use crate::game::constants::SHARED_ARRAY_LEN;

/// One of the two competing teams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Team {
    /// The first team.
    Sol,
    /// The second team.
    Umbra,
}

impl Team {
    /// Index of this team into per-team arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Team::Sol => 0,
            Team::Umbra => 1,
        }
    }

    /// The other team.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Team::Sol => Team::Umbra,
            Team::Umbra => Team::Sol,
        }
    }
}

/// One of the three fungible resources.
///
/// Ore is the primary resource, Mana the secondary, Elixir the tertiary; the
/// tiebreak cascade compares them in reverse order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Primary resource; builds Couriers and crafts anchors.
    Ore,
    /// Secondary resource; builds Lancers.
    Mana,
    /// Tertiary resource; builds Boosters and Destabilizers.
    Elixir,
}

impl ResourceKind {
    /// Index of this resource into per-kind arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            ResourceKind::Ore => 0,
            ResourceKind::Mana => 1,
            ResourceKind::Elixir => 2,
        }
    }
}

/// All resource kinds, in primary-to-tertiary order.
pub const RESOURCE_KINDS: [ResourceKind; 3] =
    [ResourceKind::Ore, ResourceKind::Mana, ResourceKind::Elixir];

/// A team's economy ledger and shared communication state.
#[derive(Debug, Clone, Copy)]
pub struct TeamLedger {
    balance: [u32; 3],
    round_delta: [i64; 3],
    anchors_planted: u32,
    shared: [u16; SHARED_ARRAY_LEN],
}

impl Default for TeamLedger {
    fn default() -> Self {
        Self {
            balance: [0; 3],
            round_delta: [0; 3],
            anchors_planted: 0,
            shared: [0; SHARED_ARRAY_LEN],
        }
    }
}

impl TeamLedger {
    /// Current balance of a resource.
    #[must_use]
    pub const fn balance(&self, kind: ResourceKind) -> u32 {
        self.balance[kind.index()]
    }

    /// Net change in a resource since the last end-of-round settlement.
    #[must_use]
    pub const fn round_delta(&self, kind: ResourceKind) -> i64 {
        self.round_delta[kind.index()]
    }

    /// Credit the ledger.
    pub fn add(&mut self, kind: ResourceKind, amount: u32) {
        self.balance[kind.index()] += amount;
        self.round_delta[kind.index()] += i64::from(amount);
    }

    /// Debit the ledger if the balance covers it.
    ///
    /// Returns `false` (and leaves the ledger untouched) when it does not.
    pub fn try_spend(&mut self, kind: ResourceKind, amount: u32) -> bool {
        let idx = kind.index();
        if self.balance[idx] < amount {
            return false;
        }
        self.balance[idx] -= amount;
        self.round_delta[idx] -= i64::from(amount);
        true
    }

    /// Number of anchors this team has planted over the whole match.
    #[must_use]
    pub const fn anchors_planted(&self) -> u32 {
        self.anchors_planted
    }

    /// Record an anchor planting.
    pub const fn record_anchor_planted(&mut self) {
        self.anchors_planted += 1;
    }

    /// Read a slot of the team's shared array.
    #[must_use]
    pub fn read_shared(&self, index: usize) -> Option<u16> {
        self.shared.get(index).copied()
    }

    /// Write a slot of the team's shared array.
    ///
    /// Returns `false` if the index is out of bounds.
    pub const fn write_shared(&mut self, index: usize, value: u16) -> bool {
        if index >= SHARED_ARRAY_LEN {
            return false;
        }
        self.shared[index] = value;
        true
    }

    /// Settle the round: clear the per-round deltas.
    pub const fn end_round(&mut self) {
        self.round_delta = [0; 3];
    }
}
