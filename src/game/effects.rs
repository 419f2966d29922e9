//! The stacking field: per-tile, per-team cooldown multipliers.
//!
//! Each tile carries, for each team, three lists of effect tokens: boost and
//! debuff tokens are expiry rounds; anchor-boost tokens are island IDs used
//! for explicit removal. A derived multiplier in integer hundredths is kept
//! incrementally in lockstep with the lists. Stacks past a kind's cap still
//! occupy the list but contribute nothing, and the add/remove paths apply the
//! same cap guard so the increments stay symmetric.

use crate::game::constants::{
    ANCHOR_BOOST_CENTI, BOOST_CENTI, CLOUD_CENTI, DEBUFF_CENTI, MAX_ANCHOR_STACKS,
    MAX_BOOST_STACKS, MAX_DEBUFF_STACKS, MULTIPLIER_BASE_CENTI,
};
use crate::game::island::IslandId;
use crate::game::team::Team;

/// The three kinds of stacking effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EffectKind {
    /// Friendly cooldown reduction from a Booster.
    Boost,
    /// Hostile cooldown increase from a Destabilizer.
    Debuff,
    /// Standing friendly reduction from an accelerating island anchor.
    AnchorBoost,
}

/// All effect kinds, in storage order.
pub(crate) const EFFECT_KINDS: [EffectKind; 3] =
    [EffectKind::Boost, EffectKind::Debuff, EffectKind::AnchorBoost];

impl EffectKind {
    const fn index(self) -> usize {
        match self {
            EffectKind::Boost => 0,
            EffectKind::Debuff => 1,
            EffectKind::AnchorBoost => 2,
        }
    }

    /// Multiplier contribution per capped stack, in hundredths.
    pub(crate) const fn centi(self) -> i32 {
        match self {
            EffectKind::Boost => BOOST_CENTI,
            EffectKind::Debuff => DEBUFF_CENTI,
            EffectKind::AnchorBoost => ANCHOR_BOOST_CENTI,
        }
    }

    /// Stack count beyond which further stacks stop contributing.
    pub(crate) const fn max_stacks(self) -> usize {
        match self {
            EffectKind::Boost => MAX_BOOST_STACKS,
            EffectKind::Debuff => MAX_DEBUFF_STACKS,
            EffectKind::AnchorBoost => MAX_ANCHOR_STACKS,
        }
    }
}

/// Per-tile stacking state and the derived multipliers for both teams.
#[derive(Debug, Clone)]
pub(crate) struct EffectField {
    /// `stacks[tile][team][kind]` holds the live effect tokens.
    stacks: Vec<[[Vec<u32>; 3]; 2]>,
    /// Derived multiplier per tile and team, in hundredths.
    centi: Vec<[i32; 2]>,
    /// Cloud flags, retained so the base multiplier can be recomputed.
    cloud: Vec<bool>,
}

impl EffectField {
    /// Build the field over the map's tiles. Cloud tiles start both teams'
    /// multipliers above the base.
    pub(crate) fn new(clouds: &[bool]) -> Self {
        let centi = clouds
            .iter()
            .map(|&cloudy| {
                let base = if cloudy {
                    MULTIPLIER_BASE_CENTI + CLOUD_CENTI
                } else {
                    MULTIPLIER_BASE_CENTI
                };
                [base; 2]
            })
            .collect();
        let stacks = std::iter::repeat_with(<[[Vec<u32>; 3]; 2]>::default)
            .take(clouds.len())
            .collect();
        Self {
            stacks,
            centi,
            cloud: clouds.to_vec(),
        }
    }

    /// Current multiplier at a tile for a team, in hundredths.
    pub(crate) fn multiplier_centi(&self, idx: usize, team: Team) -> i32 {
        self.centi[idx][team.index()]
    }

    /// Scale a base cooldown by the tile's multiplier, rounding to nearest.
    pub(crate) fn scaled_cooldown(&self, idx: usize, team: Team, base: u32) -> u32 {
        let centi = i64::from(self.centi[idx][team.index()]).max(0);
        let scaled = (i64::from(base) * centi + 50) / 100;
        u32::try_from(scaled).unwrap_or(0)
    }

    /// Number of live stacks of a kind at a tile for a team.
    #[cfg(test)]
    pub(crate) fn stack_count(&self, idx: usize, team: Team, kind: EffectKind) -> usize {
        self.stacks[idx][team.index()][kind.index()].len()
    }

    /// Append one stack. The multiplier moves only while the live count is
    /// below the kind's cap.
    pub(crate) fn add_stack(&mut self, idx: usize, team: Team, kind: EffectKind, token: u32) {
        let list = &mut self.stacks[idx][team.index()][kind.index()];
        if list.len() < kind.max_stacks() {
            self.centi[idx][team.index()] += kind.centi();
        }
        list.push(token);
    }

    /// Remove an anchor boost by its island-ID token, reversing its
    /// contribution under the same cap guard as the add path.
    pub(crate) fn remove_anchor_boost(&mut self, idx: usize, team: Team, island: IslandId) {
        let list = &mut self.stacks[idx][team.index()][EffectKind::AnchorBoost.index()];
        let Some(pos) = list.iter().position(|&token| token == u32::from(island)) else {
            return;
        };
        if list.len() <= EffectKind::AnchorBoost.max_stacks() {
            self.centi[idx][team.index()] -= EffectKind::AnchorBoost.centi();
        }
        list.remove(pos);
    }

    /// Remove every boost and debuff stack whose expiry round has arrived.
    ///
    /// An entry added in round `r` with duration `d` carries token `r + d` and
    /// is removed the first time this runs with `current_round >= r + d`.
    /// Returns one `(tile, team)` pair per expired debuff stack so the caller
    /// can apply on-expiry damage; pairs come out in tile-index order.
    pub(crate) fn expire(&mut self, current_round: u32) -> Vec<(usize, Team)> {
        let mut expired_debuffs = Vec::new();
        for (idx, tile) in self.stacks.iter_mut().enumerate() {
            for team in [Team::Sol, Team::Umbra] {
                for kind in [EffectKind::Boost, EffectKind::Debuff] {
                    let list = &mut tile[team.index()][kind.index()];
                    let mut i = 0;
                    while i < list.len() {
                        if list[i] > current_round {
                            i += 1;
                            continue;
                        }
                        if list.len() <= kind.max_stacks() {
                            self.centi[idx][team.index()] -= kind.centi();
                        }
                        list.remove(i);
                        if kind == EffectKind::Debuff {
                            expired_debuffs.push((idx, team));
                        }
                    }
                }
            }
        }
        expired_debuffs
    }

    /// Recompute a tile's multiplier from scratch: the base (plus cloud),
    /// plus each kind's cap-respecting contribution.
    ///
    /// The incremental value must always agree with this; the invariant
    /// checker compares the two.
    pub(crate) fn recompute_centi(&self, idx: usize, team: Team) -> i32 {
        let mut centi = if self.cloud[idx] {
            MULTIPLIER_BASE_CENTI + CLOUD_CENTI
        } else {
            MULTIPLIER_BASE_CENTI
        };
        for kind in EFFECT_KINDS {
            let live = self.stacks[idx][team.index()][kind.index()].len();
            let counted = i32::try_from(live.min(kind.max_stacks())).unwrap_or(i32::MAX);
            centi += counted * kind.centi();
        }
        centi
    }

    /// Number of tiles covered by the field.
    pub(crate) fn tile_count(&self) -> usize {
        self.centi.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(tiles: usize) -> EffectField {
        EffectField::new(&vec![false; tiles])
    }

    #[test]
    fn test_boost_lowers_multiplier_until_cap() {
        let mut f = field(4);
        f.add_stack(0, Team::Sol, EffectKind::Boost, 10);
        assert_eq!(f.multiplier_centi(0, Team::Sol), 90);
        f.add_stack(0, Team::Sol, EffectKind::Boost, 11);
        assert_eq!(f.multiplier_centi(0, Team::Sol), 80);

        // Third stack is over the cap and contributes nothing
        f.add_stack(0, Team::Sol, EffectKind::Boost, 12);
        assert_eq!(f.multiplier_centi(0, Team::Sol), 80);
        assert_eq!(f.stack_count(0, Team::Sol, EffectKind::Boost), 3);
        assert_eq!(f.recompute_centi(0, Team::Sol), 80);
    }

    #[test]
    fn test_expiry_restores_multiplier_symmetrically() {
        let mut f = field(1);
        f.add_stack(0, Team::Umbra, EffectKind::Boost, 5);
        f.add_stack(0, Team::Umbra, EffectKind::Boost, 6);
        f.add_stack(0, Team::Umbra, EffectKind::Boost, 7);

        f.expire(4);
        assert_eq!(f.multiplier_centi(0, Team::Umbra), 80);

        // One stack leaves, one of the overflowed stacks takes its slot
        f.expire(5);
        assert_eq!(f.stack_count(0, Team::Umbra, EffectKind::Boost), 2);
        assert_eq!(f.multiplier_centi(0, Team::Umbra), 80);

        f.expire(7);
        assert_eq!(f.stack_count(0, Team::Umbra, EffectKind::Boost), 0);
        assert_eq!(f.multiplier_centi(0, Team::Umbra), 100);
        assert_eq!(f.recompute_centi(0, Team::Umbra), 100);
    }

    #[test]
    fn test_debuff_expiry_reports_tiles() {
        let mut f = field(3);
        f.add_stack(2, Team::Sol, EffectKind::Debuff, 8);
        f.add_stack(2, Team::Sol, EffectKind::Debuff, 8);
        assert_eq!(f.multiplier_centi(2, Team::Sol), 120);

        assert!(f.expire(7).is_empty());
        let expired = f.expire(8);
        assert_eq!(expired, vec![(2, Team::Sol), (2, Team::Sol)]);
        assert_eq!(f.multiplier_centi(2, Team::Sol), 100);
    }

    #[test]
    fn test_anchor_boost_removed_by_token() {
        let mut f = field(2);
        f.add_stack(1, Team::Sol, EffectKind::AnchorBoost, 7);
        assert_eq!(f.multiplier_centi(1, Team::Sol), 85);

        // Wrong token is a no-op
        f.remove_anchor_boost(1, Team::Sol, 8);
        assert_eq!(f.multiplier_centi(1, Team::Sol), 85);

        f.remove_anchor_boost(1, Team::Sol, 7);
        assert_eq!(f.multiplier_centi(1, Team::Sol), 100);
        // Anchor tokens never expire by round
        assert!(f.expire(u32::MAX).is_empty());
    }

    #[test]
    fn test_cloud_tiles_start_elevated() {
        let f = EffectField::new(&[false, true]);
        assert_eq!(f.multiplier_centi(0, Team::Sol), 100);
        assert_eq!(f.multiplier_centi(1, Team::Sol), 120);
        assert_eq!(f.multiplier_centi(1, Team::Umbra), 120);
        assert_eq!(f.recompute_centi(1, Team::Umbra), 120);
    }

    #[test]
    fn test_scaled_cooldown_rounds_to_nearest() {
        let mut f = field(1);
        assert_eq!(f.scaled_cooldown(0, Team::Sol, 10), 10);
        f.add_stack(0, Team::Sol, EffectKind::Debuff, 99);
        // 15 * 1.10 = 16.5 rounds to 17
        assert_eq!(f.scaled_cooldown(0, Team::Sol, 15), 17);
        f.add_stack(0, Team::Sol, EffectKind::Boost, 99);
        // 25 * 1.00 = 25
        assert_eq!(f.scaled_cooldown(0, Team::Sol, 25), 25);
    }
}
