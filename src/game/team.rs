//! Player identity and team membership.

use std::collections::BTreeSet;

/// Index of a player in the score and crown tables.
pub type PlayerIndex = usize;

/// The agent's own player index plus every ally.
///
/// Membership always includes the agent itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    me: PlayerIndex,
    members: BTreeSet<PlayerIndex>,
}

impl Team {
    /// A team of one.
    #[must_use]
    pub fn solo(me: PlayerIndex) -> Self {
        Self::with_allies(me, [])
    }

    /// A team made of `me` and the given allies.
    #[must_use]
    pub fn with_allies(me: PlayerIndex, allies: impl IntoIterator<Item = PlayerIndex>) -> Self {
        let mut members: BTreeSet<PlayerIndex> = allies.into_iter().collect();
        members.insert(me);
        Self { me, members }
    }

    /// Build from a per-player team-id table, as sent at game start.
    ///
    /// Every player sharing `me`'s team id is an ally. Falls back to a solo
    /// team when `me` is out of range.
    #[must_use]
    pub fn from_team_ids(me: PlayerIndex, team_ids: &[u32]) -> Self {
        let Some(&mine) = team_ids.get(me) else {
            return Self::solo(me);
        };
        let allies = team_ids
            .iter()
            .enumerate()
            .filter(|&(_, &id)| id == mine)
            .map(|(player, _)| player);
        Self::with_allies(me, allies)
    }

    /// The agent's own player index.
    #[must_use]
    pub const fn me(&self) -> PlayerIndex {
        self.me
    }

    /// Whether the given player is the agent or an ally.
    #[must_use]
    pub fn contains(&self, player: PlayerIndex) -> bool {
        self.members.contains(&player)
    }

    /// Whether a raw terrain code belongs to the team. Sentinels never do.
    #[must_use]
    pub fn owns_code(&self, code: i32) -> bool {
        usize::try_from(code).is_ok_and(|player| self.contains(player))
    }

    /// Iterate over all members, in index order.
    pub fn members(&self) -> impl Iterator<Item = PlayerIndex> + '_ {
        self.members.iter().copied()
    }
}
