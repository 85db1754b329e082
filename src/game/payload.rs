//! Wire format of a turn update and of the move sent back.

use serde::{Deserialize, Serialize};

use crate::game::PlayerIndex;
use crate::game::patch::full_replacement;

/// Per-player score line, sent whole every turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    /// Player index.
    #[serde(rename = "i")]
    pub player: PlayerIndex,
    /// Total army across all of the player's tiles.
    pub total: i64,
    /// Number of tiles the player owns.
    pub tiles: i64,
    /// Whether the player has been eliminated.
    #[serde(default)]
    pub dead: bool,
}

impl ScoreEntry {
    /// An all-zero, alive entry for a player the table does not mention.
    #[must_use]
    pub const fn empty(player: PlayerIndex) -> Self {
        Self {
            player,
            total: 0,
            tiles: 0,
            dead: false,
        }
    }
}

/// One `game_update` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnPayload {
    /// Turn counter as reported by the server.
    pub turn: u32,
    /// Score table.
    pub scores: Vec<ScoreEntry>,
    /// Crown tile per player, `-1` when not visible.
    pub generals: Vec<i32>,
    /// Diff against the previous city index list.
    pub cities_diff: Vec<i32>,
    /// Diff against the previous flat map buffer.
    pub map_diff: Vec<i32>,
}

impl TurnPayload {
    /// Build a payload whose diffs replace the previous buffers outright.
    ///
    /// `map` is the full flat buffer: `[width, height, armies.., terrain..]`.
    #[must_use]
    pub fn full(
        turn: u32,
        scores: Vec<ScoreEntry>,
        generals: Vec<i32>,
        cities: &[i32],
        map: &[i32],
    ) -> Self {
        Self {
            turn,
            scores,
            generals,
            cities_diff: full_replacement(cities),
            map_diff: full_replacement(map),
        }
    }
}

/// One attack order: move the army on `from` onto the adjacent `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// Source tile.
    pub from: usize,
    /// Destination tile.
    pub to: usize,
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}
