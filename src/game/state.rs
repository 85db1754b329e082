//! World state reconstruction.
//!
//! Rebuilt every turn from the patched city list and map buffer. Only the
//! known-city list, the mountain set and the found-crown list carry over
//! between turns; everything else is replaced wholesale.

use std::collections::BTreeSet;
use std::mem;

use tracing::{debug, warn};

use crate::error::{Buffer, PlanError, WorldError};
use crate::game::patch::patch;
use crate::game::{Grid, Move, PlayerIndex, ScoreEntry, Team, Terrain, TurnPayload};

/// An opponent crown seen at least once and not yet confirmed taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoundCrown {
    /// Tile index of the crown.
    pub tile: usize,
    /// Player the crown belongs to.
    pub owner: PlayerIndex,
}

/// Mean row and column of the team's tiles.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Centroid {
    /// Mean row.
    pub row: f64,
    /// Mean column.
    pub col: f64,
}

/// Army and terrain buffers as they were before an update.
#[derive(Debug, Clone, Default)]
pub struct TurnSnapshot {
    /// Per-tile army counts.
    pub armies: Vec<i32>,
    /// Per-tile terrain.
    pub terrain: Vec<Terrain>,
}

/// Everything the agent knows about the world at the current turn.
#[derive(Debug, Clone)]
pub struct WorldState {
    team: Team,
    turn: u32,
    scores: Vec<ScoreEntry>,
    generals: Vec<i32>,
    crown: Option<usize>,

    // Raw patched buffers, kept as the base for the next diff.
    cities_buf: Vec<i32>,
    map_buf: Vec<i32>,

    grid: Grid,
    armies: Vec<i32>,
    terrain: Vec<Terrain>,

    cities: Vec<usize>,
    mountains: BTreeSet<usize>,
    found_crowns: Vec<FoundCrown>,

    my_score: ScoreEntry,
    owned_cities: usize,
    centroid: Centroid,
    avg_tile_strength: f64,
    biggest_enemy: Option<PlayerIndex>,
}

impl WorldState {
    /// Create an empty world for the given team. The first update fills it in.
    #[must_use]
    pub fn new(team: Team) -> Self {
        let me = team.me();
        Self {
            team,
            turn: 0,
            scores: Vec::new(),
            generals: Vec::new(),
            crown: None,
            cities_buf: Vec::new(),
            map_buf: Vec::new(),
            grid: Grid::default(),
            armies: Vec::new(),
            terrain: Vec::new(),
            cities: Vec::new(),
            mountains: BTreeSet::new(),
            found_crowns: Vec::new(),
            my_score: ScoreEntry::empty(me),
            owned_cities: 0,
            centroid: Centroid::default(),
            avg_tile_strength: 0.0,
            biggest_enemy: None,
        }
    }

    /// Apply a turn payload.
    ///
    /// Returns the army and terrain buffers from before the update. On error
    /// nothing is modified.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError`] if either diff is malformed or the patched map
    /// buffer is inconsistent with its own dimensions.
    pub fn update(&mut self, payload: &TurnPayload) -> Result<TurnSnapshot, WorldError> {
        let cities_buf =
            patch(&self.cities_buf, &payload.cities_diff).map_err(|source| WorldError::Patch {
                buffer: Buffer::Cities,
                source,
            })?;
        let map_buf = patch(&self.map_buf, &payload.map_diff).map_err(|source| WorldError::Patch {
            buffer: Buffer::Map,
            source,
        })?;
        let (grid, armies, terrain) = split_map(&map_buf)?;

        self.turn = payload.turn;
        self.scores.clone_from(&payload.scores);
        self.generals.clone_from(&payload.generals);
        self.crown = self
            .generals
            .get(self.team.me())
            .and_then(|&tile| usize::try_from(tile).ok())
            .filter(|&tile| grid.contains(tile));

        let previous = TurnSnapshot {
            armies: mem::replace(&mut self.armies, armies),
            terrain: mem::replace(&mut self.terrain, terrain),
        };
        self.grid = grid;
        self.cities_buf = cities_buf;
        self.map_buf = map_buf;

        self.merge_cities();
        self.merge_mountains();
        self.refresh_aggregates();
        self.refresh_found_crowns();
        self.biggest_enemy = self.compute_biggest_enemy();

        debug!(
            turn = self.turn,
            width = self.grid.width(),
            height = self.grid.height(),
            cities = self.cities.len(),
            mountains = self.mountains.len(),
            found_crowns = self.found_crowns.len(),
            biggest_enemy = ?self.biggest_enemy,
            "world updated"
        );

        Ok(previous)
    }

    fn merge_cities(&mut self) {
        for &raw in &self.cities_buf {
            match usize::try_from(raw) {
                Ok(city) if self.grid.contains(city) => {
                    if !self.cities.contains(&city) {
                        self.cities.push(city);
                    }
                }
                _ => debug!(raw, "ignoring out-of-range city index"),
            }
        }
    }

    fn merge_mountains(&mut self) {
        let found = self
            .terrain
            .iter()
            .enumerate()
            .filter(|&(_, &terrain)| terrain == Terrain::Mountain)
            .map(|(index, _)| index);
        self.mountains.extend(found);
    }

    fn refresh_aggregates(&mut self) {
        let me = self.team.me();
        self.my_score = if let Some(score) = self.score_of(me) {
            *score
        } else {
            warn!(player = me, "score table has no entry for us");
            ScoreEntry::empty(me)
        };

        self.owned_cities = self.cities.iter().filter(|&&city| self.is_team(city)).count();

        let (mut rows, mut cols, mut count) = (0usize, 0usize, 0usize);
        for index in 0..self.terrain.len() {
            if self.is_team(index) {
                let coord = self.grid.coord(index);
                rows += coord.row;
                cols += coord.col;
                count += 1;
            }
        }
        self.centroid = if count == 0 {
            Centroid::default()
        } else {
            #[allow(clippy::cast_precision_loss)]
            let (rows, cols, count) = (rows as f64, cols as f64, count as f64);
            Centroid {
                row: rows / count,
                col: cols / count,
            }
        };

        let (total, tiles) = self
            .scores
            .iter()
            .filter(|score| self.team.contains(score.player))
            .fold((0i64, 0i64), |(total, tiles), score| {
                (total + score.total, tiles + score.tiles)
            });
        #[allow(clippy::cast_precision_loss)]
        let avg = if tiles > 0 { total as f64 / tiles as f64 } else { 0.0 };
        self.avg_tile_strength = avg;
    }

    fn refresh_found_crowns(&mut self) {
        for (owner, &raw) in self.generals.iter().enumerate() {
            let Ok(tile) = usize::try_from(raw) else {
                continue;
            };
            if !self.grid.contains(tile)
                || Some(tile) == self.crown
                || self.team.contains(owner)
                || self.found_crowns.iter().any(|crown| crown.tile == tile)
            {
                continue;
            }
            debug!(tile, owner, "found enemy crown");
            self.found_crowns.push(FoundCrown { tile, owner });
        }

        let scores = &self.scores;
        let team = &self.team;
        let terrain = &self.terrain;
        self.found_crowns.retain(|crown| {
            let alive = scores
                .iter()
                .find(|score| score.player == crown.owner)
                .is_some_and(|score| !score.dead);
            let captured = terrain
                .get(crown.tile)
                .and_then(|terrain| terrain.owner())
                .is_some_and(|owner| team.contains(owner));
            if !alive || captured {
                debug!(tile = crown.tile, owner = crown.owner, alive, captured, "dropping found crown");
            }
            alive && !captured
        });
    }

    fn compute_biggest_enemy(&self) -> Option<PlayerIndex> {
        // (player, visible tiles), in order of first encounter
        let mut tallies: Vec<(PlayerIndex, usize)> = Vec::new();
        for (index, terrain) in self.terrain.iter().enumerate() {
            let Terrain::Owned(owner) = *terrain else {
                continue;
            };
            if self.team.contains(owner) || !self.is_reachable(index) {
                continue;
            }
            match tallies.iter_mut().find(|(player, _)| *player == owner) {
                Some((_, count)) => *count += 1,
                None => tallies.push((owner, 1)),
            }
        }

        let mut best: Option<(PlayerIndex, usize)> = None;
        for (player, count) in tallies {
            if best.is_none_or(|(_, top)| count > top) {
                best = Some((player, count));
            }
        }
        best.map(|(player, _)| player)
    }

    /// The team this world is viewed from.
    #[must_use]
    pub const fn team(&self) -> &Team {
        &self.team
    }

    /// The agent's own player index.
    #[must_use]
    pub const fn me(&self) -> PlayerIndex {
        self.team.me()
    }

    /// Turn counter of the last applied update.
    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    /// Map dimensions.
    #[must_use]
    pub const fn grid(&self) -> Grid {
        self.grid
    }

    /// The agent's own crown tile, if visible.
    #[must_use]
    pub const fn crown(&self) -> Option<usize> {
        self.crown
    }

    /// Current score table.
    #[must_use]
    pub fn scores(&self) -> &[ScoreEntry] {
        &self.scores
    }

    /// Score entry for a player.
    #[must_use]
    pub fn score_of(&self, player: PlayerIndex) -> Option<&ScoreEntry> {
        self.scores.iter().find(|score| score.player == player)
    }

    /// The agent's own score entry.
    #[must_use]
    pub const fn my_score(&self) -> &ScoreEntry {
        &self.my_score
    }

    /// Per-tile army counts.
    #[must_use]
    pub fn armies(&self) -> &[i32] {
        &self.armies
    }

    /// Per-tile terrain.
    #[must_use]
    pub fn terrain(&self) -> &[Terrain] {
        &self.terrain
    }

    /// Army on a tile, 0 when out of range.
    #[must_use]
    pub fn army(&self, index: usize) -> i64 {
        self.armies.get(index).copied().map_or(0, i64::from)
    }

    /// Terrain of a tile; out-of-range tiles read as fog.
    #[must_use]
    pub fn terrain_at(&self, index: usize) -> Terrain {
        self.terrain.get(index).copied().unwrap_or(Terrain::Fog)
    }

    /// Known city locations, in first-seen order.
    #[must_use]
    pub fn cities(&self) -> &[usize] {
        &self.cities
    }

    /// Confirmed mountains.
    #[must_use]
    pub const fn mountains(&self) -> &BTreeSet<usize> {
        &self.mountains
    }

    /// Found enemy crowns, oldest first.
    #[must_use]
    pub fn found_crowns(&self) -> &[FoundCrown] {
        &self.found_crowns
    }

    /// Number of known cities the team currently holds.
    #[must_use]
    pub const fn owned_cities(&self) -> usize {
        self.owned_cities
    }

    /// Mean position of the team's tiles.
    #[must_use]
    pub const fn centroid(&self) -> Centroid {
        self.centroid
    }

    /// Team army divided by team tile count.
    #[must_use]
    pub const fn avg_tile_strength(&self) -> f64 {
        self.avg_tile_strength
    }

    /// Opponent with the most visible reachable tiles.
    #[must_use]
    pub const fn biggest_enemy(&self) -> Option<PlayerIndex> {
        self.biggest_enemy
    }

    /// Whether the tile is owned by the agent or an ally.
    #[must_use]
    pub fn is_team(&self, index: usize) -> bool {
        self.terrain_at(index)
            .owner()
            .is_some_and(|owner| self.team.contains(owner))
    }

    /// Whether the tile is owned by the agent itself.
    #[must_use]
    pub fn is_mine(&self, index: usize) -> bool {
        self.terrain_at(index).owner() == Some(self.team.me())
    }

    /// Whether the tile is a known or visible mountain.
    #[must_use]
    pub fn is_mountain(&self, index: usize) -> bool {
        self.mountains.contains(&index) || self.terrain_at(index) == Terrain::Mountain
    }

    /// Whether the tile is a known city.
    #[must_use]
    pub fn is_city(&self, index: usize) -> bool {
        self.cities.contains(&index)
    }

    /// Check that `mv` is legal to emit this turn.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::SourceLost`] unless the source is ours with more
    /// than one army, and [`PlanError::NotAdjacent`] unless the destination
    /// is a non-mountain 4-neighbour of it.
    pub fn check_move(&self, mv: Move) -> Result<(), PlanError> {
        if !self.is_mine(mv.from) || self.army(mv.from) <= 1 {
            return Err(PlanError::SourceLost { from: mv.from });
        }
        if !self.grid.contains(mv.to)
            || !self.grid.is_adjacent(mv.from, mv.to)
            || self.is_mountain(mv.to)
        {
            return Err(PlanError::NotAdjacent {
                from: mv.from,
                to: mv.to,
            });
        }
        Ok(())
    }

    /// Whether the tile is visibly owned, or borders an empty-or-owned tile.
    #[must_use]
    pub fn is_reachable(&self, index: usize) -> bool {
        if !self.grid.contains(index) {
            return false;
        }
        self.terrain_at(index).owner().is_some()
            || self
                .grid
                .neighbors(index)
                .any(|neighbor| self.terrain_at(neighbor).is_open())
    }
}

/// Split a flat map buffer into grid, armies and decoded terrain.
fn split_map(buf: &[i32]) -> Result<(Grid, Vec<i32>, Vec<Terrain>), WorldError> {
    let [raw_width, raw_height, rest @ ..] = buf else {
        return Err(WorldError::MissingHeader { len: buf.len() });
    };
    let invalid = WorldError::InvalidDimensions {
        width: *raw_width,
        height: *raw_height,
    };
    let (Ok(width), Ok(height)) = (usize::try_from(*raw_width), usize::try_from(*raw_height))
    else {
        return Err(invalid);
    };
    let size = width.checked_mul(height).ok_or(invalid)?;
    let grid = Grid::new(width, height).ok_or(invalid)?;

    let expected = size
        .checked_mul(2)
        .and_then(|n| n.checked_add(2))
        .unwrap_or(usize::MAX);
    if buf.len() != expected {
        return Err(WorldError::DimensionMismatch {
            width,
            height,
            len: buf.len(),
            expected,
        });
    }

    let (armies, codes) = rest.split_at(size);
    let terrain = codes
        .iter()
        .enumerate()
        .map(|(tile, &code)| Terrain::from_code(code).ok_or(WorldError::UnknownTerrain { tile, code }))
        .collect::<Result<Vec<_>, _>>()?;

    Ok((grid, armies.to_vec(), terrain))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::MapBuilder;

    fn score(player: PlayerIndex, total: i64, tiles: i64) -> ScoreEntry {
        ScoreEntry {
            player,
            total,
            tiles,
            dead: false,
        }
    }

    fn payload(turn: u32, map: &[i32], cities: &[i32], generals: Vec<i32>) -> TurnPayload {
        TurnPayload::full(turn, vec![score(0, 10, 2), score(1, 8, 2)], generals, cities, map)
    }

    #[test]
    fn test_update_splits_buffer() {
        let map = MapBuilder::new(3, 2).owned(0, 0, 5).owned(1, 0, 5).owned(5, 1, 4).build();
        let mut world = WorldState::new(Team::solo(0));
        let previous = world.update(&payload(1, &map, &[], vec![0, 5])).unwrap();

        assert!(previous.armies.is_empty());
        assert_eq!(world.grid().width(), 3);
        assert_eq!(world.grid().height(), 2);
        assert_eq!(world.army(0), 5);
        assert_eq!(world.terrain_at(5), Terrain::Owned(1));
        assert_eq!(world.crown(), Some(0));
        assert_eq!(world.found_crowns(), &[FoundCrown { tile: 5, owner: 1 }]);
    }

    #[test]
    fn test_update_returns_previous_buffers() {
        let first = MapBuilder::new(2, 2).owned(0, 0, 3).build();
        let second = MapBuilder::new(2, 2).owned(0, 0, 4).owned(1, 0, 1).build();
        let mut world = WorldState::new(Team::solo(0));
        world.update(&payload(1, &first, &[], vec![0, -1])).unwrap();
        let previous = world.update(&payload(2, &second, &[], vec![0, -1])).unwrap();

        assert_eq!(previous.armies, vec![3, 0, 0, 0]);
        assert_eq!(previous.terrain[1], Terrain::Empty);
        assert_eq!(world.army(0), 4);
    }

    #[test]
    fn test_dimension_mismatch_is_fatal_and_atomic() {
        let good = MapBuilder::new(2, 2).owned(0, 0, 3).build();
        let mut world = WorldState::new(Team::solo(0));
        world.update(&payload(1, &good, &[], vec![0, -1])).unwrap();

        let mut bad = good.clone();
        bad.push(7);
        let err = world.update(&payload(2, &bad, &[], vec![0, -1])).unwrap_err();
        assert!(matches!(err, WorldError::DimensionMismatch { len: 11, expected: 10, .. }));
        assert_eq!(world.turn(), 1);
        assert_eq!(world.army(0), 3);
    }

    #[test]
    fn test_malformed_diff_is_fatal() {
        let mut world = WorldState::new(Team::solo(0));
        let mut bad = payload(1, &[], &[], vec![0]);
        bad.map_diff = vec![0, 5, 1];
        let err = world.update(&bad).unwrap_err();
        assert!(matches!(err, WorldError::Patch { buffer: Buffer::Map, .. }));
    }

    #[test]
    fn test_unknown_terrain_is_fatal() {
        let map = MapBuilder::new(2, 1).tile(1, -9, 0).build();
        let mut world = WorldState::new(Team::solo(0));
        let err = world.update(&payload(1, &map, &[], vec![-1])).unwrap_err();
        assert_eq!(err, WorldError::UnknownTerrain { tile: 1, code: -9 });
    }

    #[test]
    fn test_cities_and_mountains_persist() {
        let first = MapBuilder::new(3, 3).owned(4, 0, 2).mountain(0).neutral(8, 40).build();
        let second = MapBuilder::new(3, 3).owned(4, 0, 2).fog_rest().build();
        let mut world = WorldState::new(Team::solo(0));
        world.update(&payload(1, &first, &[8], vec![4])).unwrap();
        world.update(&payload(2, &second, &[], vec![4])).unwrap();

        assert!(world.mountains().contains(&0));
        assert_eq!(world.cities(), &[8]);
        assert!(world.is_mountain(0));
    }

    #[test]
    fn test_aggregates() {
        let map = MapBuilder::new(4, 4)
            .owned(0, 0, 6)
            .owned(5, 0, 2)
            .owned(15, 1, 9)
            .build();
        let mut world = WorldState::new(Team::solo(0));
        world.update(&payload(1, &map, &[5, 15], vec![0, 15])).unwrap();

        assert_eq!(world.owned_cities(), 1);
        let centroid = world.centroid();
        assert!((centroid.row - 0.5).abs() < 1e-9);
        assert!((centroid.col - 0.5).abs() < 1e-9);
        assert!((world.avg_tile_strength() - 5.0).abs() < 1e-9);
        assert_eq!(world.my_score().total, 10);
    }

    #[test]
    fn test_dead_player_crown_pruned() {
        let map = MapBuilder::new(3, 1).owned(0, 0, 2).owned(2, 1, 2).build();
        let mut world = WorldState::new(Team::solo(0));
        world.update(&payload(1, &map, &[], vec![0, 2])).unwrap();
        assert_eq!(world.found_crowns().len(), 1);

        let mut next = payload(2, &map, &[], vec![0, -1]);
        next.scores[1].dead = true;
        world.update(&next).unwrap();
        assert!(world.found_crowns().is_empty());
    }

    #[test]
    fn test_captured_crown_pruned() {
        let map = MapBuilder::new(3, 1).owned(0, 0, 2).owned(2, 1, 2).build();
        let taken = MapBuilder::new(3, 1).owned(0, 0, 2).owned(2, 0, 5).build();
        let mut world = WorldState::new(Team::solo(0));
        world.update(&payload(1, &map, &[], vec![0, 2])).unwrap();
        world.update(&payload(2, &taken, &[], vec![0, -1])).unwrap();
        assert!(world.found_crowns().is_empty());
    }

    #[test]
    fn test_ally_crown_not_recorded() {
        let map = MapBuilder::new(3, 1).owned(0, 0, 2).owned(2, 1, 2).build();
        let mut world = WorldState::new(Team::with_allies(0, [1]));
        world.update(&payload(1, &map, &[], vec![0, 2])).unwrap();
        assert!(world.found_crowns().is_empty());
        assert_eq!(world.biggest_enemy(), None);
    }

    #[test]
    fn test_biggest_enemy_tie_keeps_first_seen() {
        let map = MapBuilder::new(4, 2)
            .owned(0, 2, 1)
            .owned(1, 1, 1)
            .owned(2, 1, 1)
            .owned(3, 2, 1)
            .owned(7, 0, 1)
            .build();
        let scores = vec![score(0, 1, 1), score(1, 2, 2), score(2, 2, 2)];
        let mut world = WorldState::new(Team::solo(0));
        world
            .update(&TurnPayload::full(1, scores, vec![7, -1, -1], &[], &map))
            .unwrap();
        assert_eq!(world.biggest_enemy(), Some(2));
    }

    #[test]
    fn test_reachability() {
        let map = MapBuilder::new(3, 3)
            .mountain(1)
            .mountain(3)
            .fog_obstacle(0)
            .fog(4)
            .fog(5)
            .fog(7)
            .owned(8, 0, 1)
            .build();
        let mut world = WorldState::new(Team::solo(0));
        world.update(&payload(1, &map, &[0], vec![8])).unwrap();
        // Corner 0 is boxed in by mountains.
        assert!(!world.is_reachable(0));
        // Tile 2 borders nothing open: 1 is a mountain, 5 is fog.
        assert!(!world.is_reachable(2));
        // Tile 5 borders our tile 8.
        assert!(world.is_reachable(5));
        assert!(world.is_reachable(8));
    }

    #[test]
    fn test_check_move() {
        // 0 1 M
        let map = MapBuilder::new(3, 2).owned(0, 0, 5).owned(1, 0, 1).mountain(2).build();
        let mut world = WorldState::new(Team::solo(0));
        world.update(&payload(1, &map, &[], vec![0, -1])).unwrap();

        assert!(world.check_move(Move { from: 0, to: 1 }).is_ok());
        assert!(world.check_move(Move { from: 0, to: 3 }).is_ok());
        assert_eq!(
            world.check_move(Move { from: 1, to: 4 }),
            Err(PlanError::SourceLost { from: 1 })
        );
        assert_eq!(
            world.check_move(Move { from: 0, to: 4 }),
            Err(PlanError::NotAdjacent { from: 0, to: 4 })
        );
        let moved = MapBuilder::new(3, 2).owned(1, 0, 9).mountain(2).build();
        world.update(&payload(2, &moved, &[], vec![1, -1])).unwrap();
        assert_eq!(
            world.check_move(Move { from: 1, to: 2 }),
            Err(PlanError::NotAdjacent { from: 1, to: 2 })
        );
    }
}
