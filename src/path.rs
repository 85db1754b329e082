//! Combat-cost shortest paths over the grid.
//!
//! Entering a tile costs what the move is expected to lose there:
//!
//! | Tile                  | Direct mode        | Gather mode            |
//! |-----------------------|--------------------|------------------------|
//! | team-owned            | `army - 1`         | 0 if `army > 1`, else 1 |
//! | fog obstacle          | fog obstacle cost  | fog obstacle cost      |
//! | anything else         | `army + 1`         | `army + 1`             |
//! | mountain              | never entered      | never entered          |
//!
//! Paths are ranked by `(cost, tiles)`, so equal-cost routes prefer fewer
//! tiles. The search is A* with a taxicab heuristic on the tile count and
//! visits each tile at most a bounded number of times.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::config::Tuning;
use crate::game::{Terrain, WorldState};

/// How team-owned tiles are weighed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// Reach a contested objective: leaving garrisons behind has a cost.
    #[default]
    Direct,
    /// Mass strength: routes through army-rich own tiles are free.
    Gather,
}

#[derive(Debug)]
struct OpenNode {
    cost: i64,
    estimate: usize,
    steps: usize,
    tile: usize,
    tie: u64,
}

impl OpenNode {
    fn key(&self) -> (i64, usize, u64) {
        (self.cost, self.estimate, self.tie)
    }
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for OpenNode {}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap behave like a min-heap.
        other.key().cmp(&self.key())
    }
}

/// Path search over one turn's world.
#[derive(Debug, Clone, Copy)]
pub struct PathSearch<'a> {
    world: &'a WorldState,
    fog_obstacle_cost: i64,
}

impl<'a> PathSearch<'a> {
    /// Search over `world` using the tuning's fog obstacle cost.
    #[must_use]
    pub fn new(world: &'a WorldState, tuning: &Tuning) -> Self {
        Self {
            world,
            fog_obstacle_cost: tuning.fog_obstacle_cost,
        }
    }

    /// Cost of moving into `tile`.
    #[must_use]
    pub fn step_cost(&self, tile: usize, mode: SearchMode) -> i64 {
        let army = self.world.army(tile).max(0);
        if self.world.is_team(tile) {
            return match mode {
                SearchMode::Direct => (army - 1).max(0),
                SearchMode::Gather => i64::from(army <= 1),
            };
        }
        if self.world.terrain_at(tile) == Terrain::FogObstacle {
            return self.fog_obstacle_cost;
        }
        army + 1
    }

    /// Cheapest path from `start` to `end`, both inclusive.
    ///
    /// Returns an empty path when either end is off the map or a mountain, or
    /// when mountains separate them.
    #[must_use]
    pub fn search(&self, start: usize, end: usize, mode: SearchMode) -> Vec<usize> {
        let grid = self.world.grid();
        if !grid.contains(start) || !grid.contains(end) {
            return Vec::new();
        }
        if self.world.is_mountain(start) || self.world.is_mountain(end) {
            return Vec::new();
        }
        if start == end {
            return vec![start];
        }

        let size = grid.size();
        let mut best: Vec<Option<(i64, usize)>> = vec![None; size];
        let mut came_from: Vec<Option<usize>> = vec![None; size];
        let mut open = BinaryHeap::new();
        let mut tie: u64 = 0;

        best[start] = Some((0, 0));
        open.push(OpenNode {
            cost: 0,
            estimate: grid.distance(start, end),
            steps: 0,
            tile: start,
            tie,
        });

        while let Some(node) = open.pop() {
            if node.tile == end {
                return reconstruct(&came_from, end);
            }
            if best[node.tile] != Some((node.cost, node.steps)) {
                // Stale heap entry.
                continue;
            }

            for next in grid.neighbors(node.tile) {
                if self.world.is_mountain(next) {
                    continue;
                }
                let candidate = (node.cost + self.step_cost(next, mode), node.steps + 1);
                if best[next].is_some_and(|known| candidate >= known) {
                    continue;
                }
                best[next] = Some(candidate);
                came_from[next] = Some(node.tile);
                tie += 1;
                open.push(OpenNode {
                    cost: candidate.0,
                    estimate: candidate.1 + grid.distance(next, end),
                    steps: candidate.1,
                    tile: next,
                    tie,
                });
            }
        }

        Vec::new()
    }

    /// Total entry cost of a path, excluding its first tile.
    #[must_use]
    pub fn path_cost(&self, path: &[usize], mode: SearchMode) -> i64 {
        path.iter().skip(1).map(|&tile| self.step_cost(tile, mode)).sum()
    }
}

fn reconstruct(came_from: &[Option<usize>], mut current: usize) -> Vec<usize> {
    let mut out = vec![current];
    while let Some(prev) = came_from[current] {
        current = prev;
        out.push(current);
    }
    out.reverse();
    out
}
