//! Fallback movement when the planner has no target.

use std::collections::HashMap;

use crate::game::{Move, Terrain, WorldState};

/// Picks a move when there is nothing to attack.
pub trait Explorer {
    /// Next move for the army on `head`, if any.
    fn next_move(&mut self, world: &WorldState, head: usize) -> Option<Move>;

    /// Called when the agent moves its head somewhere new without stepping.
    fn reset(&mut self, _head: usize) {}
}

/// Grabs the weakest beatable neighbour, otherwise walks outward through own
/// land, preferring tiles it has visited least since the last reset.
#[derive(Debug, Clone, Default)]
pub struct Frontier {
    visits: HashMap<usize, u32>,
}

impl Frontier {
    /// Explorer with an empty trail.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Times `tile` has been stepped onto since the last reset.
    #[must_use]
    pub fn visits(&self, tile: usize) -> u32 {
        self.visits.get(&tile).copied().unwrap_or(0)
    }

    fn capture(world: &WorldState, head: usize) -> Option<usize> {
        let army = world.army(head);
        world
            .grid()
            .neighbors(head)
            .filter(|&tile| {
                !world.is_team(tile)
                    && !world.is_mountain(tile)
                    && world.terrain_at(tile) != Terrain::FogObstacle
                    && army - 1 > world.army(tile)
            })
            .min_by_key(|&tile| world.army(tile))
    }

    fn outward(&self, world: &WorldState, head: usize) -> Option<usize> {
        let centroid = world.centroid();
        let grid = world.grid();
        let mut best: Option<(usize, u32, f64)> = None;

        for tile in grid.neighbors(head) {
            if !world.is_team(tile) || world.is_mountain(tile) {
                continue;
            }
            let coord = grid.coord(tile);
            #[allow(clippy::cast_precision_loss)]
            let (row, col) = (coord.row as f64, coord.col as f64);
            let spread = (row - centroid.row).powi(2) + (col - centroid.col).powi(2);
            let visits = self.visits(tile);
            let better = best.is_none_or(|(_, fewest, widest)| {
                visits < fewest || (visits == fewest && spread > widest)
            });
            if better {
                best = Some((tile, visits, spread));
            }
        }

        best.map(|(tile, _, _)| tile)
    }
}

impl Explorer for Frontier {
    fn next_move(&mut self, world: &WorldState, head: usize) -> Option<Move> {
        if !world.is_mine(head) || world.army(head) <= 1 {
            return None;
        }
        let to = Self::capture(world, head).or_else(|| self.outward(world, head))?;
        *self.visits.entry(to).or_insert(0) += 1;
        Some(Move { from: head, to })
    }

    fn reset(&mut self, head: usize) {
        self.visits.clear();
        self.visits.insert(head, 1);
    }
}
