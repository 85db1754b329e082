//! Projected arriving strength along a path.

use crate::config::Tuning;
use crate::game::{Terrain, WorldState};

/// Net army a move gains or loses passing through `tile`.
///
/// Team tiles add what they can spare, fogged obstacles cost a fixed
/// estimate, anything else costs its defenders plus one.
#[must_use]
pub fn tile_contribution(world: &WorldState, tile: usize, tuning: &Tuning) -> i64 {
    if world.is_team(tile) {
        world.army(tile) - 1
    } else if world.terrain_at(tile) == Terrain::FogObstacle {
        -tuning.fog_obstacle_cost
    } else {
        -(world.army(tile) + 1)
    }
}

/// Army expected to arrive at the last tile of `path`, before fighting it.
///
/// Sums [`tile_contribution`] over every tile but the last.
#[must_use]
pub fn projected_strength(world: &WorldState, path: &[usize], tuning: &Tuning) -> i64 {
    path.split_last().map_or(0, |(_, before)| {
        before
            .iter()
            .map(|&tile| tile_contribution(world, tile, tuning))
            .sum()
    })
}

/// What the team's own tiles along `path` can contribute, terminus included.
#[must_use]
pub fn team_contribution(world: &WorldState, path: &[usize]) -> i64 {
    path.iter()
        .filter(|&&tile| world.is_team(tile))
        .map(|&tile| world.army(tile) - 1)
        .sum()
}
