//! Gathering army onto a committed target path.

use tracing::debug;

use super::TargetKind;
use super::strength::{projected_strength, team_contribution, tile_contribution};
use crate::config::Tuning;
use crate::game::WorldState;
use crate::path::{PathSearch, SearchMode};

/// A route from one of our tiles onto the target path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatherRoute {
    /// Tiles from the source to a waypoint of the target path.
    pub path: Vec<usize>,
    /// Army the route adds, counting only tiles off the target path.
    pub score: i64,
}

/// Best gather route onto `target_path`, by score.
///
/// Every tile of ours holding more than one army and not already on the
/// target path is a candidate source. Each is routed in
/// [`SearchMode::Gather`] to its nearest waypoint, terminus excluded. Ties
/// keep the first source in scan order.
#[must_use]
pub fn best_gather_route(
    world: &WorldState,
    target_path: &[usize],
    tuning: &Tuning,
) -> Option<GatherRoute> {
    let (_, waypoints) = target_path.split_last()?;
    if waypoints.is_empty() {
        return None;
    }
    let grid = world.grid();
    let search = PathSearch::new(world, tuning);
    let mut best: Option<GatherRoute> = None;

    for source in 0..grid.size() {
        if !world.is_mine(source) || world.army(source) <= 1 || target_path.contains(&source) {
            continue;
        }
        let Some(waypoint) = waypoints
            .iter()
            .copied()
            .min_by_key(|&waypoint| grid.distance(source, waypoint))
        else {
            continue;
        };
        let path = search.search(source, waypoint, SearchMode::Gather);
        if path.len() < 2 {
            continue;
        }
        let score = path
            .iter()
            .filter(|tile| !target_path.contains(tile))
            .map(|&tile| tile_contribution(world, tile, tuning))
            .sum();
        if best.as_ref().is_none_or(|top| score > top.score) {
            best = Some(GatherRoute { path, score });
        }
    }

    best
}

/// Gather path worth walking before pressing on along `target_path`.
///
/// Crown kills never wait. Otherwise a gather is taken when the target path
/// alone cannot beat its terminus, or, against enemy territory, when the
/// gather outweighs what the target path already holds and is short
/// relative to the map.
#[must_use]
pub fn plan_gather(
    world: &WorldState,
    kind: TargetKind,
    target_path: &[usize],
    tuning: &Tuning,
) -> Option<Vec<usize>> {
    if kind == TargetKind::KillCrown {
        return None;
    }
    let &terminus = target_path.last()?;
    let route = best_gather_route(world, target_path, tuning)?;

    let arriving = projected_strength(world, target_path, tuning);
    let defenders = world.army(terminus);
    let too_weak = arriving <= defenders;

    let grid = world.grid();
    let worthwhile = kind == TargetKind::EnemyTerritory
        && route.score > team_contribution(world, target_path)
        && 4 * route.path.len() < grid.width() + grid.height();

    if too_weak || worthwhile {
        debug!(
            %kind,
            arriving,
            defenders,
            score = route.score,
            length = route.path.len(),
            "gathering"
        );
        Some(route.path)
    } else {
        None
    }
}
