//! Full-map scans that nominate objectives.

use crate::config::Tuning;
use crate::game::{Terrain, WorldState};

/// Most dangerous enemy tile near our crown.
///
/// Considers visible non-team tiles strictly closer than
/// [`Tuning::unsafe_distance`] to the crown and maximises
/// `army - distance`; ties keep scan order.
#[must_use]
pub fn closest_enemy(world: &WorldState, tuning: &Tuning) -> Option<usize> {
    let crown = world.crown()?;
    let grid = world.grid();
    let mut best: Option<(usize, i64)> = None;

    for (tile, terrain) in world.terrain().iter().enumerate() {
        let Terrain::Owned(owner) = *terrain else {
            continue;
        };
        if world.team().contains(owner) {
            continue;
        }
        let distance = grid.distance(crown, tile);
        if distance >= tuning.unsafe_distance {
            continue;
        }
        let score = world.army(tile) - i64::try_from(distance).unwrap_or(i64::MAX);
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((tile, score));
        }
    }

    best.map(|(tile, _)| tile)
}

/// Known, reachable city not held by the team, nearest to our crown.
#[must_use]
pub fn closest_city(world: &WorldState) -> Option<usize> {
    let crown = world.crown()?;
    let grid = world.grid();
    world
        .cities()
        .iter()
        .copied()
        .filter(|&city| is_open_city(world, city))
        .min_by_key(|&city| grid.distance(crown, city))
}

/// Reachable tile of the biggest enemy nearest to `head`.
#[must_use]
pub fn best_enemy_territory(world: &WorldState, head: usize) -> Option<usize> {
    let enemy = world.biggest_enemy()?;
    let grid = world.grid();
    world
        .terrain()
        .iter()
        .enumerate()
        .filter(|&(tile, &terrain)| terrain == Terrain::Owned(enemy) && world.is_reachable(tile))
        .map(|(tile, _)| tile)
        .min_by_key(|&tile| grid.distance(head, tile))
}

/// Whether the biggest enemy outguns us and sits close to our crown.
#[must_use]
pub fn biggest_enemy_is_threat(world: &WorldState, tuning: &Tuning) -> bool {
    let Some(enemy) = world.biggest_enemy() else {
        return false;
    };
    let stronger = world
        .score_of(enemy)
        .is_some_and(|score| score.total > world.my_score().total);
    if !stronger {
        return false;
    }
    let Some(crown) = world.crown() else {
        return false;
    };
    let grid = world.grid();
    world
        .terrain()
        .iter()
        .enumerate()
        .filter(|&(_, &terrain)| terrain == Terrain::Owned(enemy))
        .map(|(tile, _)| grid.distance(crown, tile))
        .min()
        .is_some_and(|distance| distance < tuning.threat_distance)
}

/// Whether this turn should be spent going after a city.
///
/// True when no stronger enemy is pressing on our crown, we hold fewer
/// cities than one per [`Tuning::city_interval`] turns, the turn falls on a
/// [`Tuning::city_check_period`] boundary, and some reachable city is free.
#[must_use]
pub fn should_get_cities(world: &WorldState, tuning: &Tuning) -> bool {
    let turn = world.turn();
    let expected = turn
        .checked_div(tuning.city_interval)
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0);
    let on_period = turn.checked_rem(tuning.city_check_period) == Some(0);

    on_period
        && world.owned_cities() < expected
        && !biggest_enemy_is_threat(world, tuning)
        && world.cities().iter().any(|&city| is_open_city(world, city))
}

fn is_open_city(world: &WorldState, city: usize) -> bool {
    !world.is_team(city) && world.is_reachable(city)
}
