//! Property-based tests for diff patching, world reconstruction and path search.
//!
//! Run with: cargo test --release prop_world

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use proptest::prelude::*;

use generalist::game::{
    MapBuilder, ScoreEntry, Team, TurnPayload, WorldState, check_invariants, full_replacement,
    patch,
};
use generalist::{PathSearch, SearchMode, Tuning};

const WIDTH: usize = 6;
const HEIGHT: usize = 6;

fn scores() -> Vec<ScoreEntry> {
    vec![ScoreEntry::empty(0), ScoreEntry::empty(1)]
}

/// A 6x6 world with mountains where `walls` is set.
fn walled_world(walls: &[bool]) -> WorldState {
    let mut builder = MapBuilder::new(WIDTH, HEIGHT);
    for (index, &wall) in walls.iter().enumerate() {
        if wall {
            builder = builder.mountain(index);
        }
    }
    let mut world = WorldState::new(Team::solo(0));
    world
        .update(&TurnPayload::full(1, scores(), vec![-1, -1], &[], &builder.build()))
        .unwrap();
    world
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2000))]

    /// A full-replacement diff yields the new buffer whatever came before.
    #[test]
    fn prop_full_replacement_ignores_previous(
        previous in prop::collection::vec(any::<i32>(), 0..64),
        next in prop::collection::vec(any::<i32>(), 0..64)
    ) {
        prop_assert_eq!(patch(&previous, &full_replacement(&next)).unwrap(), next);
    }

    /// A single match run over the whole buffer is the identity.
    #[test]
    fn prop_whole_match_is_identity(previous in prop::collection::vec(any::<i32>(), 1..64)) {
        let diff = vec![i32::try_from(previous.len()).unwrap()];
        prop_assert_eq!(patch(&previous, &diff).unwrap(), previous);
    }

    /// Arbitrary diffs never panic, and a successful patch is bounded by its inputs.
    #[test]
    fn prop_patch_never_panics(
        previous in prop::collection::vec(any::<i32>(), 0..32),
        diff in prop::collection::vec(-4i32..40, 0..48)
    ) {
        if let Ok(out) = patch(&previous, &diff) {
            prop_assert!(out.len() <= previous.len() + diff.len());
        }
    }

    /// Any path found is an adjacent, mountain-free chain between the endpoints.
    #[test]
    fn prop_path_is_walkable(
        walls in prop::collection::vec(prop::bool::weighted(0.25), WIDTH * HEIGHT),
        start in 0..WIDTH * HEIGHT,
        end in 0..WIDTH * HEIGHT,
        gather in any::<bool>()
    ) {
        let world = walled_world(&walls);
        let tuning = Tuning::default();
        let mode = if gather { SearchMode::Gather } else { SearchMode::Direct };
        let path = PathSearch::new(&world, &tuning).search(start, end, mode);

        if walls[start] || walls[end] {
            prop_assert!(path.is_empty());
        }
        if !path.is_empty() {
            prop_assert_eq!(path.first(), Some(&start));
            prop_assert_eq!(path.last(), Some(&end));
            let grid = world.grid();
            for pair in path.windows(2) {
                prop_assert!(grid.is_adjacent(pair[0], pair[1]));
            }
            for &tile in &path {
                prop_assert!(!world.is_mountain(tile));
            }
        }
    }

    /// Without mountains every pair of tiles is connected.
    #[test]
    fn prop_open_map_always_connects(
        start in 0..WIDTH * HEIGHT,
        end in 0..WIDTH * HEIGHT
    ) {
        let world = walled_world(&[]);
        let tuning = Tuning::default();
        let path = PathSearch::new(&world, &tuning).search(start, end, SearchMode::Direct);
        prop_assert!(!path.is_empty());
        prop_assert!(path.len() > world.grid().distance(start, end));
    }

    /// Known mountains and cities only ever grow across updates.
    #[test]
    fn prop_mountains_and_cities_accumulate(
        turns in prop::collection::vec(
            (
                prop::collection::vec(prop::bool::weighted(0.2), WIDTH * HEIGHT),
                prop::collection::vec(0i32..6, 0..4),
            ),
            1..6
        )
    ) {
        let mut world = WorldState::new(Team::solo(0));
        let mut previous_mountains = world.mountains().clone();
        let mut previous_cities = world.cities().to_vec();

        for (turn, (walls, cities)) in turns.iter().enumerate() {
            // Cities stay on the top row, mountains below it.
            let mut builder = MapBuilder::new(WIDTH, HEIGHT).fog_rest();
            for (index, &wall) in walls.iter().enumerate() {
                if wall && index >= WIDTH {
                    builder = builder.mountain(index);
                }
            }
            let payload = TurnPayload::full(
                u32::try_from(turn).unwrap(),
                scores(),
                vec![-1, -1],
                cities,
                &builder.build(),
            );
            world.update(&payload).unwrap();

            prop_assert!(previous_mountains.is_subset(world.mountains()));
            for city in &previous_cities {
                prop_assert!(world.cities().contains(city));
            }
            prop_assert!(check_invariants(&world).is_empty());
            previous_mountains = world.mountains().clone();
            previous_cities = world.cities().to_vec();
        }
    }

    /// A malformed update is rejected without touching the world.
    #[test]
    fn prop_rejected_update_changes_nothing(
        diff in prop::collection::vec(-4i32..80, 0..24)
    ) {
        let mut world = WorldState::new(Team::solo(0));
        let map = MapBuilder::new(3, 3).owned(4, 0, 5).build();
        world
            .update(&TurnPayload::full(1, scores(), vec![4, -1], &[], &map))
            .unwrap();
        let armies = world.armies().to_vec();
        let terrain = world.terrain().to_vec();

        let payload = TurnPayload {
            turn: 2,
            scores: scores(),
            generals: vec![4, -1],
            cities_diff: vec![0],
            map_diff: diff,
        };
        if world.update(&payload).is_err() {
            prop_assert_eq!(world.turn(), 1);
            prop_assert_eq!(world.armies(), armies.as_slice());
            prop_assert_eq!(world.terrain(), terrain.as_slice());
        }
    }
}
