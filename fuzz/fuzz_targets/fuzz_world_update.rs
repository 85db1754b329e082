#![no_main]

use arbitrary::Arbitrary;
use generalist::game::{MapBuilder, ScoreEntry, Team, TurnPayload, check_invariants};
use generalist::{Agent, SessionConfig};
use libfuzzer_sys::fuzz_target;

/// One fuzzed turn.
#[derive(Arbitrary, Debug)]
struct TurnInput {
    /// Raw terrain codes, applied tile by tile.
    terrain: Vec<i8>,
    /// Raw armies, applied tile by tile.
    armies: Vec<u8>,
    /// City indices as sent by the server.
    cities: Vec<i16>,
    /// Crown per player.
    generals: [i16; 3],
    /// Whether player 1 has been eliminated.
    enemy_dead: bool,
    /// Send this raw diff instead of a well-formed map.
    raw_diff: Option<Vec<i16>>,
}

/// Structured input for world update fuzzing.
#[derive(Arbitrary, Debug)]
struct WorldInput {
    /// Map width (capped).
    width: u8,
    /// Map height (capped).
    height: u8,
    /// Turns to feed in order.
    turns: Vec<TurnInput>,
}

fuzz_target!(|input: WorldInput| {
    let width = usize::from(input.width % 12) + 1;
    let height = usize::from(input.height % 12) + 1;
    let size = width * height;

    let mut agent = Agent::new(SessionConfig::new(Team::with_allies(0, [2])));

    for (turn, fuzzed) in input.turns.iter().take(16).enumerate() {
        let mut builder = MapBuilder::new(width, height);
        for (tile, (&code, &army)) in fuzzed.terrain.iter().zip(&fuzzed.armies).take(size).enumerate() {
            builder = builder.tile(tile, i32::from(code).clamp(-4, 3), i32::from(army));
        }
        let mut scores: Vec<ScoreEntry> = (0..3).map(ScoreEntry::empty).collect();
        scores[1].dead = fuzzed.enemy_dead;
        let cities: Vec<i32> = fuzzed.cities.iter().map(|&c| i32::from(c)).collect();
        let generals: Vec<i32> = fuzzed.generals.iter().map(|&g| i32::from(g)).collect();

        let mut payload = TurnPayload::full(
            u32::try_from(turn).unwrap_or(u32::MAX),
            scores,
            generals,
            &cities,
            &builder.build(),
        );
        if let Some(raw) = &fuzzed.raw_diff {
            payload.map_diff = raw.iter().map(|&v| i32::from(v)).collect();
        }

        let before = agent.world().turn();
        match agent.play(&payload) {
            Ok(Some(action)) => {
                let mv = action.mv;
                let world = agent.world();
                assert!(world.is_mine(mv.from), "move from a tile we do not own");
                assert!(world.grid().is_adjacent(mv.from, mv.to), "move to a non-neighbour");
                assert!(!world.is_mountain(mv.to), "move into a mountain");
            }
            Ok(None) => {}
            Err(_) => {
                // Failed updates leave the world untouched.
                assert_eq!(agent.world().turn(), before);
                continue;
            }
        }

        // Fuzzed terrain may legitimately break the crown check, but the
        // buffers must always agree with the grid.
        let world = agent.world();
        assert_eq!(world.armies().len(), world.grid().size());
        assert_eq!(world.terrain().len(), world.grid().size());
        let _ = check_invariants(world);
    }
});
