#![no_main]

use arbitrary::Arbitrary;
use generalist::game::{full_replacement, patch};
use libfuzzer_sys::fuzz_target;

/// Structured input for diff fuzzing.
#[derive(Arbitrary, Debug)]
struct PatchInput {
    /// Buffer from the previous turn.
    previous: Vec<i32>,
    /// Diff as sent by the server (may be malformed).
    diff: Vec<i32>,
}

fuzz_target!(|input: PatchInput| {
    // Length markers are capped to keep allocations small.
    let diff: Vec<i32> = input.diff.iter().map(|&v| v.clamp(-8, 4096)).collect();

    if let Ok(out) = patch(&input.previous, &diff) {
        // A match run never copies past the end of the previous buffer and
        // every other element comes from a literal.
        assert!(out.len() <= input.previous.len() + diff.len());

        // Replacing the result outright must reproduce it.
        let again = patch(&input.previous, &full_replacement(&out))
            .expect("full replacement is always well formed");
        assert_eq!(again, out);
    }
});
