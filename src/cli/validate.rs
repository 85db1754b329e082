//! Recording validation command implementation.

use super::CliError;
use generalist::game::{WorldState, check_invariants};
use generalist::replay::Recording;
use std::path::PathBuf;

/// Execute the validate command.
///
/// Rebuilds the world turn by turn and checks every invariant after each
/// update.
///
/// # Errors
///
/// Returns an error if the recording cannot be read or any turn fails.
pub(crate) fn execute(recording: PathBuf) -> Result<(), CliError> {
    let loaded = Recording::load(&recording)?;

    println!("Validating: {}", recording.display());
    println!();

    let mut world = WorldState::new(loaded.team());
    let mut rejected = 0usize;
    let mut violations = 0usize;

    for (index, payload) in loaded.updates.iter().enumerate() {
        if let Err(e) = world.update(payload) {
            rejected += 1;
            println!("  ✗ update {index} (turn {}): {e}", payload.turn);
            continue;
        }
        for violation in check_invariants(&world) {
            violations += 1;
            println!("  ✗ update {index} (turn {}): {violation}", payload.turn);
        }
    }

    print_check("All updates applied", rejected == 0);
    print_check("Invariants hold", violations == 0);

    println!();
    println!("Summary:");
    println!("  Updates:    {}", loaded.updates.len());
    println!("  Rejected:   {rejected}");
    println!("  Violations: {violations}");
    println!(
        "  Final map:  {}x{}",
        world.grid().width(),
        world.grid().height()
    );

    if rejected > 0 || violations > 0 {
        return Err(CliError::new(format!(
            "{rejected} rejected updates, {violations} invariant violations"
        )));
    }

    println!();
    println!("Validation successful!");

    Ok(())
}

fn print_check(name: &str, ok: bool) {
    let status = if ok { "OK" } else { "FAILED" };
    let symbol = if ok { "✓" } else { "✗" };
    println!("  {symbol} {name}: {status}");
}
