//! Run command implementation.

use super::output::{JsonRunResult, format_move, format_text};
use super::{CliError, OutputFormat, load_tuning, recording_name};
use generalist::replay::{Recording, ReplayEngine, ReplayReport};
use std::io::{self, Write};
use std::path::PathBuf;

/// Execute the run command.
///
/// With `--format json` stdout carries only the JSON document; the per-turn
/// trace requested by `--paths` goes to stderr.
///
/// # Errors
///
/// Returns an error if the recording or tuning cannot be loaded.
pub(crate) fn execute(
    recording: PathBuf,
    format: OutputFormat,
    paths: bool,
    config: Option<PathBuf>,
    quiet: bool,
) -> Result<(), CliError> {
    let tuning = load_tuning(config.as_deref())?;
    let loaded = Recording::load(&recording)?;
    let name = recording_name(&recording);
    let chatty = format == OutputFormat::Text && !quiet;

    if chatty {
        println!(
            "Replaying {name} as player {} ({} turns)...",
            loaded.player_index,
            loaded.updates.len()
        );
        println!();
    }

    let mut engine = ReplayEngine::new(loaded, tuning);
    match format {
        OutputFormat::Text => play_turns(&mut engine, &mut io::stdout().lock(), paths, chatty)?,
        OutputFormat::Json => play_turns(&mut engine, &mut io::stderr().lock(), paths, false)?,
    }
    let report = engine.run_to_end();

    // Output based on format
    match format {
        OutputFormat::Text => {
            if chatty {
                println!();
            }
            print!("{}", format_text(&name, &report));
        }
        OutputFormat::Json => println!("{}", json_report(&name, &report)?),
    }

    Ok(())
}

/// Step through every remaining turn, writing the trace to `trace`.
///
/// `paths` adds a map render per turn; move lines are written when either
/// flag is set.
fn play_turns(
    engine: &mut ReplayEngine,
    trace: &mut dyn Write,
    paths: bool,
    moves: bool,
) -> Result<(), CliError> {
    while !engine.is_finished() {
        let record = engine.step_forward()?;
        if paths {
            writeln!(trace, "{}", engine.render())?;
        }
        if let Some(record) = record.filter(|_| moves || paths) {
            writeln!(trace, "{}", format_move(&record))?;
        }
    }
    Ok(())
}

fn json_report(name: &str, report: &ReplayReport) -> Result<String, CliError> {
    let json_result = JsonRunResult {
        recording: name,
        summary: report.summary,
        moves: &report.moves,
    };
    serde_json::to_string_pretty(&json_result)
        .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))
}
