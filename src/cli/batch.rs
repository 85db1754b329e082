//! Batch command implementation.

use super::output::{BatchStats, JsonBatchResult, format_batch_csv, format_batch_text};
use super::{BatchFormat, CliError, load_tuning, recording_name};
use generalist::replay::{Recording, replay};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::PathBuf;
use std::time::Instant;
use tracing::warn;

/// Execute the batch command.
///
/// # Errors
///
/// Returns an error if the tuning cannot be loaded or output fails.
pub(crate) fn execute(
    recordings: Vec<PathBuf>,
    threads: Option<usize>,
    config: Option<PathBuf>,
    format: BatchFormat,
    progress: bool,
) -> Result<(), CliError> {
    let tuning = load_tuning(config.as_deref())?;

    // Set thread pool size if specified
    if let Some(num_threads) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    // Progress bar
    let pb = if progress {
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} recordings ({per_sec})")
            .map_err(|e| CliError::new(format!("Invalid progress template: {e}")))?
            .progress_chars("=>-");
        let pb = ProgressBar::new(recordings.len() as u64);
        pb.set_style(style);
        Some(pb)
    } else {
        None
    };

    let start = Instant::now();

    // Each thread accumulates into its own BatchStats, merged at the end
    let mut stats = recordings
        .par_iter()
        .fold(BatchStats::default, |mut local_stats, path| {
            let name = recording_name(path);
            match Recording::load(path) {
                Ok(recording) => {
                    let report = replay(recording, tuning);
                    local_stats.add_report(name, &report);
                }
                Err(e) => {
                    warn!(recording = %path.display(), error = %e, "skipping recording");
                    local_stats.add_failure(name, e.to_string());
                }
            }
            if let Some(pb) = &pb {
                pb.inc(1);
            }
            local_stats
        })
        .reduce(BatchStats::default, |mut a, b| {
            a.merge(b);
            a
        });
    stats.sort();

    if let Some(pb) = pb {
        pb.finish_with_message("done");
    }

    let duration = start.elapsed();

    // Output based on format
    match format {
        BatchFormat::Text => {
            println!();
            print!("{}", format_batch_text(&stats));
            println!();
            println!("Duration: {:.2}s", duration.as_secs_f64());
        }
        BatchFormat::Json => {
            let json_result = JsonBatchResult::from_stats(&stats);
            let json = serde_json::to_string_pretty(&json_result)
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
        BatchFormat::Csv => {
            print!("{}", format_batch_csv(&stats));
        }
    }

    Ok(())
}
