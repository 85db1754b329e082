//! Output formatting utilities for CLI.

use std::collections::BTreeMap;
use std::fmt::Write;

use generalist::agent::{SessionSummary, TurnMove};
use generalist::planner::TargetKind;
use generalist::replay::ReplayReport;
use serde::Serialize;

/// JSON-serializable result of replaying one recording.
#[derive(Debug, Serialize)]
pub(super) struct JsonRunResult<'a> {
    /// Recording file name.
    pub(super) recording: &'a str,
    /// Counters for the run.
    pub(super) summary: SessionSummary,
    /// Moves sent, in order.
    pub(super) moves: &'a [TurnMove],
}

/// Name used for a move's origin in summaries.
pub(super) fn kind_label(kind: Option<TargetKind>) -> String {
    kind.map_or_else(|| "explore".to_string(), |kind| kind.to_string())
}

/// One move as a text line.
pub(super) fn format_move(record: &TurnMove) -> String {
    format!(
        "  turn {:>4}: {} [{}]",
        record.turn,
        record.mv,
        kind_label(record.kind)
    )
}

/// Count moves by the target kind behind them.
pub(super) fn moves_by_kind(moves: &[TurnMove]) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for record in moves {
        *counts.entry(kind_label(record.kind)).or_insert(0) += 1;
    }
    counts
}

/// Format a replay report as human-readable text.
pub(super) fn format_text(name: &str, report: &ReplayReport) -> String {
    let summary = &report.summary;
    let mut output = String::new();

    let _ = writeln!(output, "Replay Result ({name})");
    let _ = writeln!(output, "  Turns:   {} (last turn {})", summary.turns, summary.last_turn);
    let _ = writeln!(output, "  Moves:   {} ({} planned)", summary.moves, summary.planned);
    let _ = writeln!(output, "  Idle:    {}", summary.idle);
    let _ = writeln!(output, "  Skipped: {}", summary.skipped);
    output.push('\n');

    for (kind, count) in moves_by_kind(&report.moves) {
        let _ = writeln!(output, "  {kind:<16} {count}");
    }

    output
}

/// Per-recording line of a batch run.
#[derive(Debug, Clone, Serialize)]
pub(super) struct BatchRow {
    /// Recording file name.
    pub(super) recording: String,
    /// Counters for the run; absent when the recording failed to load.
    pub(super) summary: Option<SessionSummary>,
    /// Load failure, if any.
    pub(super) error: Option<String>,
}

/// Batch statistics for aggregated results.
#[derive(Debug, Default)]
pub(super) struct BatchStats {
    /// Recordings replayed successfully.
    pub(super) replayed: u64,
    /// Recordings that failed to load.
    pub(super) failed: u64,
    /// Counters summed over all replayed recordings.
    pub(super) totals: SessionSummary,
    /// Move count per target kind.
    pub(super) kinds: BTreeMap<String, u64>,
    /// One row per recording.
    pub(super) rows: Vec<BatchRow>,
}

impl BatchStats {
    /// Add a replayed recording to the stats.
    pub(super) fn add_report(&mut self, name: String, report: &ReplayReport) {
        self.replayed += 1;
        self.totals.merge(&report.summary);
        for (kind, count) in moves_by_kind(&report.moves) {
            *self.kinds.entry(kind).or_insert(0) += count;
        }
        self.rows.push(BatchRow {
            recording: name,
            summary: Some(report.summary),
            error: None,
        });
    }

    /// Add a recording that could not be replayed.
    pub(super) fn add_failure(&mut self, name: String, error: String) {
        self.failed += 1;
        self.rows.push(BatchRow {
            recording: name,
            summary: None,
            error: Some(error),
        });
    }

    /// Merge another stats accumulator into this one.
    pub(super) fn merge(&mut self, other: Self) {
        self.replayed += other.replayed;
        self.failed += other.failed;
        self.totals.merge(&other.totals);
        for (kind, count) in other.kinds {
            *self.kinds.entry(kind).or_insert(0) += count;
        }
        self.rows.extend(other.rows);
    }

    /// Sort rows by recording name for stable output.
    pub(super) fn sort(&mut self) {
        self.rows.sort_by(|a, b| a.recording.cmp(&b.recording));
    }

    /// Fraction of moves that came from a planner target (0.0-1.0).
    pub(super) fn planned_rate(&self) -> f64 {
        if self.totals.moves == 0 {
            return 0.0;
        }
        f64::from(self.totals.planned) / f64::from(self.totals.moves)
    }
}

/// JSON-serializable batch result.
#[derive(Debug, Serialize)]
pub(super) struct JsonBatchResult<'a> {
    /// Recordings replayed successfully.
    replayed: u64,
    /// Recordings that failed to load.
    failed: u64,
    /// Counters summed over all replayed recordings.
    totals: SessionSummary,
    /// Fraction of moves driven by a planner target.
    planned_rate: f64,
    /// Move count per target kind.
    kinds: &'a BTreeMap<String, u64>,
    /// One row per recording.
    recordings: &'a [BatchRow],
}

impl<'a> JsonBatchResult<'a> {
    /// Create from stats.
    pub(super) fn from_stats(stats: &'a BatchStats) -> Self {
        Self {
            replayed: stats.replayed,
            failed: stats.failed,
            totals: stats.totals,
            planned_rate: stats.planned_rate(),
            kinds: &stats.kinds,
            recordings: &stats.rows,
        }
    }
}

/// Format batch stats as human-readable text.
pub(super) fn format_batch_text(stats: &BatchStats) -> String {
    let mut output = String::new();

    let _ = writeln!(
        output,
        "Batch Results ({} replayed, {} failed)",
        stats.replayed, stats.failed
    );
    output.push_str("========================================\n\n");

    let totals = &stats.totals;
    let _ = writeln!(output, "Turns:   {}", totals.turns);
    let _ = writeln!(
        output,
        "Moves:   {} ({:.1}% planned)",
        totals.moves,
        stats.planned_rate() * 100.0
    );
    let _ = writeln!(output, "Idle:    {}", totals.idle);
    let _ = writeln!(output, "Skipped: {}\n", totals.skipped);

    output.push_str("Moves by target:\n");
    for (kind, count) in &stats.kinds {
        let _ = writeln!(output, "  {kind:<16} {count}");
    }

    let failures: Vec<&BatchRow> = stats.rows.iter().filter(|row| row.error.is_some()).collect();
    if !failures.is_empty() {
        output.push_str("\nFailures:\n");
        for row in failures {
            let _ = writeln!(
                output,
                "  {}: {}",
                row.recording,
                row.error.as_deref().unwrap_or_default()
            );
        }
    }

    output
}

/// Format batch stats as CSV.
pub(super) fn format_batch_csv(stats: &BatchStats) -> String {
    let mut output = String::new();

    // Header
    output.push_str("recording,turns,moves,planned,idle,skipped,error\n");

    // Data rows
    for row in &stats.rows {
        let summary = row.summary.unwrap_or_default();
        let _ = writeln!(
            output,
            "{},{},{},{},{},{},{}",
            row.recording,
            summary.turns,
            summary.moves,
            summary.planned,
            summary.idle,
            summary.skipped,
            row.error.as_deref().unwrap_or_default().replace(',', ";")
        );
    }

    output
}
