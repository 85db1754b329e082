//! Generalist CLI - Command-line interface for replaying recorded games.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Generalist - decision core for a fog-of-war territory capture bot
#[derive(Parser, Debug)]
#[command(name = "generalist")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log planner decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay one recording through the agent
    Run {
        /// Recording file (.json)
        #[arg(required = true)]
        recording: PathBuf,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Draw the map with the planned paths after every turn (stderr with --format json)
        #[arg(long)]
        paths: bool,

        /// Tuning file (JSON)
        #[arg(short, long, env = "GENERALIST_CONFIG")]
        config: Option<PathBuf>,

        /// Suppress turn-by-turn output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Replay many recordings in parallel and aggregate statistics
    Batch {
        /// Recording files
        #[arg(required = true)]
        recordings: Vec<PathBuf>,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Tuning file (JSON)
        #[arg(short, long, env = "GENERALIST_CONFIG")]
        config: Option<PathBuf>,

        /// Output format: text, json, or csv
        #[arg(short, long, default_value = "text")]
        format: cli::BatchFormat,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,
    },

    /// Rebuild every turn of a recording and check world invariants
    Validate {
        /// Recording file to validate
        #[arg(required = true)]
        recording: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let result = match args.command {
        Commands::Run {
            recording,
            format,
            paths,
            config,
            quiet,
        } => cli::run::execute(recording, format, paths, config, quiet),

        Commands::Batch {
            recordings,
            threads,
            config,
            format,
            progress,
        } => cli::batch::execute(recordings, threads, config, format, progress),

        Commands::Validate { recording } => cli::validate::execute(recording),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
