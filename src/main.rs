//! Skirmish CLI - host matches between two agent programs.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

/// Skirmish - a turn-synchronized match engine
#[derive(Parser, Debug)]
#[command(name = "skirmish")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Host a match between two agent executables
    Run {
        /// Agent executables (exactly 2 required)
        #[arg(required = true, num_args = 2)]
        agents: Vec<PathBuf>,

        /// Maximum turns (default: 500)
        #[arg(short, long, default_value = "500")]
        turns: u32,

        /// Per-turn reply timeout in milliseconds (default: 1000)
        #[arg(long, default_value = "1000")]
        turn_timeout_ms: u64,

        /// Total wall-clock budget in seconds (default: 90)
        #[arg(long, default_value = "90")]
        duration_s: u64,

        /// Where to write the game log
        #[arg(short, long, default_value = "game.json")]
        log: PathBuf,
    },

    /// Print the outcome recorded in a game log
    Summary {
        /// Game log file
        #[arg(required = true)]
        log: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let result = match args.command {
        Commands::Run {
            agents,
            turns,
            turn_timeout_ms,
            duration_s,
            log,
        } => cli::run::execute(&agents, turns, turn_timeout_ms, duration_s, &log),

        Commands::Summary { log } => cli::summary::execute(&log),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
