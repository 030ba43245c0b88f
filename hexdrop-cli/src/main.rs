//! HEXDROP CLI - Command-line interface
//!
//! Commands:
//! - solve: Search every seed of one or more puzzles and print solutions
//! - score: Replay solutions against a puzzle and report their scores

mod score_cmd;
mod solve_cmd;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hexdrop")]
#[command(about = "HEXDROP falling hex-piece puzzle solver")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve puzzles and print the solution array as JSON
    Solve(solve_cmd::SolveArgs),
    /// Replay a solution file and print per-seed scores
    Score(score_cmd::ScoreArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays pure JSON
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Solve(args) => solve_cmd::run(args),
        Commands::Score(args) => score_cmd::run(args),
    }
}
