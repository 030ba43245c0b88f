//! Score command - replay solutions against their puzzle
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: score_solutions(), print_report()

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use hexdrop_core::{load_solutions, replay_seed, Puzzle, ReplayOutcome, Solution};

#[derive(Args)]
pub struct ScoreArgs {
    /// Puzzle JSON file
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    pub file: PathBuf,

    /// Solution array JSON file
    #[arg(long, value_name = "FILE")]
    pub solution: PathBuf,

    /// Phrase of power (repeatable)
    #[arg(short = 'p', long = "phrase", value_name = "PHRASE")]
    pub phrases: Vec<String>,
}

/// One replayed record
struct ScoreLine {
    seed: u32,
    outcome: Result<ReplayOutcome, String>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run score command
pub fn run(args: ScoreArgs) -> Result<()> {
    let puzzle = Puzzle::load(&args.file)?;
    let solutions = load_solutions(&args.solution)
        .with_context(|| format!("Failed to load solutions: {}", args.solution.display()))?;

    let lines = score_solutions(&puzzle, &solutions, &args.phrases);
    print_report(&puzzle, &lines);
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn score_solutions(puzzle: &Puzzle, solutions: &[Solution], phrases: &[String]) -> Vec<ScoreLine> {
    solutions
        .iter()
        .filter(|s| {
            let matches = s.problem_id == puzzle.id;
            if !matches {
                tracing::warn!("Skipping solution for problem {} (puzzle is {})", s.problem_id, puzzle.id);
            }
            matches
        })
        .map(|s| ScoreLine {
            seed: s.seed,
            outcome: replay_seed(puzzle, s.seed, &s.solution, phrases).map_err(|e| e.to_string()),
        })
        .collect()
}

fn print_report(puzzle: &Puzzle, lines: &[ScoreLine]) {
    let mut total = 0i64;
    for line in lines {
        match &line.outcome {
            Ok(outcome) => {
                total += outcome.total();
                println!(
                    "seed {:>6}: {:>6} (moves {}, phrases {}), {} piece(s) locked{}",
                    line.seed,
                    outcome.total(),
                    outcome.move_score,
                    outcome.phrase_score,
                    outcome.pieces_locked,
                    if outcome.game_over { ", game over" } else { "" }
                );
            }
            Err(e) => println!("seed {:>6}: invalid ({})", line.seed, e),
        }
    }
    let average = if lines.is_empty() { 0 } else { total / lines.len() as i64 };
    println!("puzzle {}: {} solution(s), average {}", puzzle.id, lines.len(), average);
}
