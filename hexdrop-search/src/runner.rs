//! Solving every seed of a puzzle
//!
//! Level 1 - orchestration. Each seed gets its own solver, tree and clock;
//! with the `parallel` feature seeds run on a rayon pool.

use hexdrop_core::{AnnotatedSolution, CoreError, Puzzle, Solution};

use crate::config::{RunConfig, SolverConfig};
use crate::search::{SolveResult, Solver};

/// Search result for one seed
#[derive(Clone, Debug)]
pub struct SeedOutcome {
    pub seed: u32,
    pub result: SolveResult,
}

impl SeedOutcome {
    /// Solution record for output
    pub fn to_solution(&self, problem_id: i64, tag: Option<&str>) -> AnnotatedSolution {
        AnnotatedSolution {
            output: Solution {
                problem_id,
                seed: self.seed,
                tag: tag.map(str::to_string),
                solution: self.result.solution.clone(),
            },
            score: self.result.score,
        }
    }
}

/// Solve one seed of `puzzle`
pub fn solve_seed(puzzle: &Puzzle, seed: u32, config: &SolverConfig) -> Result<SeedOutcome, CoreError> {
    let board = puzzle.board()?;
    let pieces = puzzle.source(seed)?;
    let result = Solver::new(config.clone()).solve(board, &pieces);
    tracing::info!(
        "Puzzle {} seed {}: score {}, {}/{} pieces, {} rounds, {} backtracks, ply {}, peak {} nodes{}",
        puzzle.id,
        seed,
        result.score,
        result.pieces_placed,
        pieces.len(),
        result.stats.rounds,
        result.stats.backtracks,
        result.stats.final_ply,
        result.stats.peak_nodes,
        if result.stats.stopped_early { " (budget exhausted)" } else { "" }
    );
    Ok(SeedOutcome { seed, result })
}

/// Solve every seed of `puzzle`, results in the puzzle's seed order
pub fn solve_puzzle(puzzle: &Puzzle, config: &RunConfig) -> Result<Vec<SeedOutcome>, CoreError> {
    puzzle.validate()?;

    #[cfg(feature = "parallel")]
    {
        solve_parallel(puzzle, config)
    }

    #[cfg(not(feature = "parallel"))]
    {
        puzzle
            .source_seeds
            .iter()
            .map(|&seed| solve_seed(puzzle, seed, &config.solver))
            .collect()
    }
}

/// Solution records for every seed of `puzzle`. A puzzle that cannot be
/// played gets an empty solution for each of its seeds.
pub fn puzzle_solutions(puzzle: &Puzzle, config: &RunConfig) -> Vec<AnnotatedSolution> {
    let tag = config.tag.as_deref();
    match solve_puzzle(puzzle, config) {
        Ok(outcomes) => outcomes
            .iter()
            .map(|outcome| outcome.to_solution(puzzle.id, tag))
            .collect(),
        Err(e) => {
            tracing::warn!(
                "Puzzle {} cannot be played ({}), submitting {} empty solution(s)",
                puzzle.id,
                e,
                puzzle.source_seeds.len()
            );
            puzzle
                .source_seeds
                .iter()
                .map(|&seed| AnnotatedSolution {
                    output: Solution {
                        problem_id: puzzle.id,
                        seed,
                        tag: tag.map(str::to_string),
                        solution: String::new(),
                    },
                    score: 0,
                })
                .collect()
        }
    }
}

/// Seeds on a rayon pool; finished outcomes are appended under a mutex and
/// put back in seed order at the end.
#[cfg(feature = "parallel")]
fn solve_parallel(puzzle: &Puzzle, config: &RunConfig) -> Result<Vec<SeedOutcome>, CoreError> {
    use rayon::prelude::*;
    use std::sync::Mutex;

    let finished: Mutex<Vec<(usize, SeedOutcome)>> = Mutex::new(Vec::new());
    let run = || {
        puzzle
            .source_seeds
            .par_iter()
            .enumerate()
            .try_for_each(|(index, &seed)| -> Result<(), CoreError> {
                let outcome = solve_seed(puzzle, seed, &config.solver)?;
                if let Ok(mut finished) = finished.lock() {
                    finished.push((index, outcome));
                }
                Ok(())
            })
    };

    let pool = config
        .cores
        .map(|cores| rayon::ThreadPoolBuilder::new().num_threads(cores).build());
    match pool {
        Some(Ok(pool)) => pool.install(run)?,
        Some(Err(e)) => {
            tracing::warn!("Could not build a {}-thread pool ({}), using the global pool", config.cores.unwrap_or(0), e);
            run()?
        }
        None => run()?,
    }

    let mut finished = finished.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner());
    finished.sort_by_key(|(index, _)| *index);
    Ok(finished.into_iter().map(|(_, outcome)| outcome).collect())
}
