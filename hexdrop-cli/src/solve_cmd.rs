//! Solve command - search every seed of every puzzle
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: load_puzzles(), solve_all(), print_solutions()
//! - Level 3: run_config_for()
//! - Level 4: budget utilities (total_waves, per_seed_time)

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Args;

use hexdrop_core::{AnnotatedSolution, Puzzle, Solution};
use hexdrop_search::{max_nodes_for_megabytes, puzzle_solutions, RunConfig, SolverConfig};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct SolveArgs {
    /// Puzzle JSON file (repeatable)
    #[arg(short = 'f', long = "file", value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// Total time limit in seconds for all puzzles
    #[arg(short = 't', long = "time", value_name = "SECONDS")]
    pub time_limit: Option<f64>,

    /// Memory limit in megabytes
    #[arg(short = 'm', long = "memory", value_name = "MEGABYTES")]
    pub memory: Option<usize>,

    /// Phrase of power (repeatable, most preferred first)
    #[arg(short = 'p', long = "phrase", value_name = "PHRASE")]
    pub phrases: Vec<String>,

    /// Worker threads (defaults to available parallelism)
    #[arg(short = 'c', long = "cores")]
    pub cores: Option<usize>,

    /// Pieces placed per descent step
    #[arg(long, default_value = "2")]
    pub lookahead: usize,

    /// Starting number of placements kept per piece
    #[arg(long, default_value = "4")]
    pub ply: usize,

    /// Frontier size kept after pruning
    #[arg(long, default_value = "24")]
    pub beam: usize,

    /// Tag written into every solution
    #[arg(long)]
    pub tag: Option<String>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run solve command
///
/// 1. Load every puzzle
/// 2. Solve all seeds within the shared budget
/// 3. Print the solution array
pub fn run(args: SolveArgs) -> Result<()> {
    let puzzles = load_puzzles(&args)?;
    let seeds: usize = puzzles.iter().map(|p| p.source_seeds.len()).sum();
    let cores = args.cores.unwrap_or_else(available_cores).max(1);
    let waves = total_waves(puzzles.iter().map(|p| p.source_seeds.len()), cores);

    tracing::info!(
        "Solving {} puzzle(s), {} seed(s) on {} core(s) in {} wave(s)",
        puzzles.len(),
        seeds,
        cores,
        waves
    );

    let solutions = solve_all(&puzzles, &args, waves, cores);
    let total: i64 = solutions.iter().map(|s| s.score).sum();
    tracing::info!("Total expected score: {}", total);

    print_solutions(&solutions, args.pretty)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Every puzzle that can be read and parsed; the others are skipped
fn load_puzzles(args: &SolveArgs) -> Result<Vec<Puzzle>> {
    let mut puzzles = Vec::with_capacity(args.files.len());
    for path in &args.files {
        match Puzzle::load(path) {
            Ok(puzzle) => puzzles.push(puzzle),
            Err(e) => tracing::warn!("Skipping {}: {:#}", path.display(), e),
        }
    }
    if puzzles.is_empty() {
        bail!("None of the {} puzzle file(s) could be loaded", args.files.len());
    }
    Ok(puzzles)
}

fn solve_all(puzzles: &[Puzzle], args: &SolveArgs, waves: usize, cores: usize) -> Vec<AnnotatedSolution> {
    puzzles
        .iter()
        .flat_map(|puzzle| puzzle_solutions(puzzle, &run_config_for(puzzle, args, waves, cores)))
        .collect()
}

fn print_solutions(solutions: &[AnnotatedSolution], pretty: bool) -> Result<()> {
    let records: Vec<&Solution> = solutions.iter().map(|s| &s.output).collect();
    let json = if pretty {
        serde_json::to_string_pretty(&records)?
    } else {
        serde_json::to_string(&records)?
    };
    println!("{}", json);
    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Solver settings for one puzzle, with the run's budget shared out
fn run_config_for(puzzle: &Puzzle, args: &SolveArgs, waves: usize, cores: usize) -> RunConfig {
    let mut solver = SolverConfig::default()
        .with_lookahead(args.lookahead)
        .with_ply(args.ply)
        .with_beam(args.beam)
        .with_phrases(args.phrases.clone());

    if let Some(seconds) = args.time_limit {
        solver = solver.with_time_limit(per_seed_time(seconds, waves));
    }
    if let Some(megabytes) = args.memory {
        let cells = puzzle.width.max(1) as usize * puzzle.height.max(1) as usize;
        solver = solver.with_max_nodes(max_nodes_for_megabytes(megabytes / cores, cells));
    }

    let mut config = RunConfig::new(solver).with_cores(cores);
    if let Some(tag) = &args.tag {
        config = config.with_tag(tag.clone());
    }
    config
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn available_cores() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

/// Rounds of parallel work: puzzles run one after another, and each puzzle's
/// seeds fill `cores` threads at a time.
fn total_waves(seed_counts: impl IntoIterator<Item = usize>, cores: usize) -> usize {
    seed_counts
        .into_iter()
        .map(|seeds| seeds.div_ceil(cores.max(1)))
        .sum::<usize>()
        .max(1)
}

/// Time for one seed when the run's budget is shared by `waves` rounds
fn per_seed_time(seconds: f64, waves: usize) -> Duration {
    Duration::from_secs_f64(seconds.max(0.0) / waves.max(1) as f64)
}
