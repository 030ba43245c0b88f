//! Integration tests for the HEXDROP solver
//!
//! Tests the full stack: puzzle files, piece source, search, phrase
//! insertion and replay scoring

use hexdrop_core::{
    load_solutions, replay, replay_seed, AnnotatedSolution, Board, HexCell, Puzzle, Solution, Unit,
};
use hexdrop_search::{puzzle_solutions, solve_puzzle, solve_seed, RunConfig, Solver, SolverConfig};

// ============================================================================
// TEST FIXTURES
// ============================================================================

fn single() -> Unit {
    Unit::new([HexCell::ZERO], HexCell::ZERO).unwrap()
}

/// Two cells stacked down-right of the pivot
fn vertical() -> Unit {
    Unit::new([HexCell::new(0, 0), HexCell::new(0, 1)], HexCell::new(0, 0)).unwrap()
}

const PUZZLE: &str = r#"{
    "id": 7,
    "units": [
        {"members": [{"x": 0, "y": 0}], "pivot": {"x": 0, "y": 0}},
        {"members": [{"x": 0, "y": 0}, {"x": 1, "y": 0}], "pivot": {"x": 0, "y": 0}}
    ],
    "width": 5,
    "height": 8,
    "filled": [],
    "sourceLength": 5,
    "sourceSeeds": [17, 0, 3]
}"#;

fn scratch_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("hexdrop-{}-{}", std::process::id(), name))
}

// ============================================================================
// SINGLE PIECE
// ============================================================================

#[test]
fn test_single_cell_drops_to_floor() {
    let board = Board::new(10, 10, &[]).unwrap();
    let pieces = [single()];
    let result = Solver::new(SolverConfig::default()).solve(board.clone(), &pieces);

    assert_eq!(result.pieces_placed, 1);
    assert_eq!(result.score, 1);
    assert!(!result.stats.stopped_early);

    let outcome = replay(board, &pieces, &result.solution, &[]).unwrap();
    assert_eq!(outcome.pieces_locked, 1);
    assert!(outcome.game_over);
    assert_eq!(outcome.total(), 1);
    assert_eq!(outcome.board.filled_count(), 1);
    // Ties between floor cells go to the first one scanned
    assert!(outcome.board.is_filled(0, 9));
}

#[test]
fn test_gap_fill_clears_line() {
    let filled = [HexCell::new(0, 3), HexCell::new(1, 3), HexCell::new(3, 3)];
    let board = Board::new(4, 4, &filled).unwrap();
    let pieces = [single()];
    let result = Solver::new(SolverConfig::default()).solve(board.clone(), &pieces);

    assert_eq!(result.score, 101);
    assert_eq!(result.final_board.filled_count(), 0);
    assert_eq!(result.final_board.lines_removed(), 1);

    let outcome = replay(board, &pieces, &result.solution, &[]).unwrap();
    assert_eq!(outcome.total(), 101);
    assert_eq!(outcome.board.filled_count(), 0);
}

// ============================================================================
// BACKTRACKING
// ============================================================================

#[test]
fn test_backtracking_finds_room_for_last_piece() {
    // The best-looking spots for the two singles leave the vertical piece
    // nowhere to go, so a narrow search has to step back.
    let board = Board::new(3, 2, &[]).unwrap();
    let pieces = [single(), single(), vertical()];
    let config = SolverConfig::default()
        .with_lookahead(1)
        .with_ply(2)
        .with_beam(4)
        .fixed_ply();
    let result = Solver::new(config).solve(board.clone(), &pieces);

    assert_eq!(result.pieces_placed, 3);
    assert!(result.stats.backtracks >= 1);
    assert_eq!(result.score, 104);

    let outcome = replay(board, &pieces, &result.solution, &[]).unwrap();
    assert_eq!(outcome.pieces_locked, 3);
    assert_eq!(outcome.total(), 104);
}

#[test]
fn test_single_ply_cannot_recover() {
    let board = Board::new(3, 2, &[]).unwrap();
    let pieces = [single(), single(), vertical()];
    let config = SolverConfig::default()
        .with_lookahead(1)
        .with_ply(1)
        .with_beam(4)
        .fixed_ply();
    let result = Solver::new(config).solve(board, &pieces);

    assert_eq!(result.pieces_placed, 2);
    assert_eq!(result.score, 2);
    assert!(result.stats.backtracks >= 1);
}

// ============================================================================
// PUZZLE FILES
// ============================================================================

#[test]
fn test_puzzle_file_round_trip() {
    let puzzle = Puzzle::from_json(PUZZLE).unwrap();
    let path = scratch_path("puzzle.json");
    puzzle.save(&path).unwrap();
    let loaded = Puzzle::load(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(loaded.id, 7);
    assert_eq!(loaded.source_seeds, vec![17, 0, 3]);
    assert_eq!(loaded.shapes().unwrap(), puzzle.shapes().unwrap());
    assert_eq!(loaded.source(17).unwrap(), puzzle.source(17).unwrap());
}

#[test]
fn test_every_seed_replays_to_its_score() {
    let puzzle = Puzzle::from_json(PUZZLE).unwrap();
    let config = RunConfig::new(SolverConfig::default().fixed_ply()).with_cores(2);
    let outcomes = solve_puzzle(&puzzle, &config).unwrap();

    assert_eq!(outcomes.len(), 3);
    for outcome in &outcomes {
        assert_eq!(outcome.result.pieces_placed, 5);
        let replayed = replay_seed(&puzzle, outcome.seed, &outcome.result.solution, &[]).unwrap();
        assert_eq!(replayed.pieces_locked, 5);
        assert_eq!(replayed.total(), outcome.result.score);
        assert_eq!(replayed.board, outcome.result.final_board);
    }
}

#[test]
fn test_phrases_survive_replay() {
    let puzzle = Puzzle::from_json(PUZZLE).unwrap();
    let phrases = vec!["ei!".to_string()];
    let plain = solve_seed(&puzzle, 17, &SolverConfig::default().fixed_ply()).unwrap();
    let spoken = solve_seed(&puzzle, 17, &SolverConfig::default().fixed_ply().with_phrases(phrases.clone())).unwrap();

    let replayed = replay_seed(&puzzle, 17, &spoken.result.solution, &phrases).unwrap();
    assert_eq!(replayed.pieces_locked, spoken.result.pieces_placed);
    assert_eq!(replayed.move_score, plain.result.score);
    assert!(replayed.total() >= spoken.result.score);
    assert!(spoken.result.score >= plain.result.score);
}

// ============================================================================
// OUTPUT FORMAT
// ============================================================================

#[test]
fn test_solution_records_serialize_flat() {
    let puzzle = Puzzle::from_json(PUZZLE).unwrap();
    let config = RunConfig::new(SolverConfig::default().fixed_ply()).with_tag("nightly");
    let outcomes = solve_puzzle(&puzzle, &config).unwrap();
    let records: Vec<AnnotatedSolution> = outcomes
        .iter()
        .map(|o| o.to_solution(puzzle.id, config.tag.as_deref()))
        .collect();

    let value = serde_json::to_value(&records[0]).unwrap();
    assert_eq!(value["problemId"], 7);
    assert_eq!(value["seed"], 17);
    assert_eq!(value["tag"], "nightly");
    assert_eq!(value["score"], records[0].score);

    // The printed array carries the plain records, which load back
    let plain: Vec<&Solution> = records.iter().map(|r| &r.output).collect();
    let path = scratch_path("solutions.json");
    std::fs::write(&path, serde_json::to_string(&plain).unwrap()).unwrap();
    let loaded = load_solutions(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(loaded.len(), 3);
    for (record, solution) in records.iter().zip(&loaded) {
        assert_eq!(&record.output, solution);
        let replayed = replay_seed(&puzzle, solution.seed, &solution.solution, &[]).unwrap();
        assert_eq!(replayed.total(), record.score);
    }
}

// ============================================================================
// MALFORMED INPUT
// ============================================================================

/// Parses, but has no unit shapes to play
const NO_UNITS: &str = r#"{
    "id": 8,
    "units": [],
    "width": 5,
    "height": 8,
    "sourceLength": 5,
    "sourceSeeds": [1, 2]
}"#;

#[test]
fn test_unplayable_puzzle_yields_empty_solutions() {
    let path = scratch_path("no-units.json");
    std::fs::write(&path, NO_UNITS).unwrap();
    let puzzle = Puzzle::load(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    let records = puzzle_solutions(&puzzle, &RunConfig::new(SolverConfig::default()));
    let seeds: Vec<u32> = records.iter().map(|r| r.output.seed).collect();
    assert_eq!(seeds, vec![1, 2]);
    for record in &records {
        assert_eq!(record.output.problem_id, 8);
        assert_eq!(record.output.solution, "");
        assert_eq!(record.score, 0);
    }
}

#[test]
fn test_cli_keeps_good_files_next_to_bad_ones() {
    let good = scratch_path("cli-good.json");
    let unplayable = scratch_path("cli-unplayable.json");
    let garbled = scratch_path("cli-garbled.json");
    std::fs::write(&good, PUZZLE).unwrap();
    std::fs::write(&unplayable, NO_UNITS).unwrap();
    std::fs::write(&garbled, "{ not json").unwrap();

    let output = std::process::Command::new(env!("CARGO_BIN_EXE_hexdrop"))
        .arg("solve")
        .args(["-f", good.to_str().unwrap()])
        .args(["-f", unplayable.to_str().unwrap()])
        .args(["-f", garbled.to_str().unwrap()])
        .args(["-c", "2"])
        .output()
        .unwrap();
    for path in [&good, &unplayable, &garbled] {
        let _ = std::fs::remove_file(path);
    }

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let records: Vec<Solution> = serde_json::from_slice(&output.stdout).unwrap();
    let keys: Vec<(i64, u32)> = records.iter().map(|r| (r.problem_id, r.seed)).collect();
    assert_eq!(keys, vec![(7, 17), (7, 0), (7, 3), (8, 1), (8, 2)]);

    let puzzle = Puzzle::from_json(PUZZLE).unwrap();
    for record in &records[..3] {
        let replayed = replay_seed(&puzzle, record.seed, &record.solution, &[]).unwrap();
        assert_eq!(replayed.pieces_locked, 5);
    }
    assert!(records[3..].iter().all(|r| r.solution.is_empty()));
}

#[test]
fn test_cli_fails_when_nothing_loads() {
    let garbled = scratch_path("cli-only-garbled.json");
    std::fs::write(&garbled, "[1, 2").unwrap();
    let output = std::process::Command::new(env!("CARGO_BIN_EXE_hexdrop"))
        .args(["solve", "-f", garbled.to_str().unwrap()])
        .output()
        .unwrap();
    let _ = std::fs::remove_file(&garbled);

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}
