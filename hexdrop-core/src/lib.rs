//! HEXDROP Core - Game model for the falling hex-piece puzzle
//!
//! This crate provides the rules the search engine plays by:
//! - Cell geometry (odd-row offset grid with axial arithmetic)
//! - Units and their placements
//! - Board placement, line clears and scoring
//! - Board evaluation used for ranking
//! - Command alphabet, piece source and puzzle JSON
//! - Replay scorer for finished solutions

pub mod cell;
pub mod unit;
pub mod moves;
pub mod board;
pub mod heuristic;
pub mod source;
pub mod puzzle;
pub mod replay;
pub mod error;

// Re-exports for convenient access
pub use cell::HexCell;
pub use unit::Unit;
pub use moves::{encode, parse_commands, Move, Phrase};
pub use board::{move_points, phrase_points, Board, MAX_BOARD_CELLS, PHRASE_FIRST_USE_BONUS};
pub use heuristic::{evaluate, GoalHeuristic};
pub use source::{piece_sequence, SourceRng};
pub use puzzle::{load_solutions, AnnotatedSolution, Puzzle, Solution, UnitSpec};
pub use replay::{replay, replay_seed, score_phrases, ReplayOutcome};
pub use error::CoreError;
