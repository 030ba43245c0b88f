//! Error type for malformed puzzles and unreplayable command strings

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("board must have positive dimensions, got {width}x{height}")]
    EmptyBoard { width: i32, height: i32 },

    #[error("board of {width}x{height} cells is too large")]
    BoardTooLarge { width: i32, height: i32 },

    #[error("puzzle defines no units")]
    NoUnits,

    #[error("unit {index} has no members")]
    EmptyUnit { index: usize },

    #[error("cell ({x}, {y}) lies outside the {width}x{height} board")]
    CellOutOfBounds { x: i32, y: i32, width: i32, height: i32 },

    #[error("unknown command character {0:?}")]
    UnknownCommand(char),

    #[error("phrase of power must spell at least one move")]
    EmptyPhrase,

    #[error("piece {piece} returned to an earlier placement at command {command}")]
    RepeatedPlacement { piece: usize, command: usize },

    #[error("invalid puzzle JSON: {0}")]
    Json(#[from] serde_json::Error),
}
