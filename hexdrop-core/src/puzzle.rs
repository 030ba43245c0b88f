//! Puzzle definitions and solution records (JSON)

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::cell::HexCell;
use crate::error::CoreError;
use crate::source::piece_sequence;
use crate::unit::Unit;

/// A unit shape as it appears in the puzzle file
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSpec {
    pub members: Vec<HexCell>,
    pub pivot: HexCell,
}

/// Puzzle input: board, pre-filled cells, unit shapes and the seeds to play
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Puzzle {
    pub id: i64,
    pub units: Vec<UnitSpec>,
    pub width: i32,
    pub height: i32,
    #[serde(default)]
    pub filled: Vec<HexCell>,
    pub source_length: usize,
    pub source_seeds: Vec<u32>,
}

impl Puzzle {
    /// Parse without checking that the puzzle is playable
    pub fn parse(content: &str) -> Result<Self, CoreError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Parse and validate
    pub fn from_json(content: &str) -> Result<Self, CoreError> {
        let puzzle = Self::parse(content)?;
        puzzle.validate()?;
        Ok(puzzle)
    }

    /// Load from a JSON file.
    ///
    /// Only reading and parsing can fail here; a puzzle that parses but
    /// cannot be played is returned as is and fails later, per seed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read puzzle: {}", path.display()))?;
        let puzzle = Self::parse(&content)
            .with_context(|| format!("Failed to parse puzzle: {}", path.display()))?;
        Ok(puzzle)
    }

    /// Save to a JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Board dimensions, filled cells and unit shapes must be usable.
    ///
    /// A unit that does not fit the board is not an error: the game simply
    /// ends when it fails to spawn.
    pub fn validate(&self) -> Result<(), CoreError> {
        self.board()?;
        self.shapes()?;
        Ok(())
    }

    /// The starting board
    pub fn board(&self) -> Result<Board, CoreError> {
        Board::new(self.width, self.height, &self.filled)
    }

    /// Unit shapes in file order
    pub fn shapes(&self) -> Result<Vec<Unit>, CoreError> {
        if self.units.is_empty() {
            return Err(CoreError::NoUnits);
        }
        self.units
            .iter()
            .enumerate()
            .map(|(index, spec)| {
                Unit::new(spec.members.iter().copied(), spec.pivot)
                    .ok_or(CoreError::EmptyUnit { index })
            })
            .collect()
    }

    /// The piece sequence for one seed
    pub fn source(&self, seed: u32) -> Result<Vec<Unit>, CoreError> {
        let shapes = self.shapes()?;
        Ok(piece_sequence(seed, self.source_length, shapes.len())
            .into_iter()
            .map(|index| shapes[index].clone())
            .collect())
    }
}

/// Solution record for one seed
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Solution {
    pub problem_id: i64,
    pub seed: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub solution: String,
}

/// A solution together with the score the solver expects it to earn
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnnotatedSolution {
    #[serde(flatten)]
    pub output: Solution,
    pub score: i64,
}

/// Read a solution array from JSON
pub fn load_solutions(path: &Path) -> anyhow::Result<Vec<Solution>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read solutions: {}", path.display()))?;
    let solutions = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse solutions: {}", path.display()))?;
    Ok(solutions)
}
