//! Board: occupancy grid, placement, line clears and scoring
//!
//! A board is never mutated once built. `place` and `with_phrase` derive a
//! new board from a parent, copying the occupancy grid.

use std::collections::BTreeSet;

use crate::cell::HexCell;
use crate::error::CoreError;
use crate::heuristic::{evaluate, GoalHeuristic};
use crate::moves::Move;
use crate::unit::Unit;

/// One-time bonus for the first use of a phrase of power
pub const PHRASE_FIRST_USE_BONUS: i64 = 300;

/// Points for locking a unit of `size` cells that clears `lines` rows, when
/// the previous placement cleared `previous_lines` rows.
pub fn move_points(size: usize, lines: u32, previous_lines: u32) -> i64 {
    let lines = lines as i64;
    let points = size as i64 + 100 * (1 + lines) * lines / 2;
    let line_bonus = if previous_lines > 1 {
        (previous_lines as i64 - 1) * points / 10
    } else {
        0
    };
    points + line_bonus
}

/// Points for a phrase of `len` characters used `repetitions` times
pub fn phrase_points(len: usize, repetitions: usize) -> i64 {
    if repetitions == 0 {
        0
    } else {
        2 * (len * repetitions) as i64 + PHRASE_FIRST_USE_BONUS
    }
}

/// Largest playable board, in cells
pub const MAX_BOARD_CELLS: usize = 1 << 24;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    width: i32,
    height: i32,
    /// Row-major occupancy (y * width + x)
    cells: Vec<bool>,
    score: i64,
    lines_removed: u32,
    heuristic: GoalHeuristic,
    used_phrases: BTreeSet<String>,
}

impl Board {
    /// Base board with the given cells pre-filled
    pub fn new(width: i32, height: i32, filled: &[HexCell]) -> Result<Self, CoreError> {
        if width <= 0 || height <= 0 {
            return Err(CoreError::EmptyBoard { width, height });
        }

        let area = width
            .checked_mul(height)
            .filter(|&area| area as usize <= MAX_BOARD_CELLS)
            .ok_or(CoreError::BoardTooLarge { width, height })?;

        let mut cells = vec![false; area as usize];
        for cell in filled {
            if !Self::in_bounds(width, height, *cell) {
                return Err(CoreError::CellOutOfBounds {
                    x: cell.x,
                    y: cell.y,
                    width,
                    height,
                });
            }
            cells[(cell.y * width + cell.x) as usize] = true;
        }

        Ok(Self {
            width,
            height,
            cells,
            score: 0,
            lines_removed: 0,
            heuristic: GoalHeuristic::default(),
            used_phrases: BTreeSet::new(),
        }
        .evaluated())
    }

    fn evaluated(mut self) -> Self {
        self.heuristic = evaluate(&self);
        self
    }

    fn in_bounds(width: i32, height: i32, cell: HexCell) -> bool {
        cell.x >= 0 && cell.y >= 0 && cell.x < width && cell.y < height
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if Self::in_bounds(self.width, self.height, HexCell::new(x, y)) {
            Some((y * self.width + x) as usize)
        } else {
            None
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    /// Rows cleared by the placement that produced this board
    pub fn lines_removed(&self) -> u32 {
        self.lines_removed
    }

    pub fn heuristic(&self) -> &GoalHeuristic {
        &self.heuristic
    }

    pub fn used_phrases(&self) -> &BTreeSet<String> {
        &self.used_phrases
    }

    /// Occupied and in bounds
    pub fn is_filled(&self, x: i32, y: i32) -> bool {
        self.index(x, y).map(|i| self.cells[i]).unwrap_or(false)
    }

    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Every member in bounds and unoccupied
    pub fn contains(&self, unit: &Unit) -> bool {
        unit.members()
            .iter()
            .all(|c| self.index(c.x, c.y).map(|i| !self.cells[i]).unwrap_or(false))
    }

    /// True when some primitive move from `unit` is illegal, i.e. the piece
    /// rests against an obstruction and would lock on that move.
    pub fn can_lock(&self, unit: &Unit) -> bool {
        self.lock_move(unit).is_some()
    }

    /// First move (alphabet order) that would lock `unit` where it stands
    pub fn lock_move(&self, unit: &Unit) -> Option<Move> {
        Move::ALL
            .into_iter()
            .find(|&mv| !self.contains(&unit.apply(mv)))
    }

    /// Lock `unit` into a copy of this board, clear full rows and score.
    pub fn place(&self, unit: &Unit) -> Board {
        let mut cells = self.cells.clone();
        for c in unit.members() {
            if let Some(i) = self.index(c.x, c.y) {
                cells[i] = true;
            }
        }

        let width = self.width as usize;
        let mut lines = 0u32;
        let mut y = self.height as usize;
        while y > 0 {
            let row = y - 1;
            if cells[row * width..(row + 1) * width].iter().all(|&c| c) {
                // Shift everything above down one row; row 0 becomes empty
                cells.copy_within(0..row * width, width);
                cells[..width].fill(false);
                lines += 1;
            } else {
                y -= 1;
            }
        }

        Board {
            width: self.width,
            height: self.height,
            cells,
            score: self.score + move_points(unit.size(), lines, self.lines_removed),
            lines_removed: lines,
            heuristic: GoalHeuristic::default(),
            used_phrases: self.used_phrases.clone(),
        }
        .evaluated()
    }

    /// Credit one use of a phrase of power: `2 * len` every time, plus the
    /// first-use bonus if this lineage has not spelled it before.
    pub fn with_phrase(&self, phrase: &str) -> Board {
        let mut next = self.clone();
        let phrase = phrase.to_ascii_lowercase();
        next.score += 2 * phrase.chars().count() as i64;
        if next.used_phrases.insert(phrase) {
            next.score += PHRASE_FIRST_USE_BONUS;
        }
        next.evaluated()
    }

    /// Every contained placement of `unit`'s shape: each orientation, lifted
    /// to row 0, then walked over every row offset and left-justified column.
    pub fn possible_locations<'a>(&'a self, unit: &Unit) -> impl Iterator<Item = Unit> + 'a {
        let (width, height) = (self.width, self.height);
        unit.orientations()
            .into_iter()
            .flat_map(move |oriented| {
                let lifted = oriented.moved(HexCell::rows(-oriented.top()));
                (0..height).flat_map(move |dy| {
                    let row = lifted.moved(HexCell::rows(dy)).left_justified();
                    (0..width).map(move |dx| row.moved(HexCell::new(dx, 0)))
                })
            })
            .filter(move |candidate| self.contains(candidate))
    }
}
