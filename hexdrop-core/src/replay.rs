//! Command-string replay and scoring
//!
//! Plays a solution exactly as the game rules do: each piece spawns centered
//! at the top, a legal command moves it, an illegal one locks it where it
//! stands and spawns the next piece. Returning a piece to a placement it
//! already occupied is an error.

use std::collections::BTreeSet;

use rustc_hash::FxHashSet;

use crate::board::{phrase_points, Board};
use crate::error::CoreError;
use crate::moves::{Move, IGNORED};
use crate::puzzle::Puzzle;
use crate::unit::Unit;

/// Final state of a replayed game
#[derive(Clone, Debug)]
pub struct ReplayOutcome {
    pub board: Board,
    /// Pieces locked onto the board
    pub pieces_locked: usize,
    /// Commands consumed before the game ended
    pub commands_used: usize,
    /// No piece is in play: the sequence ran out or a spawn was blocked
    pub game_over: bool,
    pub move_score: i64,
    pub phrase_score: i64,
}

impl ReplayOutcome {
    pub fn total(&self) -> i64 {
        self.move_score + self.phrase_score
    }
}

struct ActivePiece {
    index: usize,
    unit: Unit,
    visited: FxHashSet<Unit>,
}

fn spawn(board: &Board, pieces: &[Unit], index: usize) -> Option<ActivePiece> {
    let unit = pieces.get(index)?.centered(board.width());
    if !board.contains(&unit) {
        return None;
    }
    let mut visited = FxHashSet::default();
    visited.insert(unit.clone());
    Some(ActivePiece {
        index,
        unit,
        visited,
    })
}

/// Replay `commands` from `board` with the given piece sequence.
///
/// Commands left over after the game ends are ignored.
pub fn replay(
    board: Board,
    pieces: &[Unit],
    commands: &str,
    phrases: &[String],
) -> Result<ReplayOutcome, CoreError> {
    let mut board = board;
    let mut active = spawn(&board, pieces, 0);
    let mut pieces_locked = 0;
    let mut commands_used = 0;

    let stream = commands.chars().filter(|c| !IGNORED.contains(c));
    for (command, c) in stream.enumerate() {
        let Some(piece) = active.as_mut() else {
            break;
        };
        let mv = Move::from_char(c).ok_or(CoreError::UnknownCommand(c))?;
        commands_used += 1;

        let next = piece.unit.apply(mv);
        if board.contains(&next) {
            if !piece.visited.insert(next.clone()) {
                return Err(CoreError::RepeatedPlacement {
                    piece: piece.index,
                    command,
                });
            }
            piece.unit = next;
        } else {
            let index = piece.index;
            board = board.place(&piece.unit);
            pieces_locked += 1;
            active = spawn(&board, pieces, index + 1);
        }
    }

    let phrase_score = score_phrases(commands, phrases);
    Ok(ReplayOutcome {
        move_score: board.score(),
        board,
        pieces_locked,
        commands_used,
        game_over: active.is_none(),
        phrase_score,
    })
}

/// Replay a solution for one seed of a puzzle
pub fn replay_seed(
    puzzle: &Puzzle,
    seed: u32,
    commands: &str,
    phrases: &[String],
) -> Result<ReplayOutcome, CoreError> {
    replay(puzzle.board()?, &puzzle.source(seed)?, commands, phrases)
}

/// Phrase-of-power points for a command string. Occurrences may overlap;
/// matching ignores case.
pub fn score_phrases(commands: &str, phrases: &[String]) -> i64 {
    let text: String = commands
        .chars()
        .filter(|c| !IGNORED.contains(c))
        .map(|c| c.to_ascii_lowercase())
        .collect();
    let distinct: BTreeSet<String> = phrases
        .iter()
        .map(|p| p.to_ascii_lowercase())
        .filter(|p| !p.is_empty())
        .collect();

    distinct
        .iter()
        .map(|phrase| {
            let needle = phrase.as_bytes();
            let count = text
                .as_bytes()
                .windows(needle.len())
                .filter(|w| *w == needle)
                .count();
            phrase_points(phrase.chars().count(), count)
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::HexCell;

    fn single() -> Unit {
        Unit::new([HexCell::ZERO], HexCell::ZERO).unwrap()
    }

    #[test]
    fn test_drop_single_cell() {
        // 3x3 board: spawn at (1,0); SE to (1,1), SW to (1,2), then lock
        let board = Board::new(3, 3, &[]).unwrap();
        let outcome = replay(board, &[single()], "lap", &[]).unwrap();
        assert_eq!(outcome.pieces_locked, 0);
        assert_eq!(outcome.commands_used, 3);
        assert!(!outcome.game_over);

        let board = Board::new(3, 3, &[]).unwrap();
        let outcome = replay(board, &[single()], "laa", &[]).unwrap();
        assert_eq!(outcome.pieces_locked, 1);
        assert!(outcome.game_over);
        assert!(outcome.board.is_filled(1, 2));
        assert_eq!(outcome.move_score, 1);
        assert_eq!(outcome.total(), 1);
    }

    #[test]
    fn test_revisit_is_an_error() {
        let board = Board::new(5, 5, &[]).unwrap();
        let err = replay(board, &[single()], "pb", &[]).unwrap_err();
        assert!(matches!(err, CoreError::RepeatedPlacement { piece: 0, command: 1 }));

        // Rotating a single cell about itself revisits the spawn
        let board = Board::new(5, 5, &[]).unwrap();
        assert!(replay(board, &[single()], "d", &[]).is_err());
    }

    #[test]
    fn test_blocked_spawn_ends_game() {
        let board = Board::new(3, 3, &[HexCell::new(1, 0)]).unwrap();
        let outcome = replay(board, &[single()], "lll", &[]).unwrap();
        assert!(outcome.game_over);
        assert_eq!(outcome.commands_used, 0);
        assert_eq!(outcome.total(), 0);
    }

    #[test]
    fn test_unknown_command() {
        let board = Board::new(3, 3, &[]).unwrap();
        assert!(matches!(
            replay(board, &[single()], "l#", &[]),
            Err(CoreError::UnknownCommand('#'))
        ));
    }

    #[test]
    fn test_phrase_scoring() {
        let phrases = vec!["ei!".to_string(), "EI!".to_string(), "yuggoth".to_string()];
        assert_eq!(score_phrases("ei!ei!", &phrases), 2 * 3 * 2 + 300);
        assert_eq!(score_phrases("EI!\nlll", &phrases), 6 + 300);
        assert_eq!(score_phrases("lll", &phrases), 0);
        // Overlapping occurrences both count
        assert_eq!(score_phrases("aaa", &["aa".to_string()]), 2 * 2 * 2 + 300);
    }
}
