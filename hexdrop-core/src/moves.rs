//! Primitive moves and the command character table

use crate::cell::HexCell;
use crate::error::CoreError;
use serde::{Deserialize, Serialize};

/// One of the six atomic piece transforms
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    West,
    East,
    SouthWest,
    SouthEast,
    Clockwise,
    CounterClockwise,
}

/// Accepted command characters per move. The first character of each entry
/// is the canonical encoding.
static COMMAND_TABLE: [(Move, &str); 6] = [
    (Move::West, "p'!.03"),
    (Move::East, "bcefy2"),
    (Move::SouthWest, "aghij4"),
    (Move::SouthEast, "lmno 5"),
    (Move::Clockwise, "dqrvz1"),
    (Move::CounterClockwise, "kstuwx"),
];

/// Characters that carry no command
pub(crate) const IGNORED: [char; 3] = ['\t', '\n', '\r'];

impl Move {
    /// All moves in alphabet order; the lock move search follows this order
    pub const ALL: [Move; 6] = [
        Move::West,
        Move::East,
        Move::SouthWest,
        Move::SouthEast,
        Move::Clockwise,
        Move::CounterClockwise,
    ];

    /// Translation applied by this move, `None` for rotations
    pub fn displacement(self) -> Option<HexCell> {
        match self {
            Move::West => Some(HexCell::WEST),
            Move::East => Some(HexCell::EAST),
            Move::SouthWest => Some(HexCell::SOUTHWEST),
            Move::SouthEast => Some(HexCell::SOUTHEAST),
            Move::Clockwise | Move::CounterClockwise => None,
        }
    }

    /// The move that undoes this one. South-west and south-east undo to
    /// north-east and north-west, which are not commands, so they have none.
    pub fn inverse(self) -> Option<Move> {
        match self {
            Move::West => Some(Move::East),
            Move::East => Some(Move::West),
            Move::Clockwise => Some(Move::CounterClockwise),
            Move::CounterClockwise => Some(Move::Clockwise),
            Move::SouthWest | Move::SouthEast => None,
        }
    }

    /// Decode a command character (case-insensitive)
    pub fn from_char(c: char) -> Option<Move> {
        let c = c.to_ascii_lowercase();
        COMMAND_TABLE
            .iter()
            .find(|(_, chars)| chars.contains(c))
            .map(|(mv, _)| *mv)
    }

    /// Canonical command character
    pub fn to_char(self) -> char {
        COMMAND_TABLE
            .iter()
            .find(|(mv, _)| *mv == self)
            .and_then(|(_, chars)| chars.chars().next())
            .unwrap_or('?')
    }
}

/// Decode a command string into moves, skipping whitespace control characters
pub fn parse_commands(commands: &str) -> Result<Vec<Move>, CoreError> {
    commands
        .chars()
        .filter(|c| !IGNORED.contains(c))
        .map(|c| Move::from_char(c).ok_or(CoreError::UnknownCommand(c)))
        .collect()
}

/// Encode moves with canonical characters
pub fn encode(moves: &[Move]) -> String {
    moves.iter().map(|mv| mv.to_char()).collect()
}

/// A phrase of power: literal text plus the moves it spells
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Phrase {
    text: String,
    moves: Vec<Move>,
}

impl Phrase {
    pub fn parse(text: &str) -> Result<Self, CoreError> {
        let text = text.to_ascii_lowercase();
        let moves = parse_commands(&text)?;
        if moves.is_empty() {
            return Err(CoreError::EmptyPhrase);
        }
        Ok(Self { text, moves })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
