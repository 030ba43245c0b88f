//! Board evaluation used to rank goal placements and search leaves

use crate::board::Board;
use crate::cell::HexCell;
use serde::{Deserialize, Serialize};

/// Neighbours counted by the adjacency term: both sides and both cells below
const ADJACENCY_DIRECTIONS: [HexCell; 4] = [
    HexCell::EAST,
    HexCell::WEST,
    HexCell::SOUTHWEST,
    HexCell::SOUTHEAST,
];

/// Comparable board quality. Fields compare in declaration order and a
/// greater value is a better board.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GoalHeuristic {
    /// Points scored so far
    pub score: i64,
    /// Occupied E/W/SW/SE neighbour pairs, a clumping proxy
    pub adjacency: u32,
    /// Sum over rows of the squared occupied-cell count
    pub row_fill: u64,
}

/// Evaluate a board. Called once while the board is built.
pub fn evaluate(board: &Board) -> GoalHeuristic {
    let mut adjacency = 0u32;
    let mut row_fill = 0u64;

    for y in 0..board.height() {
        let mut in_row = 0u64;
        for x in 0..board.width() {
            if !board.is_filled(x, y) {
                continue;
            }
            in_row += 1;
            let cell = HexCell::new(x, y);
            adjacency += ADJACENCY_DIRECTIONS
                .iter()
                .filter(|&&d| {
                    let n = cell + d;
                    board.is_filled(n.x, n.y)
                })
                .count() as u32;
        }
        row_fill += in_row * in_row;
    }

    GoalHeuristic {
        score: board.score(),
        adjacency,
        row_fill,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_board() {
        let board = Board::new(5, 5, &[]).unwrap();
        assert_eq!(*board.heuristic(), GoalHeuristic::default());
    }

    #[test]
    fn test_adjacency_and_row_fill() {
        // (1,3) sits on the odd row between (1,4) and (2,4)
        let filled = [
            HexCell::new(0, 3),
            HexCell::new(1, 3),
            HexCell::new(1, 4),
            HexCell::new(2, 4),
        ];
        let board = Board::new(5, 5, &filled).unwrap();
        let h = board.heuristic();
        // (0,3)-(1,3) both ways, (0,3)->SE (1,4), (1,3)->SW (1,4), (1,3)->SE (2,4),
        // (1,4)-(2,4) both ways
        assert_eq!(h.adjacency, 7);
        assert_eq!(h.row_fill, 8);
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        let a = GoalHeuristic { score: 10, adjacency: 0, row_fill: 0 };
        let b = GoalHeuristic { score: 9, adjacency: 100, row_fill: 100 };
        let c = GoalHeuristic { score: 10, adjacency: 1, row_fill: 0 };
        let d = GoalHeuristic { score: 10, adjacency: 1, row_fill: 5 };
        assert!(a > b);
        assert!(c > a);
        assert!(d > c);
    }
}
