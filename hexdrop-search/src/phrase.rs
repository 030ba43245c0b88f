//! Phrase-of-power insertion
//!
//! Rewrites the move text of a finished edge so it spells configured phrases
//! on the way down. The piece still locks on the same goal; only the route
//! changes, and the route never revisits a placement.

use hexdrop_core::{encode, Board, Move, Phrase, Unit};
use rustc_hash::FxHashSet;

use crate::path::{find_path, trace, Inaccessible};
use crate::tree::Edge;

/// Edge text after insertion, with the board credited for every phrase
#[derive(Clone, Debug)]
pub struct RefinedEdge {
    pub text: String,
    pub board: Board,
    /// Phrases spelled, in order
    pub spelled: Vec<String>,
}

/// A committed detour: entry route, then the phrase itself
struct Detour {
    entry: Vec<Move>,
    placements: Vec<Unit>,
}

pub struct PhraseInserter<'a> {
    phrases: &'a [Phrase],
    attempts: usize,
}

impl<'a> PhraseInserter<'a> {
    /// `attempts` caps the entry placements tried per phrase and position
    pub fn new(phrases: &'a [Phrase], attempts: usize) -> Self {
        Self { phrases, attempts }
    }

    /// Rewrite `edge`, played on `board`. Falls back to the edge's own moves
    /// when no phrase fits or the goal cannot be reached afterwards.
    pub fn refine(&self, board: &Board, edge: &Edge) -> RefinedEdge {
        let original = RefinedEdge {
            text: encode(&edge.moves),
            board: board.clone(),
            spelled: Vec::new(),
        };
        if self.phrases.is_empty() {
            return original;
        }

        let mut scored = board.clone();
        let mut current = edge.start.clone();
        let mut visited: FxHashSet<Unit> = FxHashSet::default();
        visited.insert(current.clone());
        let mut text = String::new();
        let mut spelled = Vec::new();

        while let Some((phrase, detour)) = self.next_detour(&scored, &current, &edge.goal, &visited) {
            text.push_str(&encode(&detour.entry));
            text.push_str(phrase.text());
            visited.extend(trace(&current, &detour.entry));
            visited.extend(detour.placements.iter().cloned());
            if let Some(end) = detour.placements.last() {
                current = end.clone();
            }
            scored = scored.with_phrase(phrase.text());
            spelled.push(phrase.text().to_string());
        }

        if spelled.is_empty() {
            return original;
        }

        let mut avoid: Inaccessible = visited;
        let tail = find_path(board, &current, &edge.goal, &mut avoid);
        match (tail, board.lock_move(&edge.goal)) {
            (Some(tail), Some(lock)) => {
                text.push_str(&encode(&tail));
                text.push(lock.to_char());
                tracing::debug!("Inserted {} phrase(s): {:?}", spelled.len(), spelled);
                RefinedEdge {
                    text,
                    board: scored,
                    spelled,
                }
            }
            _ => original,
        }
    }

    /// Try phrases not yet used in this lineage first, then the rest
    fn next_detour(
        &self,
        board: &Board,
        current: &Unit,
        goal: &Unit,
        visited: &FxHashSet<Unit>,
    ) -> Option<(&'a Phrase, Detour)> {
        let entries = self.entries(board, current, goal, visited);
        let used = board.used_phrases();
        let (fresh, repeated): (Vec<&'a Phrase>, Vec<&'a Phrase>) =
            self.phrases.iter().partition(|p| !used.contains(p.text()));

        fresh.into_iter().chain(repeated).find_map(|phrase| {
            self.fit_phrase(board, current, goal, visited, &entries, phrase)
                .map(|detour| (phrase, detour))
        })
    }

    /// Candidate phrase starting placements, nearest first
    fn entries(&self, board: &Board, current: &Unit, goal: &Unit, visited: &FxHashSet<Unit>) -> Vec<Unit> {
        let floor = goal.pivot().y;
        let mut entries: Vec<Unit> = board
            .possible_locations(current)
            .filter(|u| u == current || !visited.contains(u))
            .filter(|u| u.pivot().y >= current.pivot().y && u.pivot().y <= floor)
            .collect();
        entries.sort_by_key(|u| u.pivot().distance(current.pivot()) as u32 + u.rotation_distance(current));
        entries
    }

    fn fit_phrase(
        &self,
        board: &Board,
        current: &Unit,
        goal: &Unit,
        visited: &FxHashSet<Unit>,
        entries: &[Unit],
        phrase: &Phrase,
    ) -> Option<Detour> {
        let mut attempts = 0;
        for entry in entries {
            if attempts >= self.attempts {
                break;
            }
            let Some(placements) = simulate(board, entry, phrase.moves(), visited) else {
                continue;
            };
            let Some(end) = placements.last() else {
                continue;
            };
            if end.pivot().y > goal.pivot().y {
                continue;
            }
            attempts += 1;

            // Reach the entry without touching the phrase's own placements
            let mut avoid: Inaccessible = visited.clone();
            avoid.extend(placements.iter().cloned());
            avoid.remove(entry);
            let Some(entry_moves) = find_path(board, current, entry, &mut avoid) else {
                continue;
            };

            // The goal must stay reachable from where the phrase ends
            let mut avoid: Inaccessible = visited.clone();
            avoid.extend(trace(current, &entry_moves));
            avoid.extend(placements.iter().cloned());
            if find_path(board, end, goal, &mut avoid).is_none() {
                continue;
            }

            return Some(Detour {
                entry: entry_moves,
                placements,
            });
        }
        None
    }
}

/// Placements visited while spelling `moves` from `entry`: every step must
/// stay on the board and land somewhere new.
fn simulate(board: &Board, entry: &Unit, moves: &[Move], visited: &FxHashSet<Unit>) -> Option<Vec<Unit>> {
    let mut seen: FxHashSet<Unit> = FxHashSet::default();
    seen.insert(entry.clone());
    let mut current = entry.clone();
    let mut placements = Vec::with_capacity(moves.len());
    for &mv in moves {
        current = current.apply(mv);
        if !board.contains(&current) || visited.contains(&current) || !seen.insert(current.clone()) {
            return None;
        }
        placements.push(current.clone());
    }
    Some(placements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::generate_path;
    use hexdrop_core::{replay, HexCell};

    fn single() -> Unit {
        Unit::new([HexCell::ZERO], HexCell::ZERO).unwrap()
    }

    fn edge_to(board: &Board, unit: &Unit, goal: Unit) -> Edge {
        let start = unit.centered(board.width());
        let mut avoid = Inaccessible::default();
        let moves = generate_path(board, &start, &goal, &mut avoid).unwrap();
        Edge { start, goal, moves }
    }

    #[test]
    fn test_no_phrases_keeps_edge() {
        let board = Board::new(6, 8, &[]).unwrap();
        let edge = edge_to(&board, &single(), single().moved(HexCell::new(0, 7)));
        let refined = PhraseInserter::new(&[], 8).refine(&board, &edge);
        assert_eq!(refined.text, encode(&edge.moves));
        assert_eq!(refined.board.score(), 0);
    }

    #[test]
    fn test_phrase_spelled_and_goal_kept() {
        let board = Board::new(6, 10, &[]).unwrap();
        let goal = single().moved(HexCell::new(0, 9));
        let edge = edge_to(&board, &single(), goal.clone());
        let phrases = vec![Phrase::parse("ei!").unwrap()];
        let refined = PhraseInserter::new(&phrases, 16).refine(&board, &edge);

        assert!(refined.text.contains("ei!"), "text {:?}", refined.text);
        assert!(!refined.spelled.is_empty());
        assert_eq!(refined.board.score(), board.score() + 306 + 6 * (refined.spelled.len() as i64 - 1));

        // Replaying the new text locks the piece on the same goal
        let outcome = replay(board.clone(), &[single()], &refined.text, &[]).unwrap();
        assert_eq!(outcome.pieces_locked, 1);
        assert_eq!(outcome.board, board.place(&goal));
    }

    #[test]
    fn test_phrase_that_cannot_fit_falls_back() {
        // Three rows: no room for a phrase that needs six downward steps
        let board = Board::new(4, 3, &[]).unwrap();
        let edge = edge_to(&board, &single(), single().moved(HexCell::new(0, 2)));
        let phrases = vec![Phrase::parse("aaaaaa").unwrap()];
        let refined = PhraseInserter::new(&phrases, 16).refine(&board, &edge);
        assert_eq!(refined.text, encode(&edge.moves));
        assert!(refined.spelled.is_empty());
    }

    #[test]
    fn test_simulate_rejects_revisits() {
        let board = Board::new(5, 5, &[]).unwrap();
        let entry = single().moved(HexCell::new(2, 0));
        let visited = FxHashSet::default();
        assert!(simulate(&board, &entry, &[Move::West, Move::East], &visited).is_none());
        assert!(simulate(&board, &entry, &[Move::SouthEast, Move::SouthWest], &visited).is_some());
        // Off the board on the third step
        assert!(simulate(&board, &entry, &[Move::West, Move::West, Move::West], &visited).is_none());
    }
}
