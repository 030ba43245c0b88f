//! Shortest legal move sequences between two placements
//!
//! Best-first search seeded from the goal and expanded through reverse
//! moves, so every node on the frontier is a placement from which the goal
//! is known to be reachable. The priority is the number of moves so far plus
//! an admissible estimate of what remains (pivot hex distance plus rotation
//! distance to the start), so with uniform move costs the first time the
//! start is dequeued its path is a shortest one.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use hexdrop_core::{Board, Move, Unit};
use rustc_hash::{FxHashMap, FxHashSet};

/// Placements known to be unreachable (or off limits) for the current start
pub type Inaccessible = FxHashSet<Unit>;

struct SearchNode {
    unit: Unit,
    /// Node one move closer to the goal
    toward_goal: Option<usize>,
    /// Forward move leading to `toward_goal`
    via: Option<Move>,
    steps: u32,
}

#[derive(PartialEq, Eq)]
struct Frontier {
    priority: u32,
    order: u32,
    index: usize,
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (lowest priority first, then oldest)
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.order.cmp(&self.order))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn estimate(unit: &Unit, start: &Unit) -> u32 {
    unit.pivot().distance(start.pivot()) as u32 + unit.rotation_distance(start)
}

/// Shortest forward move sequence driving `start` onto `goal`, without the
/// final lock move.
///
/// Placements in `avoid` are never stepped on (the start itself is exempt).
/// When the goal cannot be reached, every placement the search dequeued is
/// added to `avoid`: none of them is reachable from `start`, so later
/// searches from the same start can skip them.
pub fn find_path(board: &Board, start: &Unit, goal: &Unit, avoid: &mut Inaccessible) -> Option<Vec<Move>> {
    if start == goal {
        return Some(Vec::new());
    }
    if avoid.contains(goal) || !board.contains(goal) || !board.contains(start) {
        return None;
    }

    let mut nodes = vec![SearchNode {
        unit: goal.clone(),
        toward_goal: None,
        via: None,
        steps: 0,
    }];
    let mut best: FxHashMap<Unit, u32> = FxHashMap::default();
    best.insert(goal.clone(), 0);

    let mut heap = BinaryHeap::new();
    let mut order = 0u32;
    heap.push(Frontier {
        priority: estimate(goal, start),
        order,
        index: 0,
    });

    let mut dequeued = Vec::new();

    while let Some(Frontier { index, .. }) = heap.pop() {
        let (unit, steps) = (nodes[index].unit.clone(), nodes[index].steps);
        if best.get(&unit).is_some_and(|&b| b < steps) {
            continue;
        }
        if unit == *start {
            return Some(forward_moves(&nodes, index));
        }
        dequeued.push(index);

        for mv in Move::ALL {
            let previous = unit.unapply(mv);
            if previous != *start && avoid.contains(&previous) {
                continue;
            }
            if !board.contains(&previous) {
                continue;
            }
            let next_steps = steps + 1;
            if best.get(&previous).is_some_and(|&b| b <= next_steps) {
                continue;
            }
            best.insert(previous.clone(), next_steps);

            order += 1;
            heap.push(Frontier {
                priority: next_steps + estimate(&previous, start),
                order,
                index: nodes.len(),
            });
            nodes.push(SearchNode {
                unit: previous,
                toward_goal: Some(index),
                via: Some(mv),
                steps: next_steps,
            });
        }
    }

    avoid.extend(dequeued.into_iter().map(|i| nodes[i].unit.clone()));
    None
}

/// Follow the chain from the start node back to the goal
fn forward_moves(nodes: &[SearchNode], start_index: usize) -> Vec<Move> {
    let mut moves = Vec::with_capacity(nodes[start_index].steps as usize);
    let mut current = start_index;
    while let (Some(mv), Some(next)) = (nodes[current].via, nodes[current].toward_goal) {
        moves.push(mv);
        current = next;
    }
    moves
}

/// Full edge path: the shortest route to `goal` followed by the move that
/// locks the piece there.
pub fn generate_path(board: &Board, start: &Unit, goal: &Unit, avoid: &mut Inaccessible) -> Option<Vec<Move>> {
    let lock = board.lock_move(goal)?;
    let mut moves = find_path(board, start, goal, avoid)?;
    moves.push(lock);
    Some(moves)
}

/// Placements visited by playing `moves` from `start`, excluding `start`
pub fn trace(start: &Unit, moves: &[Move]) -> Vec<Unit> {
    let mut current = start.clone();
    moves
        .iter()
        .map(|&mv| {
            current = current.apply(mv);
            current.clone()
        })
        .collect()
}
