//! Board tree: one node per placed piece
//!
//! Uses arena allocation with slot recycling so pruned subtrees give their
//! memory back to later expansions.
//!
//! ## Architecture
//! - Level 2: Tree operations (expand_frontier, retain_best, best_at_depth)
//! - Level 3: Node expansion and goal generation
//! - Level 4: Accessors, utilities

use hexdrop_core::{Board, HexCell, Move, Unit};
use rustc_hash::FxHashSet;

use crate::path::{generate_path, Inaccessible};

// ============================================================================
// TYPES
// ============================================================================

/// Node identifier (index into arena)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
}

/// How a piece got from its spawn to where it locked
#[derive(Clone, Debug)]
pub struct Edge {
    /// Spawn placement
    pub start: Unit,
    /// Resting placement
    pub goal: Unit,
    /// Primitive moves including the final lock move
    pub moves: Vec<Move>,
}

/// A node in the board tree
#[derive(Clone, Debug)]
pub struct BoardNode {
    /// Board after this node's piece locked
    pub board: Board,
    /// Parent node (None for root)
    pub parent: Option<NodeId>,
    /// Pieces placed so far
    pub depth: usize,
    /// Edge from the parent (None for root)
    pub edge: Option<Edge>,
    /// None until expanded; an empty list marks a dead leaf
    pub children: Option<Vec<NodeId>>,
    /// Explored without finding a way forward
    pub disappointed: bool,
}

impl BoardNode {
    fn new(board: Board, parent: Option<NodeId>, depth: usize, edge: Option<Edge>) -> Self {
        Self {
            board,
            parent,
            depth,
            edge,
            children: None,
            disappointed: false,
        }
    }

    pub fn is_expanded(&self) -> bool {
        self.children.is_some()
    }

    /// Expanded with no way to place the next piece
    pub fn is_dead(&self) -> bool {
        self.children.as_ref().is_some_and(|c| c.is_empty())
    }
}

/// A resting placement and the board it would produce
#[derive(Clone, Debug)]
pub struct Goal {
    pub unit: Unit,
    pub board: Board,
}

// ============================================================================
// GOAL GENERATION (Level 3)
// ============================================================================

/// Every resting placement of `unit` on `board`, best resulting board first.
///
/// Candidates anchor each member of each orientation on each cell, scanning
/// bottom row to top and west to east; equal boards keep that scan order.
pub fn generate_goals(board: &Board, unit: &Unit) -> Vec<Goal> {
    let mut seen = FxHashSet::default();
    let mut goals = Vec::new();

    for oriented in unit.orientations() {
        for y in (0..board.height()).rev() {
            for x in 0..board.width() {
                let cell = HexCell::new(x, y);
                for &member in oriented.members() {
                    let candidate = oriented.moved(cell - member);
                    if !seen.insert(candidate.clone()) {
                        continue;
                    }
                    if board.contains(&candidate) && board.can_lock(&candidate) {
                        let placed = board.place(&candidate);
                        goals.push(Goal {
                            unit: candidate,
                            board: placed,
                        });
                    }
                }
            }
        }
    }

    goals.sort_by(|a, b| b.board.heuristic().cmp(a.board.heuristic()));
    goals
}

// ============================================================================
// BOARD TREE (Level 2 - Tree Operations)
// ============================================================================

/// Search tree with arena allocation
#[derive(Debug)]
pub struct BoardTree {
    /// Arena storage; pruned slots are None until reused
    nodes: Vec<Option<BoardNode>>,
    free: Vec<usize>,
    live: usize,
}

impl BoardTree {
    /// Create a new tree rooted at the starting board
    pub fn new(board: Board) -> Self {
        Self {
            nodes: vec![Some(BoardNode::new(board, None, 0, None))],
            free: Vec::new(),
            live: 1,
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a reference to a node
    pub fn get(&self, id: NodeId) -> &BoardNode {
        match &self.nodes[id.0] {
            Some(node) => node,
            None => panic!("node {} was pruned", id.0),
        }
    }

    fn get_mut(&mut self, id: NodeId) -> &mut BoardNode {
        match &mut self.nodes[id.0] {
            Some(node) => node,
            None => panic!("node {} was pruned", id.0),
        }
    }

    /// Live nodes
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    fn alloc(&mut self, node: BoardNode) -> NodeId {
        self.live += 1;
        match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = Some(node);
                NodeId(slot)
            }
            None => {
                self.nodes.push(Some(node));
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    // ========================================================================
    // Level 3: Expansion
    // ========================================================================

    /// Expand a node with up to `ply` reachable resting places for `unit`.
    ///
    /// Returns true if the node has children afterwards. Already expanded
    /// nodes are left alone. A piece that cannot spawn leaves a dead leaf.
    pub fn expand(&mut self, id: NodeId, unit: &Unit, ply: usize) -> bool {
        if let Some(children) = &self.get(id).children {
            return !children.is_empty();
        }

        let node = self.get(id);
        let depth = node.depth + 1;
        let board = &node.board;
        let spawn = unit.centered(board.width());

        let mut found = Vec::new();
        if board.contains(&spawn) {
            let mut inaccessible = Inaccessible::default();
            for goal in generate_goals(board, &spawn) {
                if found.len() >= ply {
                    break;
                }
                match generate_path(board, &spawn, &goal.unit, &mut inaccessible) {
                    Some(moves) => found.push((goal, moves)),
                    None => tracing::trace!("No path to goal at {:?} (depth {})", goal.unit.pivot(), depth),
                }
            }
        }

        let children: Vec<NodeId> = found
            .into_iter()
            .map(|(goal, moves)| {
                let edge = Edge {
                    start: spawn.clone(),
                    goal: goal.unit,
                    moves,
                };
                self.alloc(BoardNode::new(goal.board, Some(id), depth, Some(edge)))
            })
            .collect();

        let alive = !children.is_empty();
        self.get_mut(id).children = Some(children);
        alive
    }

    /// Expand every unexpanded node under `anchor` shallower than
    /// `target_depth`. Node at depth `d` places `pieces[d]`. Stops early
    /// once the arena holds `node_limit` nodes.
    ///
    /// Returns the number of nodes expanded.
    pub fn expand_frontier(
        &mut self,
        anchor: NodeId,
        target_depth: usize,
        pieces: &[Unit],
        ply: usize,
        node_limit: usize,
    ) -> usize {
        let mut expanded = 0;
        let mut stack = vec![anchor];

        while let Some(id) = stack.pop() {
            let node = self.get(id);
            if node.depth >= target_depth || node.disappointed {
                continue;
            }
            if !node.is_expanded() {
                let Some(unit) = pieces.get(node.depth) else {
                    continue;
                };
                if self.live >= node_limit {
                    break;
                }
                self.expand(id, unit, ply);
                expanded += 1;
            }
            if let Some(children) = &self.get(id).children {
                stack.extend(children.iter().rev().copied());
            }
        }

        expanded
    }

    // ========================================================================
    // Level 2: Pruning
    // ========================================================================

    /// Nodes exactly at `depth` under `anchor`
    pub fn nodes_at_depth(&self, anchor: NodeId, depth: usize) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack = vec![anchor];
        while let Some(id) = stack.pop() {
            let node = self.get(id);
            if node.depth == depth {
                found.push(id);
                continue;
            }
            if let Some(children) = &node.children {
                stack.extend(children.iter().rev().copied());
            }
        }
        found
    }

    /// Keep the `beam` best nodes at `target_depth` under `anchor` and their
    /// ancestors; drop every other subtree hanging below `anchor`.
    /// Subtrees below the kept frontier nodes are left untouched.
    ///
    /// Returns the number of nodes removed.
    pub fn retain_best(&mut self, anchor: NodeId, target_depth: usize, beam: usize) -> usize {
        let mut frontier = self.nodes_at_depth(anchor, target_depth);
        // Stable: equal frontier nodes keep their tree order
        frontier.sort_by(|&a, &b| {
            let (a, b) = (self.get(a), self.get(b));
            (!b.disappointed, b.board.heuristic()).cmp(&(!a.disappointed, a.board.heuristic()))
        });
        frontier.truncate(beam);

        let mut keep: FxHashSet<NodeId> = FxHashSet::default();
        for &leaf in &frontier {
            let mut current = Some(leaf);
            while let Some(id) = current {
                if id == anchor || !keep.insert(id) {
                    break;
                }
                current = self.get(id).parent;
            }
        }

        let mut removed = 0;
        let mut stack = vec![anchor];
        while let Some(id) = stack.pop() {
            if self.get(id).depth >= target_depth {
                continue;
            }
            let Some(children) = self.get(id).children.clone() else {
                continue;
            };
            let (kept, dropped): (Vec<NodeId>, Vec<NodeId>) =
                children.into_iter().partition(|child| keep.contains(child));
            for child in dropped {
                removed += self.remove_subtree(child);
            }
            stack.extend(kept.iter().copied());
            self.get_mut(id).children = Some(kept);
        }
        removed
    }

    /// Free a node and all its descendants
    fn remove_subtree(&mut self, id: NodeId) -> usize {
        let mut removed = 0;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes[current.0].take() {
                if let Some(children) = node.children {
                    stack.extend(children);
                }
                self.free.push(current.0);
                self.live -= 1;
                removed += 1;
            }
        }
        removed
    }

    // ========================================================================
    // Level 3: Selection
    // ========================================================================

    /// Best node at `depth` under `anchor` that is still worth descending
    /// into: not disappointed and not a dead leaf.
    pub fn best_at_depth(&self, anchor: NodeId, depth: usize) -> Option<NodeId> {
        self.nodes_at_depth(anchor, depth)
            .into_iter()
            .filter(|&id| {
                let node = self.get(id);
                !node.disappointed && !node.is_dead()
            })
            .reduce(|best, id| {
                if self.get(id).board.heuristic() > self.get(best).board.heuristic() {
                    id
                } else {
                    best
                }
            })
    }

    /// Best board anywhere in the tree, disappointed nodes included.
    /// Deeper nodes win ties, then `preferred`, then lower slots.
    pub fn best_node(&self, preferred: NodeId) -> NodeId {
        let key = |node: &BoardNode| (*node.board.heuristic(), node.depth);
        let mut best = preferred;
        let mut best_key = key(self.get(preferred));
        for (i, slot) in self.nodes.iter().enumerate() {
            if let Some(node) = slot {
                if key(node) > best_key {
                    best = NodeId(i);
                    best_key = key(node);
                }
            }
        }
        best
    }

    pub fn mark_disappointed(&mut self, id: NodeId) {
        self.get_mut(id).disappointed = true;
    }

    /// Node ids from the root down to `id`, both included
    pub fn path_to(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = vec![id];
        let mut current = self.get(id).parent;
        while let Some(parent) = current {
            path.push(parent);
            current = self.get(parent).parent;
        }
        path.reverse();
        path
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn single() -> Unit {
        Unit::new([HexCell::ZERO], HexCell::ZERO).unwrap()
    }

    fn bar() -> Unit {
        Unit::new([HexCell::new(0, 0), HexCell::new(1, 0)], HexCell::new(0, 0)).unwrap()
    }

    #[test]
    fn test_tree_creation() {
        let tree = BoardTree::new(Board::new(5, 5, &[]).unwrap());
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root(), NodeId::ROOT);
        assert!(!tree.get(NodeId::ROOT).is_expanded());
        assert_eq!(tree.best_node(NodeId::ROOT), NodeId::ROOT);
    }

    #[test]
    fn test_goals_rest_and_are_ranked() {
        let board = Board::new(4, 4, &[HexCell::new(0, 3), HexCell::new(1, 3), HexCell::new(3, 3)]).unwrap();
        let goals = generate_goals(&board, &single().centered(4));
        assert!(!goals.is_empty());
        for goal in &goals {
            assert!(board.contains(&goal.unit));
            assert!(board.can_lock(&goal.unit));
        }
        // Filling the gap clears the bottom row
        assert_eq!(goals[0].unit.members(), &[HexCell::new(2, 3)]);
        assert_eq!(goals[0].board.score(), 101);
        for pair in goals.windows(2) {
            assert!(pair[0].board.heuristic() >= pair[1].board.heuristic());
        }
        let distinct: FxHashSet<Unit> = goals.iter().map(|g| g.unit.clone()).collect();
        assert_eq!(distinct.len(), goals.len());
    }

    #[test]
    fn test_goal_ties_keep_scan_order() {
        let board = Board::new(5, 5, &[]).unwrap();
        let goals = generate_goals(&board, &single());
        // Every lone cell scores the same; the bottom-left one is scanned first
        assert_eq!(goals[0].unit.members(), &[HexCell::new(0, 4)]);
    }

    #[test]
    fn test_expand_respects_ply() {
        let mut tree = BoardTree::new(Board::new(5, 6, &[]).unwrap());
        assert!(tree.expand(NodeId::ROOT, &bar(), 3));
        let children = tree.get(NodeId::ROOT).children.clone().unwrap();
        assert_eq!(children.len(), 3);
        assert_eq!(tree.len(), 4);
        for &child in &children {
            let node = tree.get(child);
            assert_eq!(node.depth, 1);
            assert_eq!(node.parent, Some(NodeId::ROOT));
            let edge = node.edge.as_ref().unwrap();
            assert_eq!(edge.start, bar().centered(5));
            assert_eq!(node.board.filled_count(), 2);
        }
        // Second call is a no-op
        assert!(tree.expand(NodeId::ROOT, &bar(), 5));
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn test_blocked_spawn_is_dead_leaf() {
        let board = Board::new(5, 5, &[HexCell::new(2, 0)]).unwrap();
        let mut tree = BoardTree::new(board);
        assert!(!tree.expand(NodeId::ROOT, &single(), 4));
        assert!(tree.get(NodeId::ROOT).is_dead());
        assert_eq!(tree.best_at_depth(NodeId::ROOT, 1), None);
    }

    #[test]
    fn test_expand_frontier_and_retain_best() {
        let mut tree = BoardTree::new(Board::new(5, 8, &[]).unwrap());
        let pieces = vec![single(), single(), single()];
        let expanded = tree.expand_frontier(NodeId::ROOT, 2, &pieces, 3, usize::MAX);
        assert_eq!(expanded, 1 + 3);
        assert_eq!(tree.nodes_at_depth(NodeId::ROOT, 2).len(), 9);
        assert_eq!(tree.len(), 1 + 3 + 9);

        let removed = tree.retain_best(NodeId::ROOT, 2, 2);
        let frontier = tree.nodes_at_depth(NodeId::ROOT, 2);
        assert_eq!(frontier.len(), 2);
        assert_eq!(tree.len(), 13 - removed);

        // Freed slots are recycled before the arena grows
        let (slots, free) = (tree.nodes.len(), tree.free.len());
        assert_eq!(free, removed);
        tree.expand_frontier(NodeId::ROOT, 3, &pieces, 3, usize::MAX);
        assert_eq!(tree.nodes_at_depth(NodeId::ROOT, 3).len(), 6);
        assert_eq!(tree.nodes.len(), slots + 6usize.saturating_sub(free));
    }

    #[test]
    fn test_best_at_depth_skips_disappointed() {
        let mut tree = BoardTree::new(Board::new(5, 5, &[]).unwrap());
        tree.expand(NodeId::ROOT, &single(), 2);
        let first = tree.best_at_depth(NodeId::ROOT, 1).unwrap();
        tree.mark_disappointed(first);
        let second = tree.best_at_depth(NodeId::ROOT, 1).unwrap();
        assert_ne!(first, second);
        tree.mark_disappointed(second);
        assert_eq!(tree.best_at_depth(NodeId::ROOT, 1), None);
        // Disappointed nodes still count for the overall best
        assert_ne!(tree.best_node(NodeId::ROOT), NodeId::ROOT);
    }

    #[test]
    fn test_path_to() {
        let mut tree = BoardTree::new(Board::new(5, 5, &[]).unwrap());
        let pieces = vec![single(), single()];
        tree.expand_frontier(NodeId::ROOT, 2, &pieces, 1, usize::MAX);
        let leaf = tree.nodes_at_depth(NodeId::ROOT, 2)[0];
        let path = tree.path_to(leaf);
        assert_eq!(path.len(), 3);
        assert_eq!(path[0], NodeId::ROOT);
        assert_eq!(*path.last().unwrap(), leaf);
        assert_eq!(tree.get(path[1]).parent, Some(NodeId::ROOT));
    }
}
