//! Lookahead search loop
//!
//! Grows the board tree a few pieces at a time below the current node,
//! prunes the frontier to a beam, then commits to the best frontier node.
//! When nothing below the current node survives, it is marked disappointed
//! and the search steps back to where it came from.
//!
//! ## Architecture
//! - Level 2: Search loop coordination (Solver::solve)
//! - Level 3: Budget checks, adaptive ply, solution assembly
//! - Level 4: Utilities

use hexdrop_core::{encode, Board, Phrase, Unit};

use crate::clock::{Clock, SystemClock};
use crate::phrase::PhraseInserter;
use crate::tree::{BoardTree, NodeId};
use crate::SolverConfig;

/// How far progress may drift from elapsed time before the ply changes
const PLY_SLACK: f64 = 0.05;

// ============================================================================
// SEARCH RESULT
// ============================================================================

/// Counters collected during one search
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Expand-prune-descend cycles
    pub rounds: usize,
    /// Nodes expanded
    pub expansions: usize,
    /// Times the search stepped back from a disappointing node
    pub backtracks: usize,
    /// Largest arena size seen
    pub peak_nodes: usize,
    /// Ply in use when the search ended
    pub final_ply: usize,
    /// The time or node budget ran out before the sequence was consumed
    pub stopped_early: bool,
}

/// Result of solving one piece sequence
#[derive(Clone, Debug)]
pub struct SolveResult {
    /// Command string for the whole game
    pub solution: String,
    /// Points earned by the chosen line, phrases included
    pub score: i64,
    pub pieces_placed: usize,
    /// Board after the last placed piece
    pub final_board: Board,
    pub stats: SearchStats,
}

// ============================================================================
// ADAPTIVE PLY (Level 3)
// ============================================================================

/// Adjust the branching factor by one step toward keeping progress through
/// the piece sequence in line with elapsed time. Both fractions are in 0..=1.
pub fn adapt_ply(ply: usize, elapsed: f64, progress: f64, min_ply: usize, max_ply: usize) -> usize {
    let ply = if progress + PLY_SLACK < elapsed {
        ply.saturating_sub(1)
    } else if progress > elapsed + PLY_SLACK {
        ply + 1
    } else {
        ply
    };
    ply.clamp(min_ply.max(1), max_ply.max(min_ply).max(1))
}

// ============================================================================
// SOLVER (Level 2 - Main Coordination)
// ============================================================================

/// Searches one piece sequence
pub struct Solver<C: Clock = SystemClock> {
    config: SolverConfig,
    phrases: Vec<Phrase>,
    clock: C,
}

impl Solver<SystemClock> {
    /// Solver timed by the wall clock, started now
    pub fn new(config: SolverConfig) -> Self {
        Self::with_clock(config, SystemClock::start())
    }
}

impl<C: Clock> Solver<C> {
    pub fn with_clock(config: SolverConfig, clock: C) -> Self {
        let phrases = config
            .phrases
            .iter()
            .filter_map(|text| match Phrase::parse(text) {
                Ok(phrase) => Some(phrase),
                Err(e) => {
                    tracing::warn!("Ignoring phrase {:?}: {}", text, e);
                    None
                }
            })
            .collect();
        Self {
            config,
            phrases,
            clock,
        }
    }

    /// Run the search from `board` over `pieces`
    pub fn solve(&self, board: Board, pieces: &[Unit]) -> SolveResult {
        let mut tree = BoardTree::new(board);
        let mut stats = SearchStats::default();
        let mut trail: Vec<NodeId> = Vec::new();
        let mut current = tree.root();
        let mut ply = self.config.ply.max(1);
        let node_limit = self.config.max_nodes.unwrap_or(usize::MAX);

        loop {
            let depth = tree.get(current).depth;
            if depth >= pieces.len() {
                break;
            }
            if self.out_of_budget(&tree) {
                stats.stopped_early = true;
                break;
            }
            if let Some(elapsed) = self.elapsed_fraction() {
                if self.config.adaptive {
                    let progress = depth as f64 / pieces.len() as f64;
                    ply = adapt_ply(ply, elapsed, progress, self.config.min_ply, self.config.max_ply);
                }
            }

            let target = (depth + self.config.lookahead.max(1)).min(pieces.len());
            stats.expansions += tree.expand_frontier(current, target, pieces, ply, node_limit);
            stats.peak_nodes = stats.peak_nodes.max(tree.len());
            // A round cut short by the budget says nothing about `current`
            if tree.nodes_at_depth(current, target).is_empty() && self.out_of_budget(&tree) {
                stats.stopped_early = true;
                break;
            }
            tree.retain_best(current, target, self.config.beam.max(1));
            stats.rounds += 1;

            match tree.best_at_depth(current, target) {
                Some(next) => {
                    tracing::debug!(
                        "Round {}: depth {} -> {}, ply {}, score {}, {} nodes",
                        stats.rounds,
                        depth,
                        target,
                        ply,
                        tree.get(next).board.score(),
                        tree.len()
                    );
                    trail.push(current);
                    current = next;
                }
                None => {
                    tree.mark_disappointed(current);
                    stats.backtracks += 1;
                    tracing::debug!("Round {}: nothing survives below depth {}, backing up", stats.rounds, depth);
                    match trail.pop() {
                        Some(previous) => current = previous,
                        None => break,
                    }
                }
            }
        }

        stats.final_ply = ply;
        self.assemble(&tree, tree.best_node(current), stats)
    }

    // ========================================================================
    // Level 3: Budget
    // ========================================================================

    /// Share of the time limit already spent, if there is one
    fn elapsed_fraction(&self) -> Option<f64> {
        let limit = self.config.time_limit?;
        if limit.is_zero() {
            return Some(1.0);
        }
        Some((self.clock.elapsed().as_secs_f64() / limit.as_secs_f64()).min(1.0))
    }

    fn out_of_budget(&self, tree: &BoardTree) -> bool {
        let out_of_time = self
            .config
            .time_limit
            .is_some_and(|limit| self.clock.elapsed() >= limit);
        let out_of_nodes = self.config.max_nodes.is_some_and(|cap| tree.len() >= cap);
        out_of_time || out_of_nodes
    }

    // ========================================================================
    // Level 3: Solution Assembly
    // ========================================================================

    /// Command text for the line from the root to `best`, spelling phrases
    /// where they fit.
    fn assemble(&self, tree: &BoardTree, best: NodeId, stats: SearchStats) -> SolveResult {
        let path = tree.path_to(best);
        let inserter = PhraseInserter::new(&self.phrases, self.config.phrase_attempts);

        let mut scored = tree.get(NodeId::ROOT).board.clone();
        let mut solution = String::new();
        for &id in path.iter().skip(1) {
            let Some(edge) = &tree.get(id).edge else {
                continue;
            };
            if self.phrases.is_empty() {
                solution.push_str(&encode(&edge.moves));
                scored = scored.place(&edge.goal);
            } else {
                let refined = inserter.refine(&scored, edge);
                solution.push_str(&refined.text);
                scored = refined.board.place(&edge.goal);
            }
        }

        SolveResult {
            solution,
            score: scored.score(),
            pieces_placed: tree.get(best).depth,
            final_board: scored,
            stats,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
