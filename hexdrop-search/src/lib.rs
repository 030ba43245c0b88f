//! HEXDROP Search - Lookahead tree search over piece placements
//!
//! This crate turns a board and a piece sequence into a command string:
//! - Path finding from spawn to a resting placement
//! - Board tree with beam pruning and backtracking
//! - Adaptive branching under a time budget
//! - Phrase-of-power insertion into the final route
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: solve_puzzle, solve_seed (orchestration)
//! - Level 2: Solver::solve, tree pruning (phases)
//! - Level 3: expansion, path finding, phrase fitting (steps)
//! - Level 4: configuration, clocks, utilities

pub mod clock;
pub mod path;
pub mod phrase;
pub mod search;
pub mod tree;

mod config;
mod runner;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{max_nodes_for_megabytes, RunConfig, SolverConfig};
pub use path::{find_path, generate_path, Inaccessible};
pub use phrase::{PhraseInserter, RefinedEdge};
pub use runner::{puzzle_solutions, solve_puzzle, solve_seed, SeedOutcome};
pub use search::{adapt_ply, SearchStats, SolveResult, Solver};
pub use tree::{generate_goals, BoardNode, BoardTree, Edge, Goal, NodeId};
