//! Configuration types for solving
//!
//! Level 4 - Utilities and configuration

use std::time::Duration;

/// Fixed per-node cost on top of the occupancy grid: the node record, its
/// edge placements and move list, the cached heuristic and the child list.
const NODE_OVERHEAD_BYTES: usize = 512;

/// Search configuration for one seed
#[derive(Clone, Debug)]
pub struct SolverConfig {
    /// Pieces placed per descent step
    pub lookahead: usize,
    /// Children kept per expanded node (starting value when adaptive)
    pub ply: usize,
    pub min_ply: usize,
    pub max_ply: usize,
    /// Leaves kept at the lookahead frontier after pruning
    pub beam: usize,
    /// Wall-clock budget (None = run to completion)
    pub time_limit: Option<Duration>,
    /// Arena size cap (None = unbounded)
    pub max_nodes: Option<usize>,
    /// Phrases of power, in preference order
    pub phrases: Vec<String>,
    /// Entry placements tried per phrase before giving up on it
    pub phrase_attempts: usize,
    /// Retune ply each round from elapsed time vs progress
    pub adaptive: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            lookahead: 2,
            ply: 4,
            min_ply: 1,
            max_ply: 12,
            beam: 24,
            time_limit: None,
            max_nodes: None,
            phrases: Vec::new(),
            phrase_attempts: 64,
            adaptive: true,
        }
    }
}

impl SolverConfig {
    /// Set the wall-clock budget
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Set the node cap
    pub fn with_max_nodes(mut self, nodes: usize) -> Self {
        self.max_nodes = Some(nodes);
        self
    }

    pub fn with_phrases(mut self, phrases: Vec<String>) -> Self {
        self.phrases = phrases;
        self
    }

    pub fn with_lookahead(mut self, lookahead: usize) -> Self {
        self.lookahead = lookahead.max(1);
        self
    }

    /// Set the starting ply (clamped into the adaptive range)
    pub fn with_ply(mut self, ply: usize) -> Self {
        self.ply = ply.max(1);
        self.max_ply = self.max_ply.max(self.ply);
        self.min_ply = self.min_ply.min(self.ply);
        self
    }

    pub fn with_beam(mut self, beam: usize) -> Self {
        self.beam = beam.max(1);
        self
    }

    /// Fixed ply regardless of the clock
    pub fn fixed_ply(mut self) -> Self {
        self.adaptive = false;
        self
    }
}

/// Settings for a whole puzzle run (all seeds)
#[derive(Clone, Debug, Default)]
pub struct RunConfig {
    pub solver: SolverConfig,
    /// Worker threads (None = rayon default)
    pub cores: Option<usize>,
    /// Tag written into every solution record
    pub tag: Option<String>,
}

impl RunConfig {
    pub fn new(solver: SolverConfig) -> Self {
        Self {
            solver,
            ..Default::default()
        }
    }

    pub fn with_cores(mut self, cores: usize) -> Self {
        self.cores = Some(cores.max(1));
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

/// Node cap that keeps one search within `megabytes` on a board of
/// `board_cells` cells.
pub fn max_nodes_for_megabytes(megabytes: usize, board_cells: usize) -> usize {
    let bytes = megabytes.saturating_mul(1024 * 1024);
    (bytes / (board_cells + NODE_OVERHEAD_BYTES)).max(1)
}
