//! Depth-limited expectimax search over [`GridState`](crate::engine::GridState)s.
//!
//! The search alternates two layers:
//! - a max layer, where the agent picks the best of at most four legal moves;
//! - a chance layer, where every empty cell may receive a 2 (90%) or a 4 (10%).
//!
//! Every recursive call owns its own copy of the board, so the caller's grid is
//! never touched. The depth bound comes from [`ExpectimaxConfig::max_depth`]
//! rather than a global, which lets tests pin the search to any depth.
//!
//! Quick start
//! ```
//! use gridbot::engine::{Direction, GridState};
//! use gridbot::expectimax::{Expectimax, ExpectimaxConfig, Layer, SearchNode};
//!
//! let grid = GridState::from_rows(&[&[2, 2], &[0, 0]]).unwrap();
//! let node = SearchNode::new(grid);
//! assert_eq!(node.options()[0].dir, Direction::Left);
//!
//! let mut ex = Expectimax::with_config(ExpectimaxConfig { max_depth: 2, ..Default::default() });
//! let v = ex.evaluate(&node, Layer::Max, 0);
//! assert!(v >= 4.0);
//! ```

use crate::engine::GridState;

mod heuristic;
mod node;
mod search_par;
mod search_seq;

pub use node::{SearchNode, SearchOption};
pub(crate) use search_par::root_evals_par;
pub use search_seq::Expectimax;

/// Which of the two alternating search layers a node sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    /// The agent chooses a move.
    Max,
    /// The environment spawns a tile.
    Chance,
}

/// Leaf value used when the search bottoms out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeafUtility {
    /// The board's accumulated score.
    #[default]
    Score,
    /// Row/column heuristic rewarding empty cells, merge potential and monotonic lines.
    Heuristic,
}

impl LeafUtility {
    #[inline]
    pub fn evaluate(self, grid: &GridState) -> f64 {
        match self {
            LeafUtility::Score => grid.score() as f64,
            LeafUtility::Heuristic => heuristic::get_heuristic_score(grid),
        }
    }
}

/// Configurable knobs for the search.
///
/// - `max_depth`: number of layers (max and chance each count one) searched
///   below a root option before returning leaf values.
/// - `utility`: leaf value.
/// - `parallel_root`: evaluate root options on the rayon pool. Results are
///   identical to the sequential search.
#[derive(Debug, Clone)]
pub struct ExpectimaxConfig {
    pub max_depth: u32,
    pub utility: LeafUtility,
    pub parallel_root: bool,
}

impl Default for ExpectimaxConfig {
    fn default() -> Self {
        Self { max_depth: 4, utility: LeafUtility::Score, parallel_root: false }
    }
}

/// Expected value of one legal root move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchEval {
    pub dir: crate::engine::Direction,
    pub ev: f64,
}

/// Basic search stats for a single evaluation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchStats {
    pub nodes: u64,
    pub peak_nodes: u64,
}

/// Warm lookup tables used by the heuristic leaf. Safe to call multiple times.
pub(crate) fn warm_heuristics() {
    heuristic::warm();
}
