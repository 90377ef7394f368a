use crate::engine::{GridState, SPAWN_WEIGHTS};

use super::{warm_heuristics, ExpectimaxConfig, Layer, LeafUtility, SearchNode, SearchOption};

/// Single-threaded, depth-first expectimax evaluator.
///
/// Holds the configuration and a running count of visited nodes. The
/// evaluator never mutates the nodes it is handed; every child board is a
/// fresh copy.
#[derive(Debug, Clone)]
pub struct Expectimax {
    cfg: ExpectimaxConfig,
    nodes: u64,
}

impl Expectimax {
    pub fn new() -> Self { Self::with_config(ExpectimaxConfig::default()) }

    pub fn with_config(cfg: ExpectimaxConfig) -> Self {
        if cfg.utility == LeafUtility::Heuristic {
            warm_heuristics();
        }
        Self { cfg, nodes: 0 }
    }

    #[inline]
    pub fn config(&self) -> &ExpectimaxConfig { &self.cfg }

    /// Nodes visited since construction or the last [`Self::reset_nodes`].
    #[inline]
    pub fn nodes(&self) -> u64 { self.nodes }

    #[inline]
    pub fn reset_nodes(&mut self) { self.nodes = 0; }

    /// Expected value of `node` when it sits in `layer` at `depth`.
    ///
    /// A node is terminal when `depth` reaches `max_depth`, when a max node
    /// has no legal options, or when a chance node has no empty cell.
    /// Terminal nodes return their captured value.
    pub fn evaluate(&mut self, node: &SearchNode, layer: Layer, depth: u32) -> f64 {
        self.nodes += 1;
        match layer {
            Layer::Max => self.evaluate_max(node, depth),
            Layer::Chance => self.evaluate_chance(node, depth),
        }
    }

    /// Expected value of playing a root option: its board enters a chance layer at depth 0.
    pub fn evaluate_option(&mut self, option: &SearchOption) -> f64 {
        let child = self.child_node(option.state.clone(), 0);
        self.evaluate(&child, Layer::Chance, 0)
    }

    fn evaluate_max(&mut self, node: &SearchNode, depth: u32) -> f64 {
        if depth >= self.cfg.max_depth || node.options().is_empty() {
            return node.value();
        }
        let mut best: Option<f64> = None;
        for option in node.options() {
            let child = self.child_node(option.state.clone(), depth + 1);
            let score = self.evaluate(&child, Layer::Chance, depth + 1);
            // Strictly greater keeps the first maximum.
            if best.map_or(true, |b| score > b) {
                best = Some(score);
            }
        }
        best.unwrap_or_else(|| node.value())
    }

    fn evaluate_chance(&mut self, node: &SearchNode, depth: u32) -> f64 {
        let state = node.state();
        let num_empty = state.count_empty();
        if depth >= self.cfg.max_depth || num_empty == 0 {
            return node.value();
        }
        let mut score = 0.0;
        for (row, col) in state.empty_cells() {
            for (tile, weight) in SPAWN_WEIGHTS {
                let child = self.child_node(state.spawned(row, col, tile), depth + 1);
                score += self.evaluate(&child, Layer::Max, depth + 1) * weight;
            }
        }
        score / num_empty as f64
    }

    // Nodes at the depth bound are never expanded, so skip enumerating their moves.
    fn child_node(&self, state: GridState, depth: u32) -> SearchNode {
        if depth >= self.cfg.max_depth {
            SearchNode::leaf(state, self.cfg.utility)
        } else {
            SearchNode::with_utility(state, self.cfg.utility)
        }
    }
}

impl Default for Expectimax { fn default() -> Self { Self::new() } }
