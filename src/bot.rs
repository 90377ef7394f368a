//! Move selection: the entry point the game loop talks to.

use log::debug;

use crate::engine::{Direction, GridState};
use crate::error::GridError;
use crate::expectimax::{root_evals_par, BranchEval, Expectimax, ExpectimaxConfig, SearchNode, SearchStats};

/// Expectimax-driven player.
///
/// Each decision works on a private snapshot of the board; the caller's grid
/// is never modified.
///
/// ```
/// use gridbot::bot::Bot;
/// use gridbot::engine::{Direction, GridState};
///
/// let grid = GridState::from_rows(&[&[2, 2, 0, 0], &[0, 0, 0, 0], &[0, 0, 0, 0], &[0, 0, 0, 0]]).unwrap();
/// let mut bot = Bot::new();
/// let dir = bot.get_move(&grid).unwrap();
/// assert!(Direction::ALL.contains(&dir));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Bot {
    cfg: ExpectimaxConfig,
    stats: SearchStats,
}

impl Bot {
    pub fn new() -> Self { Self::with_config(ExpectimaxConfig::default()) }

    pub fn with_config(cfg: ExpectimaxConfig) -> Self { Self { cfg, stats: SearchStats::default() } }

    #[inline]
    pub fn config(&self) -> &ExpectimaxConfig { &self.cfg }

    /// Pick the move with the highest expected value.
    ///
    /// Ties go to the earliest direction in [`Direction::SEARCH_ORDER`].
    /// Returns [`GridError::NoLegalMoves`] on a terminal board; check
    /// [`GridState::can_move`] first.
    pub fn get_move(&mut self, state: &GridState) -> Result<Direction, GridError> {
        let branches = self.branch_evals(state)?;
        let mut best: Option<BranchEval> = None;
        for branch in branches {
            if best.map_or(true, |b| branch.ev > b.ev) {
                best = Some(branch);
            }
        }
        best.map(|b| b.dir).ok_or(GridError::NoLegalMoves)
    }

    /// Expected value of every legal move, in search order.
    pub fn branch_evals(&mut self, state: &GridState) -> Result<Vec<BranchEval>, GridError> {
        let root = SearchNode::with_utility(state.clone(), self.cfg.utility);
        if root.options().is_empty() {
            return Err(GridError::NoLegalMoves);
        }
        let (branches, nodes) = if self.cfg.parallel_root {
            root_evals_par(&self.cfg, &root)
        } else {
            let mut ex = Expectimax::with_config(self.cfg.clone());
            let branches = root
                .options()
                .iter()
                .map(|option| BranchEval { dir: option.dir, ev: ex.evaluate_option(option) })
                .collect();
            (branches, ex.nodes())
        };
        for branch in &branches {
            debug!("branch {}: ev {:.3}", branch.dir, branch.ev);
        }
        debug!("evaluated {} nodes at max depth {}", nodes, self.cfg.max_depth);
        self.stats.nodes = nodes;
        self.stats.peak_nodes = self.stats.peak_nodes.max(nodes);
        Ok(branches)
    }

    /// Statistics collected from the last call to [`Self::get_move`] or [`Self::branch_evals`].
    #[inline]
    pub fn last_stats(&self) -> SearchStats { self.stats }

    #[inline]
    pub fn reset_stats(&mut self) { self.stats = SearchStats::default(); }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expectimax::LeafUtility;

    fn grid(rows: &[&[u64]]) -> GridState { GridState::from_rows(rows).unwrap() }

    fn bot(max_depth: u32) -> Bot { Bot::with_config(ExpectimaxConfig { max_depth, ..Default::default() }) }

    #[test]
    fn terminal_board_is_an_error() {
        let g = grid(&[&[2, 4], &[4, 2]]);
        assert_eq!(bot(2).get_move(&g), Err(GridError::NoLegalMoves));
    }

    #[test]
    fn prefers_the_merge() {
        // Only Left and Right merge; Left comes first in search order.
        let g = grid(&[&[2, 2, 0, 0], &[0, 0, 0, 0], &[0, 0, 0, 0], &[0, 0, 0, 0]]);
        assert_eq!(bot(0).get_move(&g), Ok(Direction::Left));
        assert_eq!(bot(1).get_move(&g), Ok(Direction::Left));
    }

    #[test]
    fn ties_go_to_first_in_search_order() {
        // No move scores anything at depth 0, so every branch ties.
        let g = grid(&[&[0, 0, 0], &[0, 2, 0], &[0, 0, 0]]);
        let mut b = bot(0);
        let branches = b.branch_evals(&g).unwrap();
        assert!(branches.iter().all(|br| br.ev == 0.0));
        assert_eq!(b.get_move(&g), Ok(Direction::Up));

        let g = grid(&[&[2, 0], &[0, 0]]);
        assert_eq!(bot(0).get_move(&g), Ok(Direction::Down));
    }

    #[test]
    fn only_legal_moves_are_evaluated() {
        // The single gap sits bottom-right, so only Down and Right move anything.
        let g = grid(&[&[2, 4, 8], &[4, 8, 2], &[8, 2, 0]]);
        let mut b = bot(3);
        let branches = b.branch_evals(&g).unwrap();
        let dirs: Vec<_> = branches.iter().map(|br| br.dir).collect();
        assert_eq!(dirs, vec![Direction::Down, Direction::Right]);
    }

    #[test]
    fn leaves_caller_board_untouched() {
        let g = grid(&[&[2, 2, 4, 0], &[0, 4, 4, 8], &[2, 0, 2, 0], &[0, 0, 0, 16]]).with_score(40);
        let snapshot = g.clone();
        bot(3).get_move(&g).unwrap();
        assert_eq!(g, snapshot);
    }

    #[test]
    fn parallel_root_agrees_with_sequential() {
        let g = grid(&[&[2, 2, 4, 0], &[0, 4, 4, 8], &[2, 0, 2, 0], &[0, 0, 0, 16]]);
        let mut seq = bot(3);
        let mut par = Bot::with_config(ExpectimaxConfig { max_depth: 3, parallel_root: true, ..Default::default() });
        assert_eq!(seq.branch_evals(&g).unwrap(), par.branch_evals(&g).unwrap());
        assert_eq!(seq.last_stats().nodes, par.last_stats().nodes);
    }

    #[test]
    fn stats_track_peak() {
        let mut b = Bot::with_config(ExpectimaxConfig { max_depth: 2, utility: LeafUtility::Heuristic, ..Default::default() });
        let busy = grid(&[&[2, 0, 0, 0], &[0, 0, 0, 0], &[0, 0, 0, 0], &[0, 0, 0, 2]]);
        let quiet = grid(&[&[2, 4, 8, 16], &[4, 8, 16, 32], &[8, 16, 32, 64], &[16, 32, 64, 0]]);
        b.get_move(&busy).unwrap();
        let busy_nodes = b.last_stats().nodes;
        b.get_move(&quiet).unwrap();
        assert!(b.last_stats().nodes < busy_nodes);
        assert_eq!(b.last_stats().peak_nodes, busy_nodes);
        b.reset_stats();
        assert_eq!(b.last_stats().nodes, 0);
    }
}
