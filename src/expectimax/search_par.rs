use rayon::prelude::*;

use super::{BranchEval, Expectimax, ExpectimaxConfig, SearchNode};

/// Evaluate every root option on the rayon pool.
///
/// Each branch runs its own sequential [`Expectimax`] over its own board copy,
/// so the values match the sequential search exactly. Results keep the root's
/// option order. Also returns the total number of nodes visited.
pub(crate) fn root_evals_par(cfg: &ExpectimaxConfig, root: &SearchNode) -> (Vec<BranchEval>, u64) {
    let out: Vec<(BranchEval, u64)> = root
        .options()
        .par_iter()
        .map(|option| {
            let mut ex = Expectimax::with_config(cfg.clone());
            let ev = ex.evaluate_option(option);
            (BranchEval { dir: option.dir, ev }, ex.nodes())
        })
        .collect();
    let nodes: u64 = out.iter().map(|(_, n)| n).sum();
    (out.into_iter().map(|(branch, _)| branch).collect(), nodes)
}
