use std::sync::OnceLock;

use smallvec::SmallVec;

use crate::engine::{GridState, Tile};

const LOST_PENALTY: f64 = 200_000.0;
const SUM_POWER: f64 = 3.5;
const SUM_WEIGHT: f64 = 11.0;
const EMPTY_WEIGHT: f64 = 270.0;
const MERGES_WEIGHT: f64 = 700.0;
const MONOTONICITY_POWER: f64 = 4.0;
const MONOTONICITY_WEIGHT: f64 = 47.0;

/// 4-wide lines with ranks below 16 pack into 16 bits and hit this table.
static LINE_SCORES: OnceLock<Box<[f64]>> = OnceLock::new();

pub(crate) fn warm() {
    let _ = line_scores();
}

fn line_scores() -> &'static [f64] {
    LINE_SCORES
        .get_or_init(|| {
            let mut v = vec![0.0f64; 0x1_0000];
            for (i, slot) in v.iter_mut().enumerate() {
                let ranks = [(i >> 12) & 0xf, (i >> 8) & 0xf, (i >> 4) & 0xf, i & 0xf].map(|r| r as u32);
                *slot = calc_line_score(&ranks);
            }
            v.into_boxed_slice()
        })
        .as_ref()
}

/// Heuristic value of a board: the sum of every row and column score.
///
/// Rewards empty cells and adjacent equal tiles, penalizes non-monotonic lines
/// and large tile mass. Independent of the game score.
pub(crate) fn get_heuristic_score(grid: &GridState) -> f64 {
    let n = grid.size();
    let cells = grid.cells();
    let mut line: SmallVec<[u32; 8]> = SmallVec::with_capacity(n);
    let mut score = 0.0;
    for i in 0..n {
        line.clear();
        line.extend(cells[i * n..(i + 1) * n].iter().map(|&v| rank(v)));
        score += line_score(&line);
        line.clear();
        line.extend((0..n).map(|j| rank(cells[j * n + i])));
        score += line_score(&line);
    }
    score
}

#[inline]
fn rank(tile: Tile) -> u32 { if tile == 0 { 0 } else { tile.trailing_zeros() } }

fn line_score(ranks: &[u32]) -> f64 {
    if ranks.len() == 4 && ranks.iter().all(|&r| r < 16) {
        let idx = ranks.iter().fold(0usize, |acc, &r| (acc << 4) | r as usize);
        line_scores()[idx]
    } else {
        calc_line_score(ranks)
    }
}

fn calc_line_score(ranks: &[u32]) -> f64 {
    LOST_PENALTY + calc_empty(ranks) + calc_merges(ranks) - calc_monotonicity(ranks) - calc_sum(ranks)
}

fn calc_sum(line: &[u32]) -> f64 {
    line.iter().map(|&r| (r as f64).powf(SUM_POWER)).sum::<f64>() * SUM_WEIGHT
}

fn calc_empty(line: &[u32]) -> f64 {
    line.iter().filter(|&&r| r == 0).count() as f64 * EMPTY_WEIGHT
}

// Runs of equal tiles, ignoring gaps between them.
fn calc_merges(line: &[u32]) -> f64 {
    let mut prev = 0;
    let mut counter = 0;
    let mut merges = 0;
    for &r in line.iter().filter(|&&r| r != 0) {
        if prev == r {
            counter += 1;
        } else if counter > 0 {
            merges += 1 + counter;
            counter = 0;
        }
        prev = r;
    }
    if counter > 0 {
        merges += 1 + counter;
    }
    merges as f64 * MERGES_WEIGHT
}

fn calc_monotonicity(line: &[u32]) -> f64 {
    let mut monotonicity_left = 0.;
    let mut monotonicity_right = 0.;
    for pair in line.windows(2) {
        let tile1 = pair[0] as f64;
        let tile2 = pair[1] as f64;
        if tile1 > tile2 {
            monotonicity_left += tile1.powf(MONOTONICITY_POWER) - tile2.powf(MONOTONICITY_POWER);
        } else {
            monotonicity_right += tile2.powf(MONOTONICITY_POWER) - tile1.powf(MONOTONICITY_POWER);
        }
    }
    f64::min(monotonicity_left, monotonicity_right) * MONOTONICITY_WEIGHT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_matches_direct_computation() {
        for ranks in [[0, 0, 0, 0], [1, 1, 2, 3], [11, 3, 0, 3], [15, 14, 1, 1]] {
            assert_eq!(line_score(&ranks), calc_line_score(&ranks));
        }
    }

    #[test]
    fn empty_board_scores_penalty_plus_empties() {
        let g = GridState::new(3).unwrap();
        let per_line = LOST_PENALTY + 3.0 * EMPTY_WEIGHT;
        assert_eq!(get_heuristic_score(&g), 6.0 * per_line);
    }

    #[test]
    fn wide_boards_score_every_line() {
        // Lines longer than the inline rank buffer.
        let mut g = GridState::new(10).unwrap();
        let per_line = LOST_PENALTY + 10.0 * EMPTY_WEIGHT;
        assert_eq!(get_heuristic_score(&g), 20.0 * per_line);
        g.place_tile(0, 0, 2).unwrap();
        let row = calc_line_score(&[1, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(get_heuristic_score(&g), 18.0 * per_line + 2.0 * row);
    }

    #[test]
    fn counts_merge_runs_across_gaps() {
        assert_eq!(calc_merges(&[1, 0, 1, 0]), 2.0 * MERGES_WEIGHT);
        assert_eq!(calc_merges(&[1, 1, 1, 2]), 3.0 * MERGES_WEIGHT);
        assert_eq!(calc_merges(&[1, 2, 3, 4]), 0.0);
    }

    #[test]
    fn monotone_lines_are_not_penalized() {
        assert_eq!(calc_monotonicity(&[4, 3, 2, 1]), 0.0);
        assert_eq!(calc_monotonicity(&[1, 2, 3, 4, 5]), 0.0);
        assert!(calc_monotonicity(&[1, 4, 1, 4]) > 0.0);
    }

    #[test]
    fn prefers_open_boards() {
        let open = GridState::from_rows(&[&[4, 2, 0, 0], &[0, 0, 0, 0], &[0, 0, 0, 0], &[0, 0, 0, 0]]).unwrap();
        let cramped = GridState::from_rows(&[&[2, 4, 2, 4], &[4, 2, 4, 2], &[2, 4, 2, 4], &[4, 2, 4, 0]]).unwrap();
        assert!(get_heuristic_score(&open) > get_heuristic_score(&cramped));
    }
}
