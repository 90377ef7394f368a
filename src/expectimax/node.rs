use smallvec::SmallVec;

use crate::engine::{Direction, GridState};

use super::LeafUtility;

/// A legal move from a node: the resulting board and the direction that produced it.
#[derive(Debug, Clone)]
pub struct SearchOption {
    pub state: GridState,
    pub dir: Direction,
}

/// A board snapshot plus its legal moves.
///
/// Options follow [`Direction::SEARCH_ORDER`] with no-op directions dropped.
/// Each option owns an independent copy of its board.
#[derive(Debug, Clone)]
pub struct SearchNode {
    state: GridState,
    value: f64,
    options: SmallVec<[SearchOption; 4]>,
}

impl SearchNode {
    /// Node whose leaf value is the board score.
    pub fn new(state: GridState) -> Self { Self::with_utility(state, LeafUtility::Score) }

    pub fn with_utility(state: GridState, utility: LeafUtility) -> Self {
        let options = Direction::SEARCH_ORDER
            .into_iter()
            .filter_map(|dir| {
                let child = state.shift(dir);
                (child.cells() != state.cells()).then_some(SearchOption { state: child, dir })
            })
            .collect();
        let value = utility.evaluate(&state);
        SearchNode { state, value, options }
    }

    /// Node without options, for boards the search will not expand.
    pub(crate) fn leaf(state: GridState, utility: LeafUtility) -> Self {
        let value = utility.evaluate(&state);
        SearchNode { state, value, options: SmallVec::new() }
    }

    #[inline]
    pub fn state(&self) -> &GridState { &self.state }

    /// Leaf value captured at construction.
    #[inline]
    pub fn value(&self) -> f64 { self.value }

    #[inline]
    pub fn options(&self) -> &[SearchOption] { &self.options }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_changing_directions_in_order() {
        // Only Down and Right move anything.
        let g = GridState::from_rows(&[&[2, 0], &[0, 0]]).unwrap();
        let node = SearchNode::new(g);
        let dirs: Vec<_> = node.options().iter().map(|o| o.dir).collect();
        assert_eq!(dirs, vec![Direction::Down, Direction::Right]);
    }

    #[test]
    fn enumerates_up_left_down_right() {
        let g = GridState::from_rows(&[&[0, 0, 0], &[0, 2, 0], &[0, 0, 0]]).unwrap();
        let node = SearchNode::new(g);
        let dirs: Vec<_> = node.options().iter().map(|o| o.dir).collect();
        assert_eq!(dirs, Direction::SEARCH_ORDER.to_vec());
    }

    #[test]
    fn value_is_score_at_construction() {
        let g = GridState::from_rows(&[&[2, 2], &[0, 0]]).unwrap().with_score(36);
        let node = SearchNode::new(g);
        assert_eq!(node.value(), 36.0);
        let left = node.options().iter().find(|o| o.dir == Direction::Left).unwrap();
        assert_eq!(left.state.score(), 40);
        assert_eq!(node.state().score(), 36);
    }

    #[test]
    fn terminal_board_has_no_options() {
        let g = GridState::from_rows(&[&[2, 4], &[4, 2]]).unwrap();
        assert!(SearchNode::new(g).options().is_empty());
    }
}
