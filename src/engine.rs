use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

use crate::error::GridError;

pub type Tile = u64;
pub type Score = u64;

/// Tile values a spawn can produce, with their probabilities.
pub const SPAWN_WEIGHTS: [(Tile, f64); 2] = [(2, 0.9), (4, 0.1)];

/// Tile value that counts as a win.
pub const WINNING_TILE: Tile = 2048;

/// Largest supported side length.
pub const MAX_SIZE: usize = 64;

/// A direction to move/merge tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// Order in which the search enumerates options. Ties go to the earliest entry.
    pub const SEARCH_ORDER: [Direction; 4] = [Direction::Up, Direction::Left, Direction::Down, Direction::Right];

    /// The primitive sequence realizing this direction.
    ///
    /// Every direction is the leftward slide conjugated by transpose and/or
    /// reverse, so the four moves share one merge rule.
    fn plan(self) -> &'static [Step] {
        match self {
            Direction::Left => &[Step::Slide],
            Direction::Right => &[Step::Reverse, Step::Slide, Step::Reverse],
            Direction::Up => &[Step::Transpose, Step::Slide, Step::Transpose],
            Direction::Down => &[
                Step::Transpose,
                Step::Reverse,
                Step::Slide,
                Step::Reverse,
                Step::Transpose,
            ],
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Up => "Up",
            Direction::Down => "Down",
            Direction::Left => "Left",
            Direction::Right => "Right",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy)]
enum Step {
    Transpose,
    Reverse,
    /// compress → merge → compress, latching `moved` after the first pass.
    Slide,
}

/// What a single `apply_move` did to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveOutcome {
    /// True when the cell matrix differs from before the move.
    pub changed: bool,
    /// Sum of the tiles produced by merges during this move.
    pub score_delta: Score,
}

/// An N×N board of tile values (0 = empty) plus the running score.
///
/// Cells are stored row-major and inline for boards up to 4×4, so cloning a
/// standard board is a plain copy with no heap traffic. Every clone is fully
/// independent of its source.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "RawGrid")]
pub struct GridState {
    size: usize,
    cells: SmallVec<[Tile; 16]>,
    score: Score,
    #[serde(skip)]
    compressed: bool,
    #[serde(skip)]
    merged: bool,
    #[serde(skip)]
    moved: bool,
}

#[derive(Deserialize)]
struct RawGrid {
    size: usize,
    cells: Vec<Tile>,
    score: Score,
}

impl TryFrom<RawGrid> for GridState {
    type Error = GridError;

    fn try_from(raw: RawGrid) -> Result<Self, Self::Error> {
        Ok(GridState::from_cells(raw.size, raw.cells)?.with_score(raw.score))
    }
}

impl GridState {
    /// Create an empty `size`×`size` board.
    ///
    /// ```
    /// use gridbot::engine::GridState;
    /// let g = GridState::new(4).unwrap();
    /// assert_eq!(g.empty_cells().count(), 16);
    /// assert!(GridState::new(1).is_err());
    /// ```
    pub fn new(size: usize) -> Result<Self, GridError> {
        let len = cell_count(size)?;
        Ok(GridState {
            size,
            cells: SmallVec::from_elem(0, len),
            score: 0,
            compressed: false,
            merged: false,
            moved: false,
        })
    }

    /// Build a board from rows of tile values. Rows must form a square.
    ///
    /// ```
    /// use gridbot::engine::GridState;
    /// let g = GridState::from_rows(&[&[2, 0], &[0, 2]]).unwrap();
    /// assert_eq!(g.get(1, 1), Some(2));
    /// ```
    pub fn from_rows(rows: &[&[Tile]]) -> Result<Self, GridError> {
        let size = rows.len();
        for row in rows {
            if row.len() != size {
                return Err(GridError::ShapeMismatch { expected: size, found: row.len() });
            }
        }
        Self::from_cells(size, rows.iter().flat_map(|row| row.iter().copied()))
    }

    /// Build a board from row-major cell values.
    pub fn from_cells<I: IntoIterator<Item = Tile>>(size: usize, cells: I) -> Result<Self, GridError> {
        let len = cell_count(size)?;
        let cells: SmallVec<[Tile; 16]> = cells.into_iter().take(len + 1).collect();
        if cells.len() != len {
            return Err(GridError::ShapeMismatch { expected: len, found: cells.len() });
        }
        if let Some(&value) = cells.iter().find(|&&v| !is_valid_tile(v)) {
            return Err(GridError::InvalidTile { value });
        }
        Ok(GridState { size, cells, score: 0, compressed: false, merged: false, moved: false })
    }

    /// Replace the score, e.g. when restoring a board mid-game.
    #[inline]
    pub fn with_score(mut self, score: Score) -> Self {
        self.score = score;
        self
    }

    #[inline]
    pub fn size(&self) -> usize { self.size }

    #[inline]
    pub fn score(&self) -> Score { self.score }

    /// Row-major view of all cells.
    #[inline]
    pub fn cells(&self) -> &[Tile] { &self.cells }

    pub fn rows(&self) -> impl Iterator<Item = &[Tile]> + '_ { self.cells.chunks(self.size) }

    /// Cell value at `(row, col)`, or `None` outside the board.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<Tile> {
        if row < self.size && col < self.size { Some(self.cells[row * self.size + col]) } else { None }
    }

    #[inline]
    pub fn compressed(&self) -> bool { self.compressed }

    #[inline]
    pub fn merged(&self) -> bool { self.merged }

    /// Whether the last move shifted or merged anything; drives the post-move spawn.
    #[inline]
    pub fn moved(&self) -> bool { self.moved }

    pub fn clear_flags(&mut self) {
        self.compressed = false;
        self.merged = false;
        self.moved = false;
    }

    /// Apply a move in place.
    ///
    /// ```
    /// use gridbot::engine::{Direction, GridState};
    /// let mut g = GridState::from_rows(&[&[2, 2], &[0, 0]]).unwrap();
    /// let out = g.apply_move(Direction::Left);
    /// assert!(out.changed);
    /// assert_eq!(out.score_delta, 4);
    /// assert_eq!(g.cells(), &[4, 0, 0, 0]);
    /// ```
    pub fn apply_move(&mut self, dir: Direction) -> MoveOutcome {
        let before = self.cells.clone();
        let score_before = self.score;
        for step in dir.plan() {
            match step {
                Step::Transpose => self.transpose(),
                Step::Reverse => self.reverse(),
                Step::Slide => {
                    self.compress();
                    self.merge();
                    self.moved = self.compressed || self.merged;
                    self.compress_rows();
                }
            }
        }
        let changed = self.cells != before;
        debug_assert_eq!(changed, self.moved);
        MoveOutcome { changed, score_delta: self.score - score_before }
    }

    /// Return the board after moving in `dir`, leaving `self` untouched.
    #[inline]
    pub fn shift(&self, dir: Direction) -> GridState {
        let mut next = self.clone();
        next.clear_flags();
        next.apply_move(dir);
        next
    }

    /// Slide non-zero tiles of every row toward column 0, keeping their order.
    ///
    /// Sets and returns the `compressed` flag.
    pub fn compress(&mut self) -> bool {
        self.compressed = self.compress_rows();
        self.compressed
    }

    /// Merge equal horizontal neighbours left to right, at most once per tile.
    ///
    /// Sets and returns the `merged` flag; merged values are added to the score.
    pub fn merge(&mut self) -> bool {
        let mut merged = false;
        let mut gained = 0;
        for row in self.cells.chunks_mut(self.size) {
            let mut j = 0;
            while j + 1 < row.len() {
                if row[j] != 0 && row[j] == row[j + 1] {
                    row[j] *= 2;
                    row[j + 1] = 0;
                    gained += row[j];
                    merged = true;
                    j += 2;
                } else {
                    j += 1;
                }
            }
        }
        self.score += gained;
        self.merged = merged;
        merged
    }

    /// Swap rows and columns.
    pub fn transpose(&mut self) {
        let n = self.size;
        for i in 0..n {
            for j in (i + 1)..n {
                self.cells.swap(i * n + j, j * n + i);
            }
        }
    }

    /// Reverse the cells within every row.
    pub fn reverse(&mut self) {
        for row in self.cells.chunks_mut(self.size) {
            row.reverse();
        }
    }

    fn compress_rows(&mut self) -> bool {
        let mut changed = false;
        for row in self.cells.chunks_mut(self.size) {
            let mut write = 0;
            for read in 0..row.len() {
                let val = row[read];
                if val == 0 {
                    continue;
                }
                if write != read {
                    row[write] = val;
                    row[read] = 0;
                    changed = true;
                }
                write += 1;
            }
        }
        changed
    }

    /// Coordinates `(row, col)` of every empty cell, row-major.
    ///
    /// The iterator is lazy and `Clone`, so it can be restarted cheaply.
    pub fn empty_cells(&self) -> impl Iterator<Item = (usize, usize)> + Clone + '_ {
        let n = self.size;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &v)| v == 0)
            .map(move |(idx, _)| (idx / n, idx % n))
    }

    #[inline]
    pub fn count_empty(&self) -> usize { self.cells.iter().filter(|&&v| v == 0).count() }

    #[inline]
    pub fn has_empty_cells(&self) -> bool { self.cells.contains(&0) }

    /// True if two horizontally or vertically adjacent cells hold the same non-zero value.
    pub fn can_merge(&self) -> bool {
        let n = self.size;
        let horizontal = self.rows().any(|row| row.windows(2).any(|w| w[0] != 0 && w[0] == w[1]));
        horizontal
            || (0..n - 1).any(|i| {
                let (upper, lower) = (&self.cells[i * n..(i + 1) * n], &self.cells[(i + 1) * n..(i + 2) * n]);
                upper.iter().zip(lower).any(|(a, b)| *a != 0 && a == b)
            })
    }

    /// False exactly when the game is over.
    #[inline]
    pub fn can_move(&self) -> bool { self.has_empty_cells() || self.can_merge() }

    /// Highest tile value on the board (0 when empty).
    pub fn highest_tile(&self) -> Tile { self.cells.iter().copied().max().unwrap_or(0) }

    #[inline]
    pub fn has_tile_at_least(&self, target: Tile) -> bool { self.cells.iter().any(|&v| v >= target) }

    /// Place `value` on an empty cell.
    pub fn place_tile(&mut self, row: usize, col: usize, value: Tile) -> Result<(), GridError> {
        if value == 0 || !is_valid_tile(value) {
            return Err(GridError::InvalidTile { value });
        }
        let idx = self.index(row, col)?;
        if self.cells[idx] != 0 {
            return Err(GridError::SpawnOnOccupiedCell);
        }
        self.cells[idx] = value;
        Ok(())
    }

    /// Copy of this board with `value` placed at `(row, col)`. The cell must be empty.
    pub fn with_tile(&self, row: usize, col: usize, value: Tile) -> Result<GridState, GridError> {
        let mut next = self.clone();
        next.clear_flags();
        next.place_tile(row, col, value)?;
        Ok(next)
    }

    /// Insert a random 2 (90%) or 4 (10%) tile into a uniformly chosen empty cell.
    ///
    /// Returns the coordinates of the new tile.
    ///
    /// ```
    /// use gridbot::engine::GridState;
    /// use rand::{SeedableRng, rngs::StdRng};
    /// let mut rng = StdRng::seed_from_u64(123);
    /// let mut g = GridState::new(4).unwrap();
    /// g.spawn_random_tile(&mut rng).unwrap();
    /// g.spawn_random_tile(&mut rng).unwrap();
    /// assert_eq!(g.count_empty(), 14);
    /// ```
    pub fn spawn_random_tile<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(usize, usize), GridError> {
        let empties = self.count_empty();
        if empties == 0 {
            return Err(GridError::SpawnOnOccupiedCell);
        }
        let index = rng.gen_range(0..empties);
        let (row, col) = self.empty_cells().nth(index).ok_or(GridError::SpawnOnOccupiedCell)?;
        let value = generate_random_tile(rng);
        self.place_tile(row, col, value)?;
        Ok((row, col))
    }

    /// Every board a single spawn can produce, with its probability.
    ///
    /// Exactly one tile appears, in a uniformly chosen empty cell, valued per
    /// [`SPAWN_WEIGHTS`]. Probabilities sum to 1 when any cell is empty.
    pub fn spawn_outcomes(&self) -> impl Iterator<Item = (GridState, f64)> + '_ {
        let empties = self.count_empty() as f64;
        self.empty_cells().flat_map(move |(row, col)| {
            SPAWN_WEIGHTS
                .into_iter()
                .map(move |(value, weight)| (self.spawned(row, col, value), weight / empties))
        })
    }

    /// Copy with `value` written at `(row, col)`, skipping validation.
    ///
    /// Callers guarantee the coordinates come from `empty_cells`.
    #[inline]
    pub(crate) fn spawned(&self, row: usize, col: usize, value: Tile) -> GridState {
        let mut next = self.clone();
        next.clear_flags();
        next.cells[row * self.size + col] = value;
        next
    }

    fn index(&self, row: usize, col: usize) -> Result<usize, GridError> {
        if row < self.size && col < self.size {
            Ok(row * self.size + col)
        } else {
            Err(GridError::OutOfBounds { row, col, size: self.size })
        }
    }
}

impl PartialEq for GridState {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && self.score == other.score && self.cells == other.cells
    }
}

impl Eq for GridState {}

impl fmt::Debug for GridState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridState")
            .field("size", &self.size)
            .field("score", &self.score)
            .field("rows", &self.rows().collect::<Vec<_>>())
            .finish()
    }
}

impl fmt::Display for GridState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = "-".repeat(self.size * 8 - 1);
        for (i, row) in self.rows().enumerate() {
            if i > 0 {
                writeln!(f, "{}", separator)?;
            }
            let line: Vec<String> = row.iter().map(|&v| format_val(v)).collect();
            writeln!(f, "{}", line.join("|"))?;
        }
        Ok(())
    }
}

/// Number of cells on a `size`x`size` board, or an error outside `2..=MAX_SIZE`.
fn cell_count(size: usize) -> Result<usize, GridError> {
    if !(2..=MAX_SIZE).contains(&size) {
        return Err(GridError::InvalidBoardSize { size });
    }
    size.checked_mul(size).ok_or(GridError::InvalidBoardSize { size })
}

#[inline]
fn is_valid_tile(value: Tile) -> bool { value == 0 || (value >= 2 && value.is_power_of_two()) }

fn generate_random_tile<R: Rng + ?Sized>(rng: &mut R) -> Tile { if rng.gen_range(0..10) < 9 { 2 } else { 4 } }

fn format_val(val: Tile) -> String {
    match val {
        0 => " ".repeat(7),
        x => format!("{:^7}", x),
    }
}
