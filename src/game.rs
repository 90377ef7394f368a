//! Headless game driver: start tiles, move, spawn, win/lose bookkeeping.

use log::trace;
use rand::{rngs::StdRng, SeedableRng};

use crate::bot::Bot;
use crate::engine::{Direction, GridState, Score, WINNING_TILE};
use crate::error::GridError;

const START_TILES: usize = 2;

/// Result of one [`Game::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepResult {
    /// Whether the board changed (and a new tile was spawned).
    pub changed: bool,
    /// Points earned from merges in this move.
    pub score_delta: Score,
    pub won: bool,
    pub over: bool,
}

/// A single game with its own seeded RNG.
///
/// ```
/// use gridbot::game::Game;
/// use gridbot::engine::Direction;
///
/// let mut game = Game::new(4, 42).unwrap();
/// assert_eq!(game.grid().count_empty(), 14);
/// let step = game.step(Direction::Left).unwrap();
/// assert!(step.over == !game.grid().can_move());
/// ```
#[derive(Debug, Clone)]
pub struct Game {
    grid: GridState,
    rng: StdRng,
    moves: u64,
    won: bool,
    over: bool,
    keep_playing: bool,
}

impl Game {
    /// New `size`×`size` game with two random start tiles.
    pub fn new(size: usize, seed: u64) -> Result<Self, GridError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut grid = GridState::new(size)?;
        for _ in 0..START_TILES {
            grid.spawn_random_tile(&mut rng)?;
        }
        Ok(Self::from_parts(grid, rng))
    }

    /// Continue from an existing board.
    pub fn from_grid(grid: GridState, seed: u64) -> Self { Self::from_parts(grid, StdRng::seed_from_u64(seed)) }

    fn from_parts(grid: GridState, rng: StdRng) -> Self {
        let won = grid.has_tile_at_least(WINNING_TILE);
        let over = !grid.can_move();
        Game { grid, rng, moves: 0, won, over, keep_playing: false }
    }

    #[inline]
    pub fn grid(&self) -> &GridState { &self.grid }

    #[inline]
    pub fn score(&self) -> Score { self.grid.score() }

    /// Moves that changed the board.
    #[inline]
    pub fn moves(&self) -> u64 { self.moves }

    #[inline]
    pub fn is_won(&self) -> bool { self.won }

    #[inline]
    pub fn is_over(&self) -> bool { self.over }

    /// Keep going after reaching the winning tile.
    pub fn set_keep_playing(&mut self, keep_playing: bool) { self.keep_playing = keep_playing; }

    #[inline]
    pub fn is_terminated(&self) -> bool { self.over || (self.won && !self.keep_playing) }

    /// Apply `dir`, then spawn a tile if anything moved.
    ///
    /// A terminated game ignores further moves.
    pub fn step(&mut self, dir: Direction) -> Result<StepResult, GridError> {
        if self.is_terminated() {
            return Ok(StepResult { changed: false, score_delta: 0, won: self.won, over: self.over });
        }
        self.grid.clear_flags();
        let outcome = self.grid.apply_move(dir);
        if self.grid.moved() {
            self.moves += 1;
            let (row, col) = self.grid.spawn_random_tile(&mut self.rng)?;
            trace!("move {} {}: +{} spawn at ({}, {})", self.moves, dir, outcome.score_delta, row, col);
        }
        self.won = self.won || self.grid.has_tile_at_least(WINNING_TILE);
        self.over = !self.grid.can_move();
        Ok(StepResult { changed: outcome.changed, score_delta: outcome.score_delta, won: self.won, over: self.over })
    }

    /// Let `bot` play until the game terminates or `max_moves` changing moves were made.
    pub fn play(&mut self, bot: &mut Bot, max_moves: Option<u64>) -> Result<(), GridError> {
        while !self.is_terminated() && max_moves.map_or(true, |limit| self.moves < limit) {
            let dir = bot.get_move(&self.grid)?;
            self.step(dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expectimax::ExpectimaxConfig;

    #[test]
    fn starts_with_two_tiles() {
        let game = Game::new(4, 1).unwrap();
        assert_eq!(game.grid().count_empty(), 14);
        assert!(game.grid().cells().iter().all(|&v| v == 0 || v == 2 || v == 4));
        assert_eq!(game.score(), 0);
        assert!(!game.is_terminated());
    }

    #[test]
    fn rejects_tiny_boards() {
        assert_eq!(Game::new(1, 0).unwrap_err(), GridError::InvalidBoardSize { size: 1 });
        assert_eq!(Game::new(100_000, 0).unwrap_err(), GridError::InvalidBoardSize { size: 100_000 });
    }

    #[test]
    fn spawns_only_after_a_change() {
        let grid = GridState::from_rows(&[&[2, 0, 0], &[0, 0, 0], &[0, 0, 0]]).unwrap();
        let mut game = Game::from_grid(grid, 3);
        let noop = game.step(Direction::Left).unwrap();
        assert!(!noop.changed);
        assert_eq!(game.grid().count_empty(), 8);
        assert_eq!(game.moves(), 0);

        let step = game.step(Direction::Right).unwrap();
        assert!(step.changed);
        assert_eq!(game.grid().count_empty(), 7);
        assert_eq!(game.moves(), 1);
    }

    #[test]
    fn detects_win_and_stops_unless_told_otherwise() {
        let grid = GridState::from_rows(&[&[1024, 1024], &[0, 0]]).unwrap();
        let mut game = Game::from_grid(grid.clone(), 5);
        let step = game.step(Direction::Left).unwrap();
        assert!(step.won);
        assert_eq!(step.score_delta, 2048);
        assert!(game.is_terminated());
        let after = game.step(Direction::Right).unwrap();
        assert!(!after.changed);

        let mut game = Game::from_grid(grid, 5);
        game.set_keep_playing(true);
        game.step(Direction::Left).unwrap();
        assert!(game.is_won());
        assert_eq!(game.is_terminated(), game.is_over());
    }

    #[test]
    fn detects_game_over() {
        let grid = GridState::from_rows(&[&[8, 4], &[16, 0]]).unwrap();
        let mut game = Game::from_grid(grid, 11);
        assert!(!game.is_over());
        // Either spawn into the last gap leaves no merge available.
        let step = game.step(Direction::Right).unwrap();
        assert!(step.changed);
        assert!(step.over);
        assert!(game.is_terminated());
        assert!(!game.grid().can_move());
    }

    #[test]
    fn bot_plays_a_short_game() {
        let mut game = Game::new(3, 9).unwrap();
        let mut bot = Bot::with_config(ExpectimaxConfig { max_depth: 2, ..Default::default() });
        game.play(&mut bot, Some(20)).unwrap();
        assert!(game.moves() > 0);
        assert!(game.moves() <= 20);
        assert!(game.is_terminated() || game.moves() == 20);
    }
}
