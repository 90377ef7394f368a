//! gridbot: an N×N sliding-merge puzzle engine + Expectimax bot
//!
//! This crate provides:
//! - A value-semantics `GridState` with the four moves built from shared
//!   compress/merge/transpose/reverse primitives (`engine` module)
//! - A depth-limited Expectimax evaluator alternating max and chance layers
//!   (`expectimax` module)
//! - A `Bot` that returns the move with the highest expected value (`bot` module)
//! - A headless `Game` driver with start tiles and win/lose tracking (`game` module)
//!
//! Quick start:
//! ```
//! use gridbot::engine::{Direction, GridState};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! // Deterministic board initialization with a seeded RNG
//! let mut rng = StdRng::seed_from_u64(42);
//! let mut grid = GridState::new(4).unwrap();
//! grid.spawn_random_tile(&mut rng).unwrap();
//! grid.spawn_random_tile(&mut rng).unwrap();
//! let next = grid.shift(Direction::Left);
//! assert!(next.score() >= grid.score());
//! ```
//!
//! Full loop (simplest possible)
//! ```
//! use gridbot::bot::Bot;
//! use gridbot::expectimax::ExpectimaxConfig;
//! use gridbot::game::Game;
//!
//! // 1) Seeded game with two start tiles, shallow search to keep doctests fast
//! let mut game = Game::new(4, 123).unwrap();
//! let mut bot = Bot::with_config(ExpectimaxConfig { max_depth: 2, ..Default::default() });
//! let mut moves = 0u32;
//!
//! // 2) Ask the bot for a move while the board can still move
//! while game.grid().can_move() && moves < 4 {
//!     let dir = bot.get_move(game.grid()).unwrap();
//!     game.step(dir).unwrap();
//!     moves += 1;
//! }
//!
//! // 3) Inspect final state
//! assert!(game.moves() > 0);
//! let _final_score = game.score();
//! ```
//!
pub mod bot;
pub mod engine;
pub mod error;
pub mod expectimax;
pub mod game;

pub use bot::Bot;
pub use engine::{Direction, GridState, MoveOutcome};
pub use error::GridError;
