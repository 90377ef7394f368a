/// Errors raised by board construction, tile placement and the bot.
///
/// Every check happens before any mutation, so an `Err` never leaves a
/// `GridState` half-updated.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("invalid board size {size}: a side must be between 2 and {}", crate::engine::MAX_SIZE)]
    InvalidBoardSize { size: usize },
    #[error("no legal moves: the board is terminal")]
    NoLegalMoves,
    #[error("cannot spawn a tile: target cell is occupied or no empty cell exists")]
    SpawnOnOccupiedCell,
    #[error("invalid tile value {value}: must be 0 or a power of two >= 2")]
    InvalidTile { value: u64 },
    #[error("board shape mismatch: expected {expected} cells, found {found}")]
    ShapeMismatch { expected: usize, found: usize },
    #[error("cell ({row}, {col}) is outside a {size}x{size} board")]
    OutOfBounds { row: usize, col: usize, size: usize },
}
