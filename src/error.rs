//! Error type shared by the whole engine.

use thiserror::Error;

use crate::board::{Move, Pos, Side};
use crate::constants::{MAX_DEPTH, MIN_DEPTH};

/// Contract violations reported by the engine.
///
/// None of these are recoverable inside the search: they signal that the
/// caller handed over a corrupt board, a bad coordinate, or an illegal move.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("coordinate ({row}, {col}) is outside the 3x3 grid")]
    CoordinateOutOfRange { row: usize, col: usize },

    #[error("search depth {0} is outside {min}..={max}", min = MIN_DEPTH, max = MAX_DEPTH)]
    InvalidDepth(u32),

    #[error("illegal move {0}: cell is not empty")]
    Occupied(Move),

    #[error("illegal move {0}: subboard is already decided")]
    SubboardDecided(Move),

    #[error("illegal move {0}: the game is already over")]
    GameOver(Move),

    #[error("illegal move {mv}: play must continue in subboard {required}")]
    WrongSubboard { mv: Move, required: Pos },

    #[error("it is {expected}'s turn, not {got}'s")]
    WrongSide { expected: Side, got: Side },

    #[error("cannot parse board: {0}")]
    BadBoard(String),

    #[error("corrupt board: both X and O complete a line in {0}")]
    CorruptBoard(String),

    #[error("cannot parse move '{0}'")]
    BadMove(String),

    #[error("cannot parse side '{0}'")]
    BadSide(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EngineError>;
