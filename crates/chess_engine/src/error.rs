//! Error types for chess engine
//!
//! Every rejected move maps to exactly one variant so callers can pattern-match the
//! reason instead of parsing strings. `InvalidBoardState` is the only variant that
//! signals a corrupted game rather than bad input.

use crate::types::{Color, Position};
use thiserror::Error;

/// Errors that can occur in the chess engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChessEngineError {
    /// No piece at source square
    #[error("no piece at {square}")]
    NoPieceAtSquare { square: Position },

    /// Piece does not belong to the side to move
    #[error("it is {turn}'s turn, the piece at {square} belongs to {color}")]
    WrongTurn {
        square: Position,
        color: Color,
        turn: Color,
    },

    /// Move is not among the legal moves of the piece
    #[error("illegal move from {from} to {to}")]
    IllegalMove { from: Position, to: Position },

    /// Pawn reached the last rank without naming a promotion piece
    #[error("move from {from} to {to} needs a promotion piece")]
    MissingPromotion { from: Position, to: Position },

    /// Promotion requested to a king/pawn, or on a move that cannot promote
    #[error("invalid promotion on move from {from} to {to}")]
    InvalidPromotion { from: Position, to: Position },

    /// The game has ended; no further moves are accepted
    #[error("game is already over")]
    GameOver,

    /// Board is missing a king or is otherwise corrupt
    #[error("invalid board state: {message}")]
    InvalidBoardState { message: String },
}

impl ChessEngineError {
    /// True for errors that indicate a corrupted game record rather than bad input
    pub fn is_internal(&self) -> bool {
        matches!(self, ChessEngineError::InvalidBoardState { .. })
    }
}

/// Result type alias for chess engine operations
pub type ChessEngineResult<T> = Result<T, ChessEngineError>;
