//! Board storage and helper functions
//!
//! Provides the fundamental board operations used throughout the engine:
//! - Piece queries by position
//! - Placing, removing and moving pieces
//! - King lookup for check detection
//!
//! The board is a plain 8x8 value. `Clone` is a full deep copy, which is what the rules
//! engine uses to simulate a move without touching the authoritative board.

use crate::constants::{BACK_RANK, BOARD_SIZE, MAX_COORD, MIN_COORD};
use crate::error::{ChessEngineError, ChessEngineResult};
use crate::types::*;
use serde::{Deserialize, Serialize};

const SIZE: usize = BOARD_SIZE as usize;

/// An 8x8 grid of optional pieces, serialised as eight rows of eight squares (row 1 first)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    squares: [[Option<Piece>; SIZE]; SIZE],
}

#[inline]
fn index(pos: Position) -> (usize, usize) {
    (usize::from(pos.row() - 1), usize::from(pos.col() - 1))
}

impl Board {
    /// A board with no pieces
    pub fn empty() -> Self {
        Board {
            squares: [[None; SIZE]; SIZE],
        }
    }

    /// The standard opening position
    pub fn standard() -> Self {
        let mut board = Board::empty();
        board.reset();
        board
    }

    /// Clear the board and set up the standard opening position
    pub fn reset(&mut self) {
        *self = Board::empty();
        for color in [Color::White, Color::Black] {
            for (col, kind) in (MIN_COORD..=MAX_COORD).zip(BACK_RANK) {
                if let Some(pos) = Position::new(color.back_row(), col) {
                    self.add_piece(pos, Piece::new(color, kind));
                }
                if let Some(pos) = Position::new(color.pawn_start_row(), col) {
                    self.add_piece(pos, Piece::new(color, PieceType::Pawn));
                }
            }
        }
    }

    /// Get piece at position
    #[inline]
    pub fn piece_at(&self, pos: Position) -> Option<Piece> {
        let (row, col) = index(pos);
        self.squares[row][col]
    }

    /// Check if square is empty
    #[inline]
    pub fn is_empty(&self, pos: Position) -> bool {
        self.piece_at(pos).is_none()
    }

    /// Place a piece, replacing whatever stood there
    pub fn add_piece(&mut self, pos: Position, piece: Piece) {
        let (row, col) = index(pos);
        self.squares[row][col] = Some(piece);
    }

    /// Take the piece off a square
    pub fn remove_piece(&mut self, pos: Position) -> Option<Piece> {
        let (row, col) = index(pos);
        self.squares[row][col].take()
    }

    /// All pieces of one color, scanned row by row from a1
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = (Position, Piece)> + '_ {
        Position::all().filter_map(move |pos| {
            self.piece_at(pos)
                .filter(|piece| piece.color == color)
                .map(|piece| (pos, piece))
        })
    }

    /// Locate the king of `color` by linear scan
    ///
    /// A board without that king cannot come from legal play, so this fails with
    /// `InvalidBoardState` instead of guessing.
    pub fn king_position(&self, color: Color) -> ChessEngineResult<Position> {
        self.pieces(color)
            .find(|(_, piece)| piece.kind == PieceType::King)
            .map(|(pos, _)| pos)
            .ok_or_else(|| ChessEngineError::InvalidBoardState {
                message: format!("no {} king on the board", color),
            })
    }

    /// Move a piece without any legality check
    ///
    /// Removes the piece from `start` and places it (promoted if the move says so) on
    /// `end`, overwriting any captured piece. A move from an empty square is a no-op.
    pub fn apply(&mut self, mv: &Move) {
        if let Some(piece) = self.remove_piece(mv.start) {
            let piece = match mv.promotion {
                Some(kind) => piece.promoted(kind),
                None => piece,
            };
            self.add_piece(mv.end, piece);
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::standard()
    }
}
