//! Attack detection and check testing
//!
//! A square is attacked when any piece of the attacking color has a pseudo-legal move
//! ending on it. Because pawn captures are only generated onto occupied squares, this
//! answers "is the piece standing here attacked", which is exactly what check
//! detection needs.

use super::generate_pseudo_legal_moves;
use crate::board::Board;
use crate::error::ChessEngineResult;
use crate::types::*;

/// Check if the piece on `square` can be captured by pieces of `by_color`
pub fn is_square_attacked(board: &Board, square: Position, by_color: Color) -> bool {
    generate_pseudo_legal_moves(board, by_color)
        .iter()
        .any(|mv| mv.end == square)
}

/// Check if the king of a color is in check
///
/// Fails with `InvalidBoardState` when that king is missing.
pub fn is_in_check(board: &Board, color: Color) -> ChessEngineResult<bool> {
    let king = board.king_position(color)?;
    Ok(is_square_attacked(board, king, color.opponent()))
}
