//! King move generation
//!
//! Kings move one square in any direction. Squares attacked by the opponent are not
//! filtered here; the rules engine rejects them when it simulates the move.
//!
//! Castling is not generated.

use super::sliding::{generate_table_moves, StepTable};
use crate::board::Board;
use crate::constants::KING_OFFSETS;
use crate::types::*;

const KING_TABLE: StepTable = StepTable {
    offsets: &KING_OFFSETS,
    slides: false,
};

/// Generate king moves from a given square
pub fn generate_king_moves(board: &Board, from: Position, color: Color, moves: &mut Vec<Move>) {
    generate_table_moves(board, from, color, KING_TABLE, moves);
}
