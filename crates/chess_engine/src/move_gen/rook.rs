//! Rook move generation
//!
//! Rooks slide along ranks and files until blocked.

use super::sliding::{generate_table_moves, StepTable};
use crate::board::Board;
use crate::constants::ROOK_DIRS;
use crate::types::*;

const ROOK_TABLE: StepTable = StepTable {
    offsets: &ROOK_DIRS,
    slides: true,
};

/// Generate rook moves from a given square
pub fn generate_rook_moves(board: &Board, from: Position, color: Color, moves: &mut Vec<Move>) {
    generate_table_moves(board, from, color, ROOK_TABLE, moves);
}
