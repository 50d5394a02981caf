//! Queen move generation
//!
//! Queens combine the rook and bishop directions in a single sliding table.

use super::sliding::{generate_table_moves, StepTable};
use crate::board::Board;
use crate::constants::QUEEN_DIRS;
use crate::types::*;

const QUEEN_TABLE: StepTable = StepTable {
    offsets: &QUEEN_DIRS,
    slides: true,
};

/// Generate queen moves from a given square
pub fn generate_queen_moves(board: &Board, from: Position, color: Color, moves: &mut Vec<Move>) {
    generate_table_moves(board, from, color, QUEEN_TABLE, moves);
}
