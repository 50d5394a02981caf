//! Knight move generation
//!
//! Knights jump in an L-shape and ignore anything in between.

use super::sliding::{generate_table_moves, StepTable};
use crate::board::Board;
use crate::constants::KNIGHT_OFFSETS;
use crate::types::*;

const KNIGHT_TABLE: StepTable = StepTable {
    offsets: &KNIGHT_OFFSETS,
    slides: false,
};

/// Generate knight moves from a given square
pub fn generate_knight_moves(board: &Board, from: Position, color: Color, moves: &mut Vec<Move>) {
    generate_table_moves(board, from, color, KNIGHT_TABLE, moves);
}
