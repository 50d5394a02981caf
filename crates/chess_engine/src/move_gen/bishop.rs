//! Bishop move generation
//!
//! Bishops slide diagonally until blocked.

use super::sliding::{generate_table_moves, StepTable};
use crate::board::Board;
use crate::constants::BISHOP_DIRS;
use crate::types::*;

const BISHOP_TABLE: StepTable = StepTable {
    offsets: &BISHOP_DIRS,
    slides: true,
};

/// Generate bishop moves from a given square
pub fn generate_bishop_moves(board: &Board, from: Position, color: Color, moves: &mut Vec<Move>) {
    generate_table_moves(board, from, color, BISHOP_TABLE, moves);
}
