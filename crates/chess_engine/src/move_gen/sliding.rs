//! Step-table walker shared by kings, knights, rooks, bishops and queens
//!
//! ## Algorithm
//!
//! For every offset in the table, step from the origin:
//! 1. Off-board targets end the direction
//! 2. Empty squares are valid moves; sliding pieces keep going
//! 3. An opponent piece is a valid capture and ends the direction
//! 4. An own piece ends the direction without a move

use crate::board::Board;
use crate::constants::Offset;
use crate::types::*;

/// Declarative movement description for a non-pawn piece
#[derive(Debug, Clone, Copy)]
pub struct StepTable {
    pub offsets: &'static [Offset],
    /// Repeat each offset until blocked (rook, bishop, queen)
    pub slides: bool,
}

/// Append the moves described by `table` for a piece of `color` on `from`
pub fn generate_table_moves(
    board: &Board,
    from: Position,
    color: Color,
    table: StepTable,
    moves: &mut Vec<Move>,
) {
    for &(d_row, d_col) in table.offsets {
        let mut current = from;
        while let Some(target) = current.offset(d_row, d_col) {
            match board.piece_at(target) {
                None => moves.push(Move::new(from, target)),
                Some(piece) if piece.color != color => {
                    moves.push(Move::new(from, target));
                    break;
                }
                Some(_) => break,
            }

            if !table.slides {
                break;
            }
            current = target;
        }
    }
}
