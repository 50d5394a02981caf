//! Pawn move generation
//!
//! Handles pawn-specific move generation including:
//! - Single and double forward pushes
//! - Diagonal captures
//! - Promotion on the farthest rank
//!
//! ## Pawn Movement Rules
//!
//! - **Forward push**: one square toward the opponent, only onto an empty square
//! - **Double push**: from the starting rank, when both squares ahead are empty
//! - **Captures**: one square diagonally forward, only onto an opponent piece
//! - **Promotion**: a move landing on the farthest rank is emitted once per promotion
//!   piece instead of once
//!
//! En passant is not generated.

use crate::board::Board;
use crate::constants::{PAWN_CAPTURE_COLS, PROMOTION_PIECES};
use crate::types::*;

/// Generate pawn moves from a given square
pub fn generate_pawn_moves(board: &Board, from: Position, color: Color, moves: &mut Vec<Move>) {
    let forward = color.pawn_direction();

    if let Some(one_step) = from.offset(forward, 0) {
        if board.is_empty(one_step) {
            push_pawn_move(from, one_step, color, moves);

            if from.row() == color.pawn_start_row() {
                if let Some(two_step) = one_step.offset(forward, 0) {
                    if board.is_empty(two_step) {
                        push_pawn_move(from, two_step, color, moves);
                    }
                }
            }
        }
    }

    for d_col in PAWN_CAPTURE_COLS {
        let Some(target) = from.offset(forward, d_col) else {
            continue;
        };
        if matches!(board.piece_at(target), Some(piece) if piece.color != color) {
            push_pawn_move(from, target, color, moves);
        }
    }
}

fn push_pawn_move(from: Position, to: Position, color: Color, moves: &mut Vec<Move>) {
    if to.row() == color.promotion_row() {
        moves.extend(
            PROMOTION_PIECES
                .iter()
                .map(|&kind| Move::with_promotion(from, to, kind)),
        );
    } else {
        moves.push(Move::new(from, to));
    }
}
