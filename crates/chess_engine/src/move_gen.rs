//! Pseudo-legal move generation
//!
//! Each piece type maps to one generator function through [`generator_for`]. Kings,
//! knights, rooks, bishops and queens are driven by the declarative step tables in
//! `constants`; pawns have a dedicated generator because their pushes and captures
//! follow different rules.
//!
//! Nothing here knows about check. A pseudo-legal move may leave the mover's own king
//! attacked; filtering those out is the rules engine's job (see `api`).

mod bishop;
mod king;
mod knight;
mod pawn;
mod queen;
mod rook;
mod sliding;

pub mod attack;

pub use attack::{is_in_check, is_square_attacked};
pub use bishop::generate_bishop_moves;
pub use king::generate_king_moves;
pub use knight::generate_knight_moves;
pub use pawn::generate_pawn_moves;
pub use queen::generate_queen_moves;
pub use rook::generate_rook_moves;

use crate::board::Board;
use crate::types::*;

/// A movement strategy: append the pseudo-legal moves of the piece on `from`
pub type MoveGenerator = fn(&Board, Position, Color, &mut Vec<Move>);

/// Strategy table from piece type to generator
pub fn generator_for(kind: PieceType) -> MoveGenerator {
    match kind {
        PieceType::King => generate_king_moves,
        PieceType::Queen => generate_queen_moves,
        PieceType::Bishop => generate_bishop_moves,
        PieceType::Knight => generate_knight_moves,
        PieceType::Rook => generate_rook_moves,
        PieceType::Pawn => generate_pawn_moves,
    }
}

/// Pseudo-legal moves of the piece on `from`; empty if the square is empty
pub fn piece_moves(board: &Board, from: Position) -> Vec<Move> {
    let mut moves = Vec::new();
    if let Some(piece) = board.piece_at(from) {
        generator_for(piece.kind)(board, from, piece.color, &mut moves);
    }
    moves
}

/// Generate all pseudo-legal moves for a color
pub fn generate_pseudo_legal_moves(board: &Board, color: Color) -> Vec<Move> {
    let mut moves = Vec::with_capacity(64);

    for (from, piece) in board.pieces(color) {
        generator_for(piece.kind)(board, from, color, &mut moves);
    }

    moves
}
