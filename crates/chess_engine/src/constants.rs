//! # Board Geometry & Step Tables
//!
//! Movement is described declaratively: each piece type owns a table of `(row, col)`
//! offsets, and a flag elsewhere decides whether the offset is applied once (king,
//! knight) or repeated until something blocks it (rook, bishop, queen).
//!
//! Offsets are expressed from White's point of view with rows increasing toward
//! Black's side of the board, matching the 1-based `Position` layout where White's
//! back rank is row 1.

use crate::types::PieceType;

/// Number of rows and columns on the board
pub const BOARD_SIZE: u8 = 8;

/// Lowest valid row or column index
pub const MIN_COORD: u8 = 1;

/// Highest valid row or column index
pub const MAX_COORD: u8 = BOARD_SIZE;

/// A single `(row delta, column delta)` step
pub type Offset = (i8, i8);

/// Orthogonal directions: north, south, east, west
pub const ROOK_DIRS: [Offset; 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Diagonal directions
pub const BISHOP_DIRS: [Offset; 4] = [(1, 1), (-1, 1), (-1, -1), (1, -1)];

/// Queen combines rook and bishop directions
pub const QUEEN_DIRS: [Offset; 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (-1, 1),
    (-1, -1),
    (1, -1),
];

/// King steps one square in any direction
pub const KING_OFFSETS: [Offset; 8] = QUEEN_DIRS;

/// Knight "L" jumps
pub const KNIGHT_OFFSETS: [Offset; 8] = [
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
];

/// Diagonal capture columns for a pawn, relative to its file
pub const PAWN_CAPTURE_COLS: [i8; 2] = [-1, 1];

/// Pieces a pawn may become on the farthest rank, in generation order
pub const PROMOTION_PIECES: [PieceType; 4] = [
    PieceType::Queen,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

/// Back rank layout from column 1 (a-file) to column 8 (h-file)
pub const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];
