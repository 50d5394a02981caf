//! # Chess Engine Core Types
//!
//! ## Overview
//!
//! Value types shared by the board, the move generator and the rules engine. Every type
//! here is small, `Copy` where possible, and serialisable, because the same values travel
//! over the wire inside `LOAD_GAME` and `MAKE_MOVE` payloads.
//!
//! ## Coordinates
//!
//! `Position` is 1-based: row 1 is White's back rank, row 8 is Black's, column 1 is the
//! a-file. A `Position` can only be built on-board, so code holding one never re-checks
//! bounds. Deserialisation goes through the same check, which means a client sending
//! `{"row": 9, "col": 1}` is rejected at decode time.
//!
//! ## The `Game` Record
//!
//! `Game` is the whole authoritative engine state: board, side to move, and whether the
//! game has reached a terminal state. Its behaviour lives in `api`.

use crate::board::Board;
use crate::constants::{MAX_COORD, MIN_COORD};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Side of a piece or of the player to move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// The other side
    #[inline]
    pub fn opponent(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Row delta of a single pawn push
    #[inline]
    pub fn pawn_direction(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// Row pawns start on (double-step allowed from here)
    #[inline]
    pub fn pawn_start_row(self) -> u8 {
        match self {
            Color::White => 2,
            Color::Black => 7,
        }
    }

    /// Farthest rank, where pawns promote
    #[inline]
    pub fn promotion_row(self) -> u8 {
        match self {
            Color::White => MAX_COORD,
            Color::Black => MIN_COORD,
        }
    }

    /// Row holding this side's pieces in the opening position
    #[inline]
    pub fn back_row(self) -> u8 {
        self.opponent().promotion_row()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PieceType {
    King,
    Queen,
    Bishop,
    Knight,
    Rook,
    Pawn,
}

impl PieceType {
    /// Whether a pawn may promote to this type
    pub fn is_promotion_target(self) -> bool {
        matches!(
            self,
            PieceType::Queen | PieceType::Bishop | PieceType::Knight | PieceType::Rook
        )
    }

    /// Upper-case letter used in move notation
    pub fn symbol(self) -> char {
        match self {
            PieceType::King => 'K',
            PieceType::Queen => 'Q',
            PieceType::Bishop => 'B',
            PieceType::Knight => 'N',
            PieceType::Rook => 'R',
            PieceType::Pawn => 'P',
        }
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PieceType::King => "king",
            PieceType::Queen => "queen",
            PieceType::Bishop => "bishop",
            PieceType::Knight => "knight",
            PieceType::Rook => "rook",
            PieceType::Pawn => "pawn",
        };
        f.write_str(name)
    }
}

/// A piece on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub color: Color,
    #[serde(rename = "type")]
    pub kind: PieceType,
}

impl Piece {
    pub const fn new(color: Color, kind: PieceType) -> Self {
        Piece { color, kind }
    }

    /// Same color, new type. Used for pawn promotion.
    pub fn promoted(self, kind: PieceType) -> Self {
        Piece { kind, ..self }
    }

    /// Letter for this piece, upper-case for White and lower-case for Black
    pub fn symbol(self) -> char {
        match self.color {
            Color::White => self.kind.symbol(),
            Color::Black => self.kind.symbol().to_ascii_lowercase(),
        }
    }
}

/// Unchecked wire form of a position, validated into [`Position`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RawPosition {
    pub row: u8,
    pub col: u8,
}

/// A square on the board, row and column both in `1..=8`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawPosition", into = "RawPosition")]
pub struct Position {
    row: u8,
    col: u8,
}

impl Position {
    /// Build a position, or `None` if it lies off the board
    pub fn new(row: u8, col: u8) -> Option<Self> {
        let on_board = |v: u8| (MIN_COORD..=MAX_COORD).contains(&v);
        (on_board(row) && on_board(col)).then_some(Position { row, col })
    }

    #[inline]
    pub fn row(self) -> u8 {
        self.row
    }

    #[inline]
    pub fn col(self) -> u8 {
        self.col
    }

    /// Step by `(row delta, col delta)`; off-board targets yield `None`
    pub fn offset(self, d_row: i8, d_col: i8) -> Option<Self> {
        let row = i16::from(self.row) + i16::from(d_row);
        let col = i16::from(self.col) + i16::from(d_col);
        let row = u8::try_from(row).ok()?;
        let col = u8::try_from(col).ok()?;
        Position::new(row, col)
    }

    /// Every square, row-major from a1 to h8
    pub fn all() -> impl Iterator<Item = Position> {
        (MIN_COORD..=MAX_COORD)
            .flat_map(|row| (MIN_COORD..=MAX_COORD).map(move |col| Position { row, col }))
    }
}

impl TryFrom<RawPosition> for Position {
    type Error = String;

    fn try_from(raw: RawPosition) -> Result<Self, Self::Error> {
        Position::new(raw.row, raw.col)
            .ok_or_else(|| format!("position ({}, {}) is off the board", raw.row, raw.col))
    }
}

impl From<Position> for RawPosition {
    fn from(pos: Position) -> Self {
        RawPosition {
            row: pos.row,
            col: pos.col,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = char::from(b'a' + self.col - 1);
        write!(f, "{}{}", file, self.row)
    }
}

/// A move request: start square, end square and the promotion piece if a pawn queens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub start: Position,
    pub end: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<PieceType>,
}

impl Move {
    pub fn new(start: Position, end: Position) -> Self {
        Move {
            start,
            end,
            promotion: None,
        }
    }

    pub fn with_promotion(start: Position, end: Position, promotion: PieceType) -> Self {
        Move {
            start,
            end,
            promotion: Some(promotion),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.start, self.end)?;
        if let Some(kind) = self.promotion {
            write!(f, "={}", kind.symbol())?;
        }
        Ok(())
    }
}

/// Situation of the side to move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GameStatus {
    Playing,
    Check,
    Checkmate,
    Stalemate,
}

impl GameStatus {
    /// Checkmate and stalemate end the game
    pub fn is_terminal(self) -> bool {
        matches!(self, GameStatus::Checkmate | GameStatus::Stalemate)
    }
}

/// Central game state: the authoritative board, the side to move and the terminal flag
///
/// Mutated only through [`Game::make_move`] and [`Game::set_game_over`]; see `api`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub(crate) board: Board,
    pub(crate) turn: Color,
    #[serde(default)]
    pub(crate) game_over: bool,
}
