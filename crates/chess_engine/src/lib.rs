//! # Chess Engine - Rules Core for Server-Validated Play
//!
//! The engine owns everything needed to decide whether a move is allowed and what the
//! board looks like afterwards. It performs no I/O and holds no shared state, so a game
//! server can run it under whatever locking discipline it likes.
//!
//! ## Module Organization
//!
//! - `types` - Colors, pieces, positions, moves and the `Game` record
//! - `constants` - Step tables and board geometry
//! - `board` - The 8x8 grid and its accessors
//! - `move_gen` - Pseudo-legal move generation, one strategy per piece type
//! - `api` - The rules engine: legality, check, checkmate, stalemate, move application
//! - `error` - Engine error types
//!
//! ## Example
//!
//! ```rust
//! use chess_engine::{Game, Move, Position};
//!
//! let mut game = Game::new();
//! let e2 = Position::new(2, 5).unwrap();
//! let e4 = Position::new(4, 5).unwrap();
//! game.make_move(&Move::new(e2, e4)).unwrap();
//! assert!(game.board().piece_at(e2).is_none());
//! ```

pub mod api;
pub mod board;
pub mod constants;
pub mod error;
pub mod move_gen;
pub mod types;

pub use board::Board;
pub use error::{ChessEngineError, ChessEngineResult};
pub use types::{Color, Game, GameStatus, Move, Piece, PieceType, Position};
