//! Rules engine for a single game
//!
//! All operations are methods on [`Game`](crate::types::Game), split by concern.
//!
//! ## Module Organization
//!
//! - `game` - Game lifecycle (new, from_board, reset, terminal flag)
//! - `moves` - Legal move filtering and move application (valid_moves, make_move)
//! - `state` - Check, checkmate and stalemate predicates
//!
//! Legality is strictly local: a move is legal when the mover's own king is not in
//! check after simulating it on a cloned board. Checkmate and stalemate are aggregate
//! predicates over the legal moves of every piece of a color, never the reverse.

mod game;
mod moves;
mod state;
