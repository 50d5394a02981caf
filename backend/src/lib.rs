//! Live chess session server
//!
//! Players and observers connect over a websocket, join a game and exchange
//! [`shared::UserGameCommand`]s / [`shared::ServerMessage`]s. Moves are validated by
//! [`chess_engine`], serialised per game, persisted through a [`store::DataAccess`]
//! implementation and fanned out to every connection watching the game.

pub mod api;
pub mod config;
pub mod error;
pub mod game_lock;
pub mod registry;
pub mod session;
pub mod store;
