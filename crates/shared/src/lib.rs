//! Wire protocol for live chess sessions
//!
//! Clients send [`UserGameCommand`]s and receive [`ServerMessage`]s, both as JSON text.

pub mod protocol;

pub use protocol::{GameId, JoinRole, ServerMessage, UserGameCommand};
