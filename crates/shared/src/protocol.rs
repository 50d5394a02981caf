//! Commands (client → server) and messages (server → client)
//!
//! Both directions are JSON objects with a discriminator field: `commandType` for
//! commands, `serverMessageType` for server messages. Field names follow the camelCase
//! wire format (`authToken`, `gameID`, `errorMessage`).

use chess_engine::{Color, Game, Move};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a persisted game
pub type GameId = i64;

/// How a connection joins a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JoinRole {
    White,
    Black,
    Observer,
}

impl JoinRole {
    /// Seat claimed by this role, if any
    pub fn seat(self) -> Option<Color> {
        match self {
            JoinRole::White => Some(Color::White),
            JoinRole::Black => Some(Color::Black),
            JoinRole::Observer => None,
        }
    }
}

impl fmt::Display for JoinRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinRole::White => f.write_str("white"),
            JoinRole::Black => f.write_str("black"),
            JoinRole::Observer => f.write_str("an observer"),
        }
    }
}

/// Client → Server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "commandType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserGameCommand {
    /// Join a game as a player or observer. A missing role joins as observer.
    Connect {
        #[serde(rename = "authToken")]
        auth_token: String,
        #[serde(rename = "gameID")]
        game_id: GameId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        role: Option<JoinRole>,
    },
    MakeMove {
        #[serde(rename = "authToken")]
        auth_token: String,
        #[serde(rename = "gameID")]
        game_id: GameId,
        #[serde(rename = "move")]
        chess_move: Move,
    },
    Leave {
        #[serde(rename = "authToken")]
        auth_token: String,
        #[serde(rename = "gameID")]
        game_id: GameId,
    },
    Resign {
        #[serde(rename = "authToken")]
        auth_token: String,
        #[serde(rename = "gameID")]
        game_id: GameId,
    },
}

impl UserGameCommand {
    pub fn auth_token(&self) -> &str {
        match self {
            UserGameCommand::Connect { auth_token, .. }
            | UserGameCommand::MakeMove { auth_token, .. }
            | UserGameCommand::Leave { auth_token, .. }
            | UserGameCommand::Resign { auth_token, .. } => auth_token,
        }
    }

    pub fn game_id(&self) -> GameId {
        match self {
            UserGameCommand::Connect { game_id, .. }
            | UserGameCommand::MakeMove { game_id, .. }
            | UserGameCommand::Leave { game_id, .. }
            | UserGameCommand::Resign { game_id, .. } => *game_id,
        }
    }

    /// Wire name of the command, for logs
    pub fn command_type(&self) -> &'static str {
        match self {
            UserGameCommand::Connect { .. } => "CONNECT",
            UserGameCommand::MakeMove { .. } => "MAKE_MOVE",
            UserGameCommand::Leave { .. } => "LEAVE",
            UserGameCommand::Resign { .. } => "RESIGN",
        }
    }
}

/// Server → Client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "serverMessageType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    /// Full game state: board, side to move, terminal flag
    LoadGame { game: Game },
    Notification { message: String },
    Error {
        #[serde(rename = "errorMessage")]
        error_message: String,
    },
}

impl ServerMessage {
    pub fn load_game(game: Game) -> Self {
        ServerMessage::LoadGame { game }
    }

    pub fn notification(message: impl Into<String>) -> Self {
        ServerMessage::Notification {
            message: message.into(),
        }
    }

    pub fn error(error_message: impl Into<String>) -> Self {
        ServerMessage::Error {
            error_message: error_message.into(),
        }
    }
}
