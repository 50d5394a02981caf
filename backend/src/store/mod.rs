//! Persistence collaborator
//!
//! The session layer only talks to storage through [`DataAccess`]. Accounts, tokens and
//! game records are created elsewhere; the seeding helpers on the concrete stores exist
//! for tests and local setups.

mod memory;
mod sql;

pub use memory::MemoryDataAccess;
pub use sql::SqlDataAccess;

use async_trait::async_trait;
use chess_engine::{Color, Game};
use serde::{Deserialize, Serialize};
use shared::GameId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("corrupt record: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthData {
    #[serde(rename = "authToken")]
    pub auth_token: String,
    pub username: String,
}

/// A persisted game: identity, seats and engine state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    #[serde(rename = "gameID")]
    pub game_id: GameId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub white_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub black_username: Option<String>,
    pub game_name: String,
    pub game: Game,
}

impl GameSession {
    pub fn new(game_id: GameId, game_name: impl Into<String>) -> Self {
        Self {
            game_id,
            white_username: None,
            black_username: None,
            game_name: game_name.into(),
            game: Game::new(),
        }
    }

    /// Username holding the seat of `color`
    pub fn seat(&self, color: Color) -> Option<&str> {
        match color {
            Color::White => self.white_username.as_deref(),
            Color::Black => self.black_username.as_deref(),
        }
    }

    pub fn set_seat(&mut self, color: Color, username: Option<String>) {
        match color {
            Color::White => self.white_username = username,
            Color::Black => self.black_username = username,
        }
    }

    /// "alice (white)" when seated, otherwise just the colour
    pub fn player_label(&self, color: Color) -> String {
        match self.seat(color) {
            Some(username) => format!("{username} ({color})"),
            None => color.to_string(),
        }
    }
}

/// Storage operations the session layer depends on
#[async_trait]
pub trait DataAccess: Send + Sync {
    async fn get_game(&self, game_id: GameId) -> StoreResult<GameSession>;

    /// Overwrite an existing game record
    async fn update_game(&self, session: &GameSession) -> StoreResult<()>;

    async fn game_id_exists(&self, game_id: GameId) -> StoreResult<bool>;

    async fn get_user(&self, username: &str) -> StoreResult<User>;

    async fn get_auth_data_from_token(&self, auth_token: &str) -> StoreResult<AuthData>;

    async fn auth_token_exists(&self, auth_token: &str) -> StoreResult<bool>;
}
