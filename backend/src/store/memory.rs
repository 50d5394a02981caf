use super::{AuthData, DataAccess, GameSession, StoreError, StoreResult, User};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared::GameId;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<String, User>,
    auth: HashMap<String, AuthData>,
    games: HashMap<GameId, GameSession>,
    last_game_id: GameId,
}

/// Process-local store, used for tests and `DATABASE_URL=memory`
#[derive(Debug, Default)]
pub struct MemoryDataAccess {
    tables: RwLock<Tables>,
}

impl MemoryDataAccess {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_user(&self, user: &User) -> StoreResult<()> {
        let mut tables = self.tables.write();
        if tables.users.contains_key(&user.username) {
            return Err(StoreError::AlreadyExists(format!("user {}", user.username)));
        }
        tables.users.insert(user.username.clone(), user.clone());
        Ok(())
    }

    /// Issue a fresh token for an existing user
    pub fn add_auth(&self, username: &str) -> StoreResult<AuthData> {
        let mut tables = self.tables.write();
        if !tables.users.contains_key(username) {
            return Err(StoreError::NotFound(format!("user {username}")));
        }
        let auth = AuthData {
            auth_token: Uuid::new_v4().to_string(),
            username: username.to_string(),
        };
        tables.auth.insert(auth.auth_token.clone(), auth.clone());
        Ok(auth)
    }

    pub fn revoke_auth(&self, auth_token: &str) {
        self.tables.write().auth.remove(auth_token);
    }

    /// Create a game in the opening position. Ids start at 1.
    pub fn create_game(&self, game_name: &str) -> GameId {
        let mut tables = self.tables.write();
        tables.last_game_id += 1;
        let game_id = tables.last_game_id;
        tables
            .games
            .insert(game_id, GameSession::new(game_id, game_name));
        game_id
    }
}

#[async_trait]
impl DataAccess for MemoryDataAccess {
    async fn get_game(&self, game_id: GameId) -> StoreResult<GameSession> {
        self.tables
            .read()
            .games
            .get(&game_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("game {game_id}")))
    }

    async fn update_game(&self, session: &GameSession) -> StoreResult<()> {
        let mut tables = self.tables.write();
        match tables.games.get_mut(&session.game_id) {
            Some(stored) => {
                *stored = session.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(format!("game {}", session.game_id))),
        }
    }

    async fn game_id_exists(&self, game_id: GameId) -> StoreResult<bool> {
        Ok(self.tables.read().games.contains_key(&game_id))
    }

    async fn get_user(&self, username: &str) -> StoreResult<User> {
        self.tables
            .read()
            .users
            .get(username)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("user {username}")))
    }

    async fn get_auth_data_from_token(&self, auth_token: &str) -> StoreResult<AuthData> {
        self.tables
            .read()
            .auth
            .get(auth_token)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("auth token".to_string()))
    }

    async fn auth_token_exists(&self, auth_token: &str) -> StoreResult<bool> {
        Ok(self.tables.read().auth.contains_key(auth_token))
    }
}
