use super::{AuthData, DataAccess, GameSession, StoreError, StoreResult, User};
use async_trait::async_trait;
use chess_engine::Game;
use shared::GameId;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::str::FromStr;
use uuid::Uuid;

const SCHEMA: [&str; 3] = [
    "CREATE TABLE IF NOT EXISTS users (
        username TEXT PRIMARY KEY,
        email TEXT NOT NULL
    );",
    "CREATE TABLE IF NOT EXISTS auth (
        auth_token TEXT PRIMARY KEY,
        username TEXT NOT NULL REFERENCES users(username)
    );",
    "CREATE TABLE IF NOT EXISTS games (
        game_id INTEGER PRIMARY KEY AUTOINCREMENT,
        white_username TEXT,
        black_username TEXT,
        game_name TEXT NOT NULL,
        game TEXT NOT NULL
    );",
];

/// SQLite-backed store. Game state is kept as JSON text in `games.game`.
#[derive(Debug, Clone)]
pub struct SqlDataAccess {
    pool: SqlitePool,
}

impl SqlDataAccess {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the database at `url`
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        Ok(Self::new(pool))
    }

    pub async fn init_schema(&self) -> StoreResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub async fn create_user(&self, user: &User) -> StoreResult<()> {
        let result = sqlx::query("INSERT INTO users (username, email) VALUES ($1, $2)")
            .bind(&user.username)
            .bind(&user.email)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if e.to_string().contains("UNIQUE constraint failed") => Err(
                StoreError::AlreadyExists(format!("user {}", user.username)),
            ),
            Err(e) => Err(e.into()),
        }
    }

    /// Issue a fresh token for an existing user
    pub async fn add_auth(&self, username: &str) -> StoreResult<AuthData> {
        self.get_user(username).await?;

        let auth = AuthData {
            auth_token: Uuid::new_v4().to_string(),
            username: username.to_string(),
        };
        sqlx::query("INSERT INTO auth (auth_token, username) VALUES ($1, $2)")
            .bind(&auth.auth_token)
            .bind(&auth.username)
            .execute(&self.pool)
            .await?;
        Ok(auth)
    }

    /// Create a game in the opening position and return its id
    pub async fn create_game(&self, game_name: &str) -> StoreResult<GameId> {
        let game = serde_json::to_string(&Game::new())?;
        let result = sqlx::query("INSERT INTO games (game_name, game) VALUES ($1, $2)")
            .bind(game_name)
            .bind(game)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }
}

fn session_from_row(row: &SqliteRow) -> StoreResult<GameSession> {
    let game: String = row.try_get("game")?;
    Ok(GameSession {
        game_id: row.try_get("game_id")?,
        white_username: row.try_get("white_username")?,
        black_username: row.try_get("black_username")?,
        game_name: row.try_get("game_name")?,
        game: serde_json::from_str(&game)?,
    })
}

#[async_trait]
impl DataAccess for SqlDataAccess {
    async fn get_game(&self, game_id: GameId) -> StoreResult<GameSession> {
        let row = sqlx::query(
            "SELECT game_id, white_username, black_username, game_name, game
             FROM games WHERE game_id = $1",
        )
        .bind(game_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => session_from_row(&row),
            None => Err(StoreError::NotFound(format!("game {game_id}"))),
        }
    }

    async fn update_game(&self, session: &GameSession) -> StoreResult<()> {
        let game = serde_json::to_string(&session.game)?;
        let result = sqlx::query(
            "UPDATE games
             SET white_username = $1, black_username = $2, game_name = $3, game = $4
             WHERE game_id = $5",
        )
        .bind(session.white_username.as_deref())
        .bind(session.black_username.as_deref())
        .bind(&session.game_name)
        .bind(game)
        .bind(session.game_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("game {}", session.game_id)));
        }
        Ok(())
    }

    async fn game_id_exists(&self, game_id: GameId) -> StoreResult<bool> {
        let row = sqlx::query("SELECT 1 FROM games WHERE game_id = $1")
            .bind(game_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn get_user(&self, username: &str) -> StoreResult<User> {
        let row = sqlx::query("SELECT username, email FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("user {username}")))?;

        Ok(User {
            username: row.try_get("username")?,
            email: row.try_get("email")?,
        })
    }

    async fn get_auth_data_from_token(&self, auth_token: &str) -> StoreResult<AuthData> {
        let row = sqlx::query("SELECT auth_token, username FROM auth WHERE auth_token = $1")
            .bind(auth_token)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound("auth token".to_string()))?;

        Ok(AuthData {
            auth_token: row.try_get("auth_token")?,
            username: row.try_get("username")?,
        })
    }

    async fn auth_token_exists(&self, auth_token: &str) -> StoreResult<bool> {
        let row = sqlx::query("SELECT 1 FROM auth WHERE auth_token = $1")
            .bind(auth_token)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }
}
