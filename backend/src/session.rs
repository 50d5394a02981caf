//! Session protocol handling
//!
//! One [`ClientSession`] per socket tracks whether that connection has joined a game and
//! turns each [`UserGameCommand`] into engine calls, store writes and broadcasts. Every
//! command that reads and then writes a game record runs under that game's lock, so two
//! moves on the same game never interleave. Broadcasts only queue messages and never wait
//! on a peer while the lock is held.

use crate::error::{SessionError, SessionResult};
use crate::game_lock::GameLocks;
use crate::registry::{Connection, ConnectionId, ConnectionRegistry};
use crate::store::{DataAccess, GameSession, StoreError};
use chess_engine::{GameStatus, Move};
use shared::{GameId, JoinRole, ServerMessage, UserGameCommand};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Shared state behind every connection
pub struct SessionHandler {
    store: Arc<dyn DataAccess>,
    registry: ConnectionRegistry,
    locks: GameLocks,
}

impl SessionHandler {
    pub fn new(store: Arc<dyn DataAccess>) -> Self {
        Self {
            store,
            registry: ConnectionRegistry::new(),
            locks: GameLocks::new(),
        }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn locks(&self) -> &GameLocks {
        &self.locks
    }

    /// Start tracking a freshly accepted connection
    pub fn open(self: &Arc<Self>, connection: Connection) -> ClientSession {
        debug!(connection = %connection.id(), "connection opened");
        ClientSession {
            handler: Arc::clone(self),
            connection,
            state: ConnectionState::Unjoined,
        }
    }

    /// Resolve a token to its username
    async fn authenticate(&self, auth_token: &str) -> SessionResult<String> {
        if !self.store.auth_token_exists(auth_token).await? {
            return Err(SessionError::Unauthorized);
        }
        match self.store.get_auth_data_from_token(auth_token).await {
            Ok(auth) => Ok(auth.username),
            Err(StoreError::NotFound(_)) => Err(SessionError::Unauthorized),
            Err(e) => Err(e.into()),
        }
    }

    async fn load_game(&self, game_id: GameId) -> SessionResult<GameSession> {
        if !self.store.game_id_exists(game_id).await? {
            return Err(SessionError::bad_request(format!(
                "game {game_id} does not exist"
            )));
        }
        Ok(self.store.get_game(game_id).await?)
    }

    fn release(&self, game_id: GameId, id: ConnectionId) {
        self.registry.remove(game_id, id);
        if self.registry.connection_count(game_id) == 0 {
            self.locks.release_idle(game_id);
        }
    }
}

/// Lifecycle of one connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Unjoined,
    Joined {
        game_id: GameId,
        username: String,
        role: JoinRole,
    },
    Closed,
}

/// Per-connection protocol state machine
pub struct ClientSession {
    handler: Arc<SessionHandler>,
    connection: Connection,
    state: ConnectionState,
}

impl ClientSession {
    pub fn id(&self) -> ConnectionId {
        self.connection.id()
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    /// Decode and handle one text frame
    pub async fn handle_text(&mut self, text: &str) {
        match serde_json::from_str::<UserGameCommand>(text) {
            Ok(command) => self.handle_command(command).await,
            Err(e) => {
                warn!(connection = %self.id(), error = %e, "malformed command");
                let err = SessionError::bad_request(format!("malformed command: {e}"));
                self.reply(err.to_message());
            }
        }
    }

    /// Handle one command. Failures are answered with an ERROR to this connection only.
    pub async fn handle_command(&mut self, command: UserGameCommand) {
        if self.state == ConnectionState::Closed {
            debug!(connection = %self.id(), "ignoring command on closed connection");
            return;
        }
        self.sync_with_registry();

        let kind = command.command_type();
        let game_id = command.game_id();
        if let Err(err) = self.dispatch(command).await {
            match &err {
                SessionError::Internal(detail) => error!(
                    connection = %self.id(),
                    game_id,
                    command = kind,
                    %detail,
                    "command failed"
                ),
                _ => warn!(
                    connection = %self.id(),
                    game_id,
                    command = kind,
                    error = %err,
                    "command rejected"
                ),
            }
            self.reply(err.to_message());
        }
    }

    /// A broadcast prunes peers whose queue is full or closed. Such a session is no longer
    /// in its game and has to CONNECT again.
    fn sync_with_registry(&mut self) {
        if let ConnectionState::Joined { game_id, username, .. } = &self.state {
            if !self.handler.registry.contains(*game_id, self.id()) {
                warn!(game_id, %username, connection = %self.id(), "dropped from game");
                let game_id = *game_id;
                self.state = ConnectionState::Unjoined;
                if self.handler.registry.connection_count(game_id) == 0 {
                    self.handler.locks.release_idle(game_id);
                }
            }
        }
    }

    /// Unregister from the joined game, if any. Further commands are ignored.
    pub async fn close(&mut self) {
        if let ConnectionState::Joined { game_id, username, .. } = &self.state {
            info!(game_id, %username, connection = %self.id(), "connection closed");
            self.handler.release(*game_id, self.connection.id());
        }
        self.state = ConnectionState::Closed;
    }

    async fn dispatch(&mut self, command: UserGameCommand) -> SessionResult<()> {
        match command {
            UserGameCommand::Connect {
                auth_token,
                game_id,
                role,
            } => {
                let role = role.unwrap_or(JoinRole::Observer);
                self.connect(&auth_token, game_id, role).await
            }
            UserGameCommand::MakeMove {
                auth_token,
                game_id,
                chess_move,
            } => self.make_move(&auth_token, game_id, chess_move).await,
            UserGameCommand::Leave {
                auth_token,
                game_id,
            } => self.leave(&auth_token, game_id).await,
            UserGameCommand::Resign {
                auth_token,
                game_id,
            } => self.resign(&auth_token, game_id).await,
        }
    }

    fn reply(&self, message: ServerMessage) {
        if !self.connection.send(message) {
            debug!(connection = %self.id(), "reply dropped");
        }
    }

    /// Check the command targets the joined game and comes from the joined user
    async fn joined(
        &self,
        auth_token: &str,
        game_id: GameId,
    ) -> SessionResult<(String, JoinRole)> {
        let (joined_game, username, role) = match &self.state {
            ConnectionState::Joined {
                game_id,
                username,
                role,
            } => (*game_id, username.clone(), *role),
            _ => return Err(SessionError::bad_request("join a game first")),
        };
        if joined_game != game_id {
            return Err(SessionError::bad_request(format!(
                "not joined to game {game_id}"
            )));
        }
        if self.handler.authenticate(auth_token).await? != username {
            return Err(SessionError::Unauthorized);
        }
        Ok((username, role))
    }

    async fn connect(
        &mut self,
        auth_token: &str,
        game_id: GameId,
        role: JoinRole,
    ) -> SessionResult<()> {
        if let ConnectionState::Joined { game_id: current, .. } = &self.state {
            return Err(SessionError::bad_request(format!(
                "already joined game {current}, leave it first"
            )));
        }

        let handler = Arc::clone(&self.handler);
        let username = handler.authenticate(auth_token).await?;
        match handler.store.get_user(&username).await {
            Ok(_) => {}
            Err(StoreError::NotFound(_)) => return Err(SessionError::Unauthorized),
            Err(e) => return Err(e.into()),
        }

        let joined = self.claim_seat(&username, game_id, role).await;
        // A rejected join must not leave a lock behind for a game nobody is in
        if handler.registry.connection_count(game_id) == 0 {
            handler.locks.release_idle(game_id);
        }
        joined?;

        info!(game_id, %username, %role, connection = %self.id(), "joined");
        self.state = ConnectionState::Joined {
            game_id,
            username,
            role,
        };
        Ok(())
    }

    /// Take the requested seat under the game lock, then register and announce the connection
    async fn claim_seat(
        &self,
        username: &str,
        game_id: GameId,
        role: JoinRole,
    ) -> SessionResult<()> {
        let handler = &self.handler;
        let _guard = handler.locks.lock(game_id).await;
        let mut session = handler.load_game(game_id).await?;

        if let Some(color) = role.seat() {
            match session.seat(color) {
                Some(holder) if holder == username => {}
                Some(_) => {
                    return Err(SessionError::bad_request(format!(
                        "the {color} seat is already taken"
                    )))
                }
                None => {
                    session.set_seat(color, Some(username.to_string()));
                    handler.store.update_game(&session).await?;
                }
            }
        }

        handler.registry.add(game_id, self.connection.clone());
        self.reply(ServerMessage::load_game(session.game));
        handler.registry.broadcast(
            game_id,
            &ServerMessage::notification(format!("{username} joined as {role}")),
            Some(self.id()),
        );
        Ok(())
    }

    async fn make_move(
        &mut self,
        auth_token: &str,
        game_id: GameId,
        chess_move: Move,
    ) -> SessionResult<()> {
        let (username, _) = self.joined(auth_token, game_id).await?;
        let handler = Arc::clone(&self.handler);

        let _guard = handler.locks.lock(game_id).await;
        let mut session = handler.load_game(game_id).await?;
        if session.game.is_game_over() {
            return Err(SessionError::GameOver);
        }

        let mover = session.game.turn();
        if let Some(piece) = session.game.board().piece_at(chess_move.start) {
            if session.seat(piece.color) != Some(username.as_str()) {
                return Err(SessionError::IllegalMove(format!(
                    "you do not control the {} pieces",
                    piece.color
                )));
            }
        }

        let status = session.game.make_move(&chess_move)?;
        handler.store.update_game(&session).await?;

        info!(game_id, %username, mv = %chess_move, ?status, "move applied");
        let registry = &handler.registry;
        registry.broadcast(game_id, &ServerMessage::load_game(session.game.clone()), None);
        registry.broadcast(
            game_id,
            &ServerMessage::notification(describe_move(&username, &chess_move)),
            Some(self.id()),
        );

        let defender = mover.opponent();
        let outcome = match status {
            GameStatus::Playing => None,
            GameStatus::Check => Some(format!("{} is in check", session.player_label(defender))),
            GameStatus::Checkmate => Some(format!(
                "{} is checkmated, {} wins",
                session.player_label(defender),
                session.player_label(mover)
            )),
            GameStatus::Stalemate => Some(format!(
                "{} is stalemated, the game is a draw",
                session.player_label(defender)
            )),
        };
        if let Some(outcome) = outcome {
            registry.broadcast(game_id, &ServerMessage::notification(outcome), None);
        }
        Ok(())
    }

    async fn leave(&mut self, auth_token: &str, game_id: GameId) -> SessionResult<()> {
        let (username, role) = self.joined(auth_token, game_id).await?;
        let handler = Arc::clone(&self.handler);

        {
            let _guard = handler.locks.lock(game_id).await;
            if let Some(color) = role.seat() {
                let mut session = handler.load_game(game_id).await?;
                if session.seat(color) == Some(username.as_str()) {
                    session.set_seat(color, None);
                    handler.store.update_game(&session).await?;
                }
            }

            handler.registry.remove(game_id, self.id());
            handler.registry.broadcast(
                game_id,
                &ServerMessage::notification(format!("{username} left the game")),
                None,
            );
        }
        handler.release(game_id, self.id());

        info!(game_id, %username, connection = %self.id(), "left");
        self.state = ConnectionState::Unjoined;
        Ok(())
    }

    async fn resign(&mut self, auth_token: &str, game_id: GameId) -> SessionResult<()> {
        let (username, role) = self.joined(auth_token, game_id).await?;
        let handler = Arc::clone(&self.handler);

        {
            let _guard = handler.locks.lock(game_id).await;
            let mut session = handler.load_game(game_id).await?;
            if session.game.is_game_over() {
                return Err(SessionError::GameOver);
            }
            let color = match role.seat() {
                Some(color) if session.seat(color) == Some(username.as_str()) => color,
                _ => return Err(SessionError::bad_request("observers cannot resign")),
            };

            session.game.set_game_over();
            handler.store.update_game(&session).await?;

            handler.registry.remove(game_id, self.id());
            handler.registry.broadcast(
                game_id,
                &ServerMessage::notification(format!(
                    "{username} resigned, {} wins",
                    session.player_label(color.opponent())
                )),
                None,
            );
        }
        handler.release(game_id, self.id());

        info!(game_id, %username, connection = %self.id(), "resigned");
        self.state = ConnectionState::Unjoined;
        Ok(())
    }
}

/// "alice moved e2 to e4", with the promotion piece when there is one
fn describe_move(username: &str, chess_move: &Move) -> String {
    match chess_move.promotion {
        Some(kind) => format!(
            "{username} moved {} to {} and promoted to {kind}",
            chess_move.start, chess_move.end
        ),
        None => format!("{username} moved {} to {}", chess_move.start, chess_move.end),
    }
}
