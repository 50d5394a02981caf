//! Per-game fan-out of live connections
//!
//! Each connection owns a bounded outbound queue drained by its socket writer task.
//! Broadcasting never awaits a peer: a full or closed queue counts as a failed send and
//! the connection is pruned once the fan-out is done.

use parking_lot::RwLock;
use shared::{GameId, ServerMessage};
use std::collections::HashMap;
use std::fmt;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Unique id of one live socket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sending half of a connection's outbound queue
#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnectionId,
    sender: mpsc::Sender<ServerMessage>,
}

impl Connection {
    pub fn new(sender: mpsc::Sender<ServerMessage>) -> Self {
        Self {
            id: ConnectionId::new(),
            sender,
        }
    }

    /// Create a connection together with the receiver its writer drains
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ServerMessage>) {
        let (sender, receiver) = mpsc::channel(capacity);
        (Self::new(sender), receiver)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queue a message without waiting. Returns false if the peer is gone or too slow.
    pub fn send(&self, message: ServerMessage) -> bool {
        self.sender.try_send(message).is_ok()
    }
}

/// Connections grouped by the game they joined
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    games: RwLock<HashMap<GameId, Vec<Connection>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection for a game. Re-adding the same connection is a no-op.
    pub fn add(&self, game_id: GameId, connection: Connection) {
        let mut games = self.games.write();
        let connections = games.entry(game_id).or_default();
        if !connections.iter().any(|c| c.id == connection.id) {
            connections.push(connection);
        }
    }

    /// Remove a connection. The game's entry is dropped once it has no connections left.
    pub fn remove(&self, game_id: GameId, id: ConnectionId) -> bool {
        let mut games = self.games.write();
        let Some(connections) = games.get_mut(&game_id) else {
            return false;
        };

        let before = connections.len();
        connections.retain(|c| c.id != id);
        let removed = connections.len() != before;

        if connections.is_empty() {
            games.remove(&game_id);
        }
        removed
    }

    /// Send `message` to every connection of `game_id` except `exclude`.
    ///
    /// Returns the number of connections the message was queued for. Connections whose
    /// send failed are pruned after the fan-out.
    pub fn broadcast(
        &self,
        game_id: GameId,
        message: &ServerMessage,
        exclude: Option<ConnectionId>,
    ) -> usize {
        let recipients: Vec<Connection> = match self.games.read().get(&game_id) {
            Some(connections) => connections
                .iter()
                .filter(|c| Some(c.id) != exclude)
                .cloned()
                .collect(),
            None => return 0,
        };

        let mut delivered = 0;
        let mut failed = Vec::new();
        for connection in &recipients {
            if connection.send(message.clone()) {
                delivered += 1;
            } else {
                failed.push(connection.id);
            }
        }
        debug!(game_id, delivered, failed = failed.len(), "broadcast");

        for id in failed {
            warn!(game_id, connection = %id, "pruning unreachable connection");
            self.remove(game_id, id);
        }
        delivered
    }

    pub fn connection_count(&self, game_id: GameId) -> usize {
        self.games.read().get(&game_id).map_or(0, Vec::len)
    }

    pub fn contains(&self, game_id: GameId, id: ConnectionId) -> bool {
        self.games
            .read()
            .get(&game_id)
            .is_some_and(|connections| connections.iter().any(|c| c.id == id))
    }

    /// Number of games with at least one live connection
    pub fn game_count(&self) -> usize {
        self.games.read().len()
    }
}
