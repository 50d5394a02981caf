//! Per-game serialisation of state-changing commands

use parking_lot::Mutex;
use shared::GameId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Hands out one async mutex per game. Games never contend with each other.
#[derive(Debug, Default)]
pub struct GameLocks {
    locks: Mutex<HashMap<GameId, Arc<AsyncMutex<()>>>>,
}

impl GameLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `game_id`. Held until the guard is dropped.
    pub async fn lock(&self, game_id: GameId) -> OwnedMutexGuard<()> {
        let lock = self.locks.lock().entry(game_id).or_default().clone();
        lock.lock_owned().await
    }

    /// Forget the lock of a game nobody holds or waits on
    pub fn release_idle(&self, game_id: GameId) {
        let mut locks = self.locks.lock();
        if locks
            .get(&game_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&game_id);
        }
    }

    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
