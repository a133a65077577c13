//! The persistence seam used by the game registry.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::{debug, instrument};

use crate::db::DbError;
use crate::games::energy_war::{Game, GameStatus};

/// Single-aggregate persistence for games.
///
/// Implementations must be safe to call from several threads; the registry
/// serializes mutations itself, so no implementation needs its own locking
/// beyond what its storage requires.
pub trait GameStore: Send + Sync {
    /// Stores a new game. Fails if the id is already taken.
    fn create(&self, game: &Game) -> Result<(), DbError>;

    /// Overwrites the stored state of an existing game.
    fn save(&self, game: &Game) -> Result<(), DbError>;

    /// Loads a game by id.
    fn find_by_id(&self, id: &str) -> Result<Option<Game>, DbError>;

    /// Public games still waiting for players, ordered by id.
    fn list_public_pending(&self) -> Result<Vec<Game>, DbError>;
}

/// In-process store backed by a map. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    games: Mutex<HashMap<String, Game>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Game>> {
        self.games.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl GameStore for MemoryStore {
    #[instrument(skip(self, game), fields(game_id = %game.id()))]
    fn create(&self, game: &Game) -> Result<(), DbError> {
        let mut games = self.lock();
        if games.contains_key(game.id()) {
            return Err(DbError::new(format!("Game '{}' already exists", game.id())));
        }
        games.insert(game.id().clone(), game.clone());
        debug!("Game stored in memory");
        Ok(())
    }

    #[instrument(skip(self, game), fields(game_id = %game.id()))]
    fn save(&self, game: &Game) -> Result<(), DbError> {
        let mut games = self.lock();
        match games.get_mut(game.id()) {
            Some(stored) => {
                *stored = game.clone();
                Ok(())
            }
            None => Err(DbError::missing(game.id())),
        }
    }

    #[instrument(skip(self))]
    fn find_by_id(&self, id: &str) -> Result<Option<Game>, DbError> {
        Ok(self.lock().get(id).cloned())
    }

    #[instrument(skip(self))]
    fn list_public_pending(&self) -> Result<Vec<Game>, DbError> {
        let mut games: Vec<Game> = self
            .lock()
            .values()
            .filter(|game| *game.public() && *game.status() == GameStatus::Pending)
            .cloned()
            .collect();
        games.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(games)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_rejects_duplicate_id() {
        let store = MemoryStore::new();
        let game = Game::new("abc".into(), 5, 100, false).unwrap();
        store.create(&game).unwrap();
        assert!(store.create(&game).is_err());
    }

    #[test]
    fn test_save_requires_existing_game() {
        let store = MemoryStore::new();
        let game = Game::new("abc".into(), 5, 100, false).unwrap();
        assert!(store.save(&game).is_err());
        store.create(&game).unwrap();
        assert!(store.save(&game).is_ok());
    }

    #[test]
    fn test_list_public_pending_filters_private() {
        let store = MemoryStore::new();
        store.create(&Game::new("b".into(), 5, 100, true).unwrap()).unwrap();
        store.create(&Game::new("a".into(), 5, 100, true).unwrap()).unwrap();
        store.create(&Game::new("c".into(), 5, 100, false).unwrap()).unwrap();
        let ids: Vec<String> = store
            .list_public_pending()
            .unwrap()
            .into_iter()
            .map(|g| g.id().clone())
            .collect();
        assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
    }
}
