//! Registry of live games backed by a [`GameStore`].
//!
//! The registry caches every game it has touched. Each mutation runs under
//! the write lock on a cloned copy; the copy is saved to the store and only
//! then replaces the cached game. A failed validation or a failed save leaves
//! both the cache and the store exactly as they were.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info, instrument, warn};

use crate::db::GameStore;
use crate::games::energy_war::{
    Board, BoardRenderer, Game, GameError, GameErrorKind, GameView, ProposedPlant, StrikeOutcome,
};
use crate::tokens::TokenPolicy;

/// Attempts at drawing an unused game id before giving up.
const MAX_ID_DRAWS: usize = 16;

/// Shared, thread-safe registry of games.
#[derive(Clone)]
pub struct GameRegistry {
    store: Arc<dyn GameStore>,
    games: Arc<RwLock<HashMap<String, Game>>>,
    tokens: TokenPolicy,
}

impl std::fmt::Debug for GameRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameRegistry")
            .field("cached", &self.read().len())
            .field("tokens", &self.tokens)
            .finish()
    }
}

impl GameRegistry {
    /// Creates a registry over `store` with an empty cache.
    #[instrument(skip(store))]
    pub fn new(store: Arc<dyn GameStore>, tokens: TokenPolicy) -> Self {
        Self {
            store,
            games: Arc::new(RwLock::new(HashMap::new())),
            tokens,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Game>> {
        self.games.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Game>> {
        self.games.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Creates, stores and caches a new pending game.
    ///
    /// # Errors
    ///
    /// [`GameErrorKind::InvalidParameters`] for a bad size or capacity,
    /// [`GameErrorKind::PersistenceFailure`] if the store rejects the game or
    /// no free id turns up.
    #[instrument(skip(self))]
    pub fn create(&self, size: usize, capacity: u32, public: bool) -> Result<Game, GameError> {
        let mut games = self.write();

        for _ in 0..MAX_ID_DRAWS {
            let id = self.tokens.game_id();
            if games.contains_key(&id) || self.store.find_by_id(&id)?.is_some() {
                warn!(game_id = %id, "Game id collision, drawing again");
                continue;
            }

            let game = Game::new(id, size, capacity, public)?;
            self.store.create(&game)?;
            games.insert(game.id().clone(), game.clone());
            info!(game_id = %game.id(), "Game created");
            return Ok(game);
        }

        Err(GameError::new(GameErrorKind::PersistenceFailure(
            "could not draw an unused game id".to_string(),
        )))
    }

    /// Returns a snapshot of the game, loading it from the store on a cache miss.
    ///
    /// # Errors
    ///
    /// [`GameErrorKind::NotFound`] if no such game exists, or
    /// [`GameErrorKind::PersistenceFailure`] if the store fails.
    #[instrument(skip(self))]
    pub fn get(&self, id: &str) -> Result<Game, GameError> {
        if let Some(game) = self.read().get(id) {
            return Ok(game.clone());
        }
        let mut games = self.write();
        self.load(&mut games, id).cloned()
    }

    fn load<'a>(
        &self,
        games: &'a mut HashMap<String, Game>,
        id: &str,
    ) -> Result<&'a Game, GameError> {
        if !games.contains_key(id) {
            let game = self
                .store
                .find_by_id(id)?
                .ok_or_else(|| GameError::new(GameErrorKind::NotFound(id.to_string())))?;
            debug!(game_id = %id, "Game loaded from store");
            games.insert(id.to_string(), game);
        }
        games
            .get(id)
            .ok_or_else(|| GameError::new(GameErrorKind::NotFound(id.to_string())))
    }

    /// Applies `op` to a copy of the game, persists the copy, then caches it.
    fn mutate<T, F>(&self, id: &str, op: F) -> Result<T, GameError>
    where
        F: FnOnce(&mut Game) -> Result<T, GameError>,
    {
        let mut games = self.write();
        let mut working = self.load(&mut games, id)?.clone();

        let value = op(&mut working)?;
        if let Err(err) = self.store.save(&working) {
            warn!(game_id = %id, error = %err, "Save failed, cached game unchanged");
            return Err(err.into());
        }

        games.insert(id.to_string(), working);
        Ok(value)
    }

    /// Adds a player and returns the secret they must present on owner-only calls.
    ///
    /// # Errors
    ///
    /// See [`Game::join`], plus [`GameErrorKind::NotFound`] and
    /// [`GameErrorKind::PersistenceFailure`].
    #[instrument(skip(self))]
    pub fn join(&self, id: &str, name: &str) -> Result<String, GameError> {
        let secret = self.tokens.secret();
        self.mutate(id, |game| game.join(name, secret.clone()))?;
        Ok(secret)
    }

    /// Validates and stores a player's board.
    ///
    /// # Errors
    ///
    /// See [`Game::set_board`].
    #[instrument(skip(self, proposed))]
    pub fn set_board(
        &self,
        id: &str,
        name: &str,
        proposed: &[ProposedPlant],
    ) -> Result<Board, GameError> {
        self.mutate(id, |game| game.set_board(name, proposed).cloned())
    }

    /// Marks a player ready. Returns true if this started the game.
    ///
    /// # Errors
    ///
    /// See [`Game::set_ready`].
    #[instrument(skip(self))]
    pub fn set_ready(&self, id: &str, name: &str) -> Result<bool, GameError> {
        self.mutate(id, |game| game.set_ready(name))
    }

    /// Resolves a strike.
    ///
    /// # Errors
    ///
    /// See [`Game::strike`].
    #[instrument(skip(self))]
    pub fn strike(
        &self,
        id: &str,
        attacker: &str,
        target: &str,
        coordinate: &str,
    ) -> Result<StrikeOutcome, GameError> {
        self.mutate(id, |game| game.strike(attacker, target, coordinate))
    }

    /// The player's full board.
    ///
    /// # Errors
    ///
    /// [`GameErrorKind::NotFound`] or [`GameErrorKind::PlayerNotFound`].
    #[instrument(skip(self))]
    pub fn board(&self, id: &str, name: &str) -> Result<Board, GameError> {
        let game = self.get(id)?;
        Ok(game.require_player(name)?.board().clone())
    }

    /// The player's board with plant positions stripped.
    ///
    /// # Errors
    ///
    /// [`GameErrorKind::NotFound`] or [`GameErrorKind::PlayerNotFound`].
    #[instrument(skip(self))]
    pub fn blind_board(&self, id: &str, name: &str) -> Result<Board, GameError> {
        let game = self.get(id)?;
        Ok(BoardRenderer::blind_projection(game.require_player(name)?.board()))
    }

    /// Text map of the player's board.
    ///
    /// # Errors
    ///
    /// [`GameErrorKind::NotFound`] or [`GameErrorKind::PlayerNotFound`].
    #[instrument(skip(self))]
    pub fn render_board(&self, id: &str, name: &str, blind: bool) -> Result<String, GameError> {
        let game = self.get(id)?;
        let board = game.require_player(name)?.board();
        Ok(BoardRenderer::render(board, *game.size(), blind))
    }

    /// The secret issued to a player at join time.
    ///
    /// # Errors
    ///
    /// [`GameErrorKind::NotFound`] or [`GameErrorKind::PlayerNotFound`].
    #[instrument(skip(self))]
    pub fn secret(&self, id: &str, name: &str) -> Result<String, GameError> {
        let game = self.get(id)?;
        Ok(game.require_player(name)?.token().clone())
    }

    /// Public games still waiting for players.
    ///
    /// # Errors
    ///
    /// [`GameErrorKind::PersistenceFailure`] if the store fails.
    #[instrument(skip(self))]
    pub fn list_public(&self) -> Result<Vec<GameView>, GameError> {
        let games = self.store.list_public_pending()?;
        debug!(count = games.len(), "Listing public games");
        Ok(games.iter().map(Game::public_view).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn registry() -> GameRegistry {
        GameRegistry::new(Arc::new(MemoryStore::new()), TokenPolicy::default())
    }

    #[test]
    fn test_create_validates_parameters() {
        let registry = registry();
        let err = registry.create(3, 100, false).unwrap_err();
        assert!(matches!(err.kind(), GameErrorKind::InvalidParameters(_)));
        assert!(registry.read().is_empty());
    }

    #[test]
    fn test_created_game_is_retrievable() {
        let registry = registry();
        let game = registry.create(10, 1000, true).unwrap();
        assert_eq!(game.id().len(), 10);
        assert_eq!(registry.get(game.id()).unwrap(), game);
    }

    #[test]
    fn test_unknown_game_is_not_found() {
        let err = registry().get("missing").unwrap_err();
        assert!(matches!(err.kind(), GameErrorKind::NotFound(_)));
    }

    #[test]
    fn test_join_returns_stored_secret() {
        let registry = registry();
        let id = registry.create(5, 100, false).unwrap().id().clone();
        let secret = registry.join(&id, "alice").unwrap();
        assert_eq!(secret.len(), 32);
        assert_eq!(registry.secret(&id, "alice").unwrap(), secret);
    }

    #[test]
    fn test_failed_validation_leaves_game_untouched() {
        let registry = registry();
        let id = registry.create(5, 100, false).unwrap().id().clone();
        registry.join(&id, "alice").unwrap();
        let before = registry.get(&id).unwrap();
        assert!(registry.join(&id, "alice").is_err());
        assert_eq!(registry.get(&id).unwrap(), before);
    }

    #[test]
    fn test_list_public_hides_private_games() {
        let registry = registry();
        let public = registry.create(5, 100, true).unwrap();
        registry.create(5, 100, false).unwrap();
        let listed = registry.list_public().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(&listed[0].id, public.id());
    }
}
