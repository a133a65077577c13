//! Energy War library - a turn-based power plant strike game
//!
//! Players join a game, place power plants on a private square grid, and take
//! turns striking each other's grids. A player whose standing capacity drops to
//! a tenth of what they placed loses, and the striker wins.
//!
//! # Architecture
//!
//! - **Games**: the pure game engine (coordinates, validation, turns, rendering)
//! - **Registry**: thread-safe cache of games with persist-then-commit writes
//! - **Db**: the [`GameStore`] seam with SQLite and in-memory implementations
//! - **Server**: axum REST transport under `/api`
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use energy_war::{GameRegistry, MemoryStore, TokenPolicy};
//!
//! # fn example() -> Result<(), energy_war::GameError> {
//! let registry = GameRegistry::new(Arc::new(MemoryStore::new()), TokenPolicy::default());
//! let game = registry.create(10, 1000, false)?;
//! let token = registry.join(game.id(), "alice")?;
//! # let _ = token;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod db;
pub mod games;
pub mod registry;
pub mod server;
pub mod tokens;

pub use config::{ConfigError, ServerConfig};

pub use db::{DbError, GameRepository, GameStore, MemoryStore};

pub use games::energy_war::{
    Board, BoardRenderer, BoardValidator, Coordinate, Game, GameError, GameErrorKind, GameStatus,
    GameView, MAX_CAPACITY, Plant, PlantType, PlayerInfo, ProposedPlant, StrikeOutcome,
};

pub use registry::GameRegistry;

pub use tokens::TokenPolicy;
