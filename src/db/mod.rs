//! Persistence layer for games.

mod error;
mod models;
mod repository;
mod schema;
mod store;

pub use error::DbError;
pub use models::{GameChanges, GameRecord, NewGameRecord};
pub use repository::{GameRepository, MIGRATIONS};
pub use store::{GameStore, MemoryStore};
