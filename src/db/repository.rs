//! SQLite-backed game store.

use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument};

use crate::db::{DbError, GameChanges, GameRecord, GameStore, NewGameRecord, schema};
use crate::games::energy_war::{Game, GameStatus};

/// Schema migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Database repository for games.
///
/// Opens a fresh connection per call, so one repository can be shared across
/// threads without a pool.
#[derive(Debug, Clone)]
pub struct GameRepository {
    db_path: String,
}

impl GameRepository {
    /// Creates a new repository for the database at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the path is empty.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, DbError> {
        if db_path.is_empty() {
            return Err(DbError::new("Database path is empty"));
        }
        info!(path = %db_path, "Creating GameRepository");
        Ok(Self { db_path })
    }

    /// Applies any pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the database cannot be opened or a migration fails.
    #[instrument(skip(self))]
    pub fn run_migrations(&self) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::new(format!("Migration failed: {}", e)))?;
        info!(count = applied.len(), "Migrations applied");
        Ok(())
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        SqliteConnection::establish(&self.db_path)
            .map_err(|e| DbError::new(format!("Failed to connect to '{}': {}", self.db_path, e)))
    }
}

impl GameStore for GameRepository {
    #[instrument(skip(self, game), fields(game_id = %game.id()))]
    fn create(&self, game: &Game) -> Result<(), DbError> {
        let record = NewGameRecord::try_from(game)?;
        let mut conn = self.connection()?;

        diesel::insert_into(schema::games::table)
            .values(&record)
            .execute(&mut conn)?;

        info!(size = record.size(), capacity = record.capacity(), "Game row created");
        Ok(())
    }

    #[instrument(skip(self, game), fields(game_id = %game.id(), status = %game.status()))]
    fn save(&self, game: &Game) -> Result<(), DbError> {
        let changes = GameChanges::try_from(game)?;
        let mut conn = self.connection()?;

        let updated = diesel::update(schema::games::table.find(game.id()))
            .set(&changes)
            .execute(&mut conn)?;

        if updated == 0 {
            return Err(DbError::missing(game.id()));
        }
        debug!("Game row saved");
        Ok(())
    }

    #[instrument(skip(self))]
    fn find_by_id(&self, id: &str) -> Result<Option<Game>, DbError> {
        let mut conn = self.connection()?;

        let record: Option<GameRecord> = schema::games::table
            .find(id)
            .select(GameRecord::as_select())
            .first(&mut conn)
            .optional()?;

        match record {
            Some(record) => {
                debug!("Game row found");
                record.into_game().map(Some)
            }
            None => {
                debug!("Game row not found");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self))]
    fn list_public_pending(&self) -> Result<Vec<Game>, DbError> {
        let mut conn = self.connection()?;

        let records: Vec<GameRecord> = schema::games::table
            .filter(schema::games::public.eq(true))
            .filter(schema::games::status.eq(GameStatus::Pending.to_string()))
            .order(schema::games::id.asc())
            .select(GameRecord::as_select())
            .load(&mut conn)?;

        info!(count = records.len(), "Public games loaded");
        records.into_iter().map(GameRecord::into_game).collect()
    }
}
