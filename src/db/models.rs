//! Row types for the `games` table and their mapping to [`Game`].

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDateTime;
use derive_getters::Getters;
use diesel::prelude::*;
use tracing::instrument;

use crate::db::{DbError, schema};
use crate::games::energy_war::{Game, GameStatus, PlayerInfo};

/// A stored game row.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::games)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct GameRecord {
    id: String,
    status: String,
    turn: String,
    winner: Option<String>,
    size: i32,
    capacity: i32,
    public: bool,
    players: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl GameRecord {
    /// Rebuilds the game aggregate from the row.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the status is unknown, the players column is not
    /// valid JSON, or the stored parameters are out of range.
    #[instrument(skip(self), fields(game_id = %self.id))]
    pub fn into_game(self) -> Result<Game, DbError> {
        let status = GameStatus::from_str(&self.status)
            .map_err(|_| DbError::new(format!("Unknown game status '{}'", self.status)))?;
        let size = usize::try_from(self.size)
            .map_err(|_| DbError::new(format!("Invalid stored size {}", self.size)))?;
        let capacity = u32::try_from(self.capacity)
            .map_err(|_| DbError::new(format!("Invalid stored capacity {}", self.capacity)))?;
        let players: BTreeMap<String, PlayerInfo> = serde_json::from_str(&self.players)?;

        let mut game = Game::new(self.id, size, capacity, self.public)
            .map_err(|e| DbError::new(format!("Stored game is invalid: {}", e.kind())))?;
        game.players_mut().extend(players);
        game.set_status(status);
        game.set_turn(&self.turn);
        if let Some(winner) = &self.winner {
            game.set_winner(winner);
        }
        Ok(game)
    }
}

/// Insertable row for a new game.
#[derive(Debug, Clone, Insertable, Getters)]
#[diesel(table_name = schema::games)]
pub struct NewGameRecord {
    id: String,
    status: String,
    turn: String,
    winner: Option<String>,
    size: i32,
    capacity: i32,
    public: bool,
    players: String,
}

/// Column updates written when a game is saved.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = schema::games)]
#[diesel(treat_none_as_null = true)]
pub struct GameChanges {
    status: String,
    turn: String,
    winner: Option<String>,
    players: String,
    updated_at: NaiveDateTime,
}

impl TryFrom<&Game> for NewGameRecord {
    type Error = DbError;

    #[track_caller]
    fn try_from(game: &Game) -> Result<Self, Self::Error> {
        Ok(Self {
            id: game.id().clone(),
            status: game.status().to_string(),
            turn: game.turn().clone(),
            winner: game.winner().clone(),
            size: i32::try_from(*game.size())
                .map_err(|_| DbError::new(format!("Size {} does not fit a column", game.size())))?,
            capacity: i32::try_from(*game.capacity()).map_err(|_| {
                DbError::new(format!("Capacity {} does not fit a column", game.capacity()))
            })?,
            public: *game.public(),
            players: serde_json::to_string(game.players())?,
        })
    }
}

impl TryFrom<&Game> for GameChanges {
    type Error = DbError;

    #[track_caller]
    fn try_from(game: &Game) -> Result<Self, Self::Error> {
        Ok(Self {
            status: game.status().to_string(),
            turn: game.turn().clone(),
            winner: game.winner().clone(),
            players: serde_json::to_string(game.players())?,
            updated_at: chrono::Utc::now().naive_utc(),
        })
    }
}
