//! The game aggregate: status, turn, and per-player state.

use std::collections::BTreeMap;

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::instrument;

use super::board::Board;
use super::error::{GameError, GameErrorKind};

/// Smallest accepted grid size.
pub const MIN_SIZE: usize = 5;
/// Largest accepted grid size.
pub const MAX_SIZE: usize = 20;
/// Largest accepted capacity target; stored games keep it in a 32-bit column.
pub const MAX_CAPACITY: u32 = i32::MAX as u32;
/// Fixed ceiling on players per game.
pub const MAX_PLAYERS: usize = 4;

/// Lifecycle phase of a game.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    /// Players are joining and placing boards.
    Pending,
    /// Players are striking in turn.
    InProgress,
    /// A winner has been declared. Terminal.
    #[serde(rename = "END")]
    #[strum(serialize = "END")]
    Ended,
}

/// State of one player within a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct PlayerInfo {
    /// Whether the player has declared ready.
    ready: bool,
    /// Capacity at the time the board was placed.
    total_capacity: u32,
    /// Capacity still standing.
    capacity: u32,
    /// Secret issued at join time, compared by the transport on owner-only calls.
    token: String,
    /// The player's plants and strike history.
    board: Board,
}

impl PlayerInfo {
    pub(crate) fn new(token: String) -> Self {
        Self {
            ready: false,
            total_capacity: 0,
            capacity: 0,
            token,
            board: Board::default(),
        }
    }

    pub(crate) fn set_ready(&mut self) {
        self.ready = true;
    }

    pub(crate) fn place_board(&mut self, board: Board) {
        self.total_capacity = *board.total_capacity();
        self.capacity = *board.capacity();
        self.board = board;
    }

    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub(crate) fn sync_capacity(&mut self) {
        self.capacity = *self.board.capacity();
    }

    /// Returns true once the remaining capacity is at most a tenth of the total.
    pub fn is_collapsed(&self) -> bool {
        u64::from(self.capacity) * 10 <= u64::from(self.total_capacity)
    }
}

/// An Energy War game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Game {
    /// Opaque identifier.
    id: String,
    /// Lifecycle phase.
    status: GameStatus,
    /// Name of the player to strike next; empty until someone joins.
    turn: String,
    /// Set exactly when the game has ended.
    winner: Option<String>,
    /// Grid side length.
    size: usize,
    /// Minimum total capacity each board must reach.
    capacity: u32,
    /// Whether the game is listed publicly.
    public: bool,
    /// Players keyed by name; iteration order is alphabetical.
    players: BTreeMap<String, PlayerInfo>,
}

impl Game {
    /// Creates a pending game after checking the creation parameters.
    ///
    /// # Errors
    ///
    /// Returns [`GameErrorKind::InvalidParameters`] if `size` is outside
    /// `MIN_SIZE..=MAX_SIZE` or `capacity` is outside `1..=MAX_CAPACITY`.
    #[instrument]
    pub fn new(id: String, size: usize, capacity: u32, public: bool) -> Result<Self, GameError> {
        if !(MIN_SIZE..=MAX_SIZE).contains(&size) {
            return Err(GameError::new(GameErrorKind::InvalidParameters(format!(
                "size should be between {MIN_SIZE} and {MAX_SIZE}"
            ))));
        }
        if !(1..=MAX_CAPACITY).contains(&capacity) {
            return Err(GameError::new(GameErrorKind::InvalidParameters(format!(
                "capacity should be between 1 and {MAX_CAPACITY}"
            ))));
        }

        Ok(Self {
            id,
            status: GameStatus::Pending,
            turn: String::new(),
            winner: None,
            size,
            capacity,
            public,
            players: BTreeMap::new(),
        })
    }

    /// Looks up a player by name.
    pub fn player(&self, name: &str) -> Option<&PlayerInfo> {
        self.players.get(name)
    }

    /// Looks up a player by name or fails with [`GameErrorKind::PlayerNotFound`].
    pub fn require_player(&self, name: &str) -> Result<&PlayerInfo, GameError> {
        self.players
            .get(name)
            .ok_or_else(|| GameError::new(GameErrorKind::PlayerNotFound(name.to_string())))
    }

    pub(crate) fn player_mut(&mut self, name: &str) -> Result<&mut PlayerInfo, GameError> {
        self.players
            .get_mut(name)
            .ok_or_else(|| GameError::new(GameErrorKind::PlayerNotFound(name.to_string())))
    }

    pub(crate) fn players_mut(&mut self) -> &mut BTreeMap<String, PlayerInfo> {
        &mut self.players
    }

    /// Player names in turn order (alphabetical).
    pub fn turn_order(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.players.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub(crate) fn set_status(&mut self, status: GameStatus) {
        self.status = status;
    }

    pub(crate) fn set_turn(&mut self, name: &str) {
        self.turn = name.to_string();
    }

    pub(crate) fn set_winner(&mut self, name: &str) {
        self.winner = Some(name.to_string());
    }

    /// View of the game with player secrets and boards removed.
    pub fn public_view(&self) -> GameView {
        GameView {
            id: self.id.clone(),
            status: self.status,
            turn: self.turn.clone(),
            winner: self.winner.clone(),
            size: self.size,
            capacity: self.capacity,
            public: self.public,
            players: self
                .players
                .iter()
                .map(|(name, info)| {
                    (
                        name.clone(),
                        PlayerStanding {
                            ready: info.ready,
                            total_capacity: info.total_capacity,
                            capacity: info.capacity,
                        },
                    )
                })
                .collect(),
        }
    }
}

impl std::fmt::Display for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Game ID: {}", self.id)?;
        writeln!(f, "Status: {}", self.status)?;
        if self.status != GameStatus::Pending {
            writeln!(f, "Turn: {}", self.turn)?;
        }
        if let Some(winner) = &self.winner {
            writeln!(f, "Winner: {winner}")?;
        }
        writeln!(f, "Players:")?;
        for (name, info) in &self.players {
            writeln!(
                f,
                "- {}: Ready={}, Capacity={}/{}",
                name, info.ready, info.capacity, info.total_capacity
            )?;
        }
        Ok(())
    }
}

/// Public standing of one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStanding {
    /// Whether the player has declared ready.
    pub ready: bool,
    /// Capacity at the time the board was placed.
    pub total_capacity: u32,
    /// Capacity still standing.
    pub capacity: u32,
}

/// A game as shown to anyone: no secrets, no plant positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameView {
    /// Opaque identifier.
    pub id: String,
    /// Lifecycle phase.
    pub status: GameStatus,
    /// Name of the player to strike next.
    pub turn: String,
    /// Winner, once ended.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
    /// Grid side length.
    pub size: usize,
    /// Required capacity.
    pub capacity: u32,
    /// Whether the game is listed publicly.
    pub public: bool,
    /// Standings keyed by player name.
    pub players: BTreeMap<String, PlayerStanding>,
}
