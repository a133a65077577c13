//! Error types for Energy War game operations.

use derive_more::{Display, Error};
use tracing::instrument;

use crate::db::DbError;

/// What went wrong during a game operation.
///
/// Every kind maps to a stable wire code (see [`GameErrorKind::code`]) so the
/// transport layer can translate it into a response without string matching.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum GameErrorKind {
    /// Creation parameters or request arguments are out of range.
    #[display("Invalid parameters: {}", _0)]
    InvalidParameters(String),

    /// No game with this identifier exists.
    #[display("Game '{}' not found", _0)]
    NotFound(String),

    /// The game has no player with this name.
    #[display("Player '{}' not found", _0)]
    PlayerNotFound(String),

    /// The game has left the pending phase.
    #[display("Game already started")]
    GameAlreadyStarted,

    /// The game already holds the maximum number of players.
    #[display("Game is full (max {} players)", _0)]
    GameFull(usize),

    /// The player name is already taken in this game.
    #[display("Player '{}' already exists in this game", _0)]
    PlayerAlreadyExists(String),

    /// The player tried to get ready without placing any plants.
    #[display("Player '{}' has not placed a board", _0)]
    BoardNotSet(String),

    /// A coordinate is malformed or off the grid.
    #[display("Invalid coordinate: {}", _0)]
    InvalidCoordinate(String),

    /// A plant type name is not one of the known types.
    #[display("Invalid plant type: {}", _0)]
    InvalidPlantType(String),

    /// Two plants claim the same cell.
    #[display("Overlapping plants at {}", _0)]
    OverlappingPlants(String),

    /// A plant's cells do not form its footprint.
    #[display("Invalid plant shape: {}", _0)]
    InvalidPlantShape(String),

    /// The board's total capacity falls outside the allowed band.
    #[display("Total capacity {} should be between {} and {}", total, min, max)]
    CapacityOutOfRange {
        /// Capacity of the proposed board.
        total: u32,
        /// Smallest accepted total.
        min: u32,
        /// Largest accepted total.
        max: u32,
    },

    /// The coordinate was already struck on the target's board.
    #[display("Coordinate {} already struck", _0)]
    AlreadyStruck(String),

    /// The game is not accepting strikes.
    #[display("Game is not in progress")]
    NotInProgress,

    /// The attacker does not hold the turn.
    #[display("Not your turn, waiting for '{}'", _0)]
    NotYourTurn(String),

    /// The attacker or target is not a valid participant for this strike.
    #[display("Invalid player: {}", _0)]
    InvalidPlayer(String),

    /// The persistence layer rejected the write or read.
    #[display("Persistence failure: {}", _0)]
    PersistenceFailure(String),
}

impl GameErrorKind {
    /// Stable machine-readable code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidParameters(_) => "INVALID_PARAMETERS",
            Self::NotFound(_) => "GAME_NOT_FOUND",
            Self::PlayerNotFound(_) => "PLAYER_NOT_FOUND",
            Self::GameAlreadyStarted => "GAME_ALREADY_STARTED",
            Self::GameFull(_) => "GAME_FULL",
            Self::PlayerAlreadyExists(_) => "PLAYER_ALREADY_EXISTS",
            Self::BoardNotSet(_) => "BOARD_NOT_SET",
            Self::InvalidCoordinate(_) => "INVALID_COORDINATES",
            Self::InvalidPlantType(_) => "INVALID_PLANT_TYPE",
            Self::OverlappingPlants(_) => "OVERLAPPING_PLANTS",
            Self::InvalidPlantShape(_) => "INVALID_PLANT_SHAPE",
            Self::CapacityOutOfRange { .. } => "CAPACITY_OUT_OF_RANGE",
            Self::AlreadyStruck(_) => "ALREADY_STRUCK",
            Self::NotInProgress => "NOT_IN_PROGRESS",
            Self::NotYourTurn(_) => "NOT_YOUR_TURN",
            Self::InvalidPlayer(_) => "INVALID_PLAYER",
            Self::PersistenceFailure(_) => "PERSISTENCE_FAILURE",
        }
    }
}

/// Game error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("{} at {}:{}", kind, file, line)]
pub struct GameError {
    /// What went wrong.
    pub kind: GameErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl GameError {
    /// Creates a new game error with caller location tracking.
    #[track_caller]
    #[instrument(skip(kind), fields(code = kind.code()))]
    pub fn new(kind: GameErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> &GameErrorKind {
        &self.kind
    }

    /// Returns the wire code of the error kind.
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

impl From<GameErrorKind> for GameError {
    #[track_caller]
    fn from(kind: GameErrorKind) -> Self {
        Self::new(kind)
    }
}

impl From<DbError> for GameError {
    #[track_caller]
    fn from(err: DbError) -> Self {
        Self::new(GameErrorKind::PersistenceFailure(err.message))
    }
}
