//! Energy War: a turn-based strike game on square grids of power plants.
//!
//! Players place plants whose capacities must reach the game's required total,
//! then take turns striking opponents' grids. Destroying a plant removes all of
//! its capacity at once; a player reduced to a tenth of their capacity loses.

mod board;
mod coordinate;
mod engine;
mod error;
mod game;
mod invariants;
mod plant;
mod render;
mod validation;

pub use board::Board;
pub use coordinate::Coordinate;
pub use engine::StrikeOutcome;
pub use error::{GameError, GameErrorKind};
pub use game::{Game, GameStatus, GameView, MAX_CAPACITY, MAX_PLAYERS, MAX_SIZE, MIN_SIZE, PlayerInfo, PlayerStanding};
pub use invariants::{
    EnergyWarInvariants, Invariant, InvariantSet, InvariantViolation, PlantsDisjointInvariant,
    StrikeHistoryInvariant, TurnHolderInvariant, WinnerInvariant,
};
pub use plant::{Footprint, Plant, PlantType, ProposedPlant};
pub use render::BoardRenderer;
pub use validation::{
    BoardValidator, CAPACITY_CEILING_FACTOR, CapacityInBand, CellCountMatches, KnownPlantType,
    RectangularShape, capacity_bounds,
};
