//! Invariants that hold for every game after every mutation.
//!
//! In debug builds the engine checks them after each state change and panics
//! on any violation; tests use them directly to detect corrupted states.

use std::collections::HashSet;

use super::game::{Game, GameStatus};

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set, collecting every violation.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

impl<S, I1, I2, I3, I4> InvariantSet<S> for (I1, I2, I3, I4)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
    I3: Invariant<S>,
    I4: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let violations: Vec<InvariantViolation> = [
            (I1::holds(state), I1::description()),
            (I2::holds(state), I2::description()),
            (I3::holds(state), I3::description()),
            (I4::holds(state), I4::description()),
        ]
        .into_iter()
        .filter(|(holds, _)| !holds)
        .map(|(_, description)| InvariantViolation::new(description))
        .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// Invariant: no two plants on a board share a cell, and every cell is on the grid.
pub struct PlantsDisjointInvariant;

impl Invariant<Game> for PlantsDisjointInvariant {
    fn holds(game: &Game) -> bool {
        game.players().values().all(|info| {
            let mut seen = HashSet::new();
            info.board()
                .plants()
                .iter()
                .flat_map(|plant| plant.coordinates())
                .all(|cell| cell.in_bounds(*game.size()) && seen.insert(*cell))
        })
    }

    fn description() -> &'static str {
        "Plants on a board never overlap and stay on the grid"
    }
}

/// Invariant: a coordinate is never both a hit and a miss, nor recorded twice.
pub struct StrikeHistoryInvariant;

impl Invariant<Game> for StrikeHistoryInvariant {
    fn holds(game: &Game) -> bool {
        game.players().values().all(|info| {
            let board = info.board();
            let mut seen = HashSet::new();
            board
                .hits()
                .iter()
                .chain(board.misses())
                .all(|cell| seen.insert(*cell))
        })
    }

    fn description() -> &'static str {
        "Each struck coordinate appears once across hits and misses"
    }
}

/// Invariant: while in progress, the turn names an existing player.
pub struct TurnHolderInvariant;

impl Invariant<Game> for TurnHolderInvariant {
    fn holds(game: &Game) -> bool {
        match game.status() {
            GameStatus::InProgress => game.player(game.turn()).is_some(),
            GameStatus::Pending if game.players().is_empty() => game.turn().is_empty(),
            _ => true,
        }
    }

    fn description() -> &'static str {
        "The turn always belongs to an existing player"
    }
}

/// Invariant: a winner exists exactly when the game has ended.
pub struct WinnerInvariant;

impl Invariant<Game> for WinnerInvariant {
    fn holds(game: &Game) -> bool {
        match (game.status(), game.winner()) {
            (GameStatus::Ended, Some(winner)) => game.player(winner).is_some(),
            (GameStatus::Ended, None) => false,
            (_, winner) => winner.is_none(),
        }
    }

    fn description() -> &'static str {
        "A winner is set if and only if the game has ended"
    }
}

/// All Energy War invariants as a composable set.
pub type EnergyWarInvariants = (
    PlantsDisjointInvariant,
    StrikeHistoryInvariant,
    TurnHolderInvariant,
    WinnerInvariant,
);
