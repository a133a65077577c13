//! State transitions for a single game.
//!
//! Every operation validates fully before touching the game, so an `Err`
//! always leaves the game exactly as it was.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::{debug, info, instrument};

use super::board::Board;
use super::coordinate::Coordinate;
use super::error::{GameError, GameErrorKind};
use super::game::{Game, GameStatus, MAX_PLAYERS, PlayerInfo};
use super::invariants::{EnergyWarInvariants, InvariantSet};
use super::plant::ProposedPlant;
use super::validation::BoardValidator;

/// Result of a strike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum StrikeOutcome {
    /// A plant was destroyed.
    Hit,
    /// Nothing stood at the coordinate.
    Miss,
}

impl Game {
    /// Adds a player holding `secret`.
    ///
    /// The first player to join takes the turn; later joins leave it alone.
    ///
    /// # Errors
    ///
    /// Checked in order: [`GameErrorKind::GameAlreadyStarted`],
    /// [`GameErrorKind::InvalidParameters`] for an empty name,
    /// [`GameErrorKind::PlayerAlreadyExists`], [`GameErrorKind::GameFull`].
    #[instrument(skip(self, secret), fields(game_id = %self.id(), player = %name))]
    pub fn join(&mut self, name: &str, secret: String) -> Result<(), GameError> {
        self.require_pending()?;
        if name.is_empty() {
            return Err(GameError::new(GameErrorKind::InvalidParameters(
                "player name should not be empty".to_string(),
            )));
        }
        if self.player(name).is_some() {
            return Err(GameError::new(GameErrorKind::PlayerAlreadyExists(
                name.to_string(),
            )));
        }
        if self.players().len() >= MAX_PLAYERS {
            return Err(GameError::new(GameErrorKind::GameFull(MAX_PLAYERS)));
        }

        let first = self.players().is_empty();
        self.players_mut()
            .insert(name.to_string(), PlayerInfo::new(secret));
        if first {
            self.set_turn(name);
        }

        info!(players = self.players().len(), "Player joined");
        self.debug_check();
        Ok(())
    }

    /// Validates and stores a player's board, replacing any earlier one.
    ///
    /// # Errors
    ///
    /// [`GameErrorKind::GameAlreadyStarted`] outside Pending,
    /// [`GameErrorKind::PlayerNotFound`], or any error from
    /// [`BoardValidator::validate`].
    #[instrument(skip(self, proposed), fields(game_id = %self.id(), player = %name))]
    pub fn set_board(&mut self, name: &str, proposed: &[ProposedPlant]) -> Result<&Board, GameError> {
        self.require_pending()?;
        self.require_player(name)?;

        let board = BoardValidator::validate(proposed, *self.size(), *self.capacity())?;
        debug!(total = board.total_capacity(), "Board accepted");

        let info = self.player_mut(name)?;
        info.place_board(board);
        self.debug_check();
        Ok(self.require_player(name)?.board())
    }

    /// Marks a player ready and starts the game once everyone is.
    ///
    /// Returns true if this call started the game.
    ///
    /// # Errors
    ///
    /// [`GameErrorKind::GameAlreadyStarted`] outside Pending,
    /// [`GameErrorKind::PlayerNotFound`], or [`GameErrorKind::BoardNotSet`] if
    /// the player has no plants.
    #[instrument(skip(self), fields(game_id = %self.id(), player = %name))]
    pub fn set_ready(&mut self, name: &str) -> Result<bool, GameError> {
        self.require_pending()?;
        if !self.require_player(name)?.board().has_plants() {
            return Err(GameError::new(GameErrorKind::BoardNotSet(name.to_string())));
        }

        self.player_mut(name)?.set_ready();

        let all_ready = self.players().values().all(|info| *info.ready());
        let started = all_ready && self.players().len() >= 2;
        if started {
            let first = self.turn_order()[0].to_string();
            self.set_status(GameStatus::InProgress);
            self.set_turn(&first);
            info!(turn = %first, "Game started");
        }

        self.debug_check();
        Ok(started)
    }

    /// Resolves a strike by `attacker` against `target` at `coordinate`.
    ///
    /// A hit destroys the whole plant at once. If the target's remaining
    /// capacity falls to a tenth of its total or below, the game ends with the
    /// attacker as winner. Otherwise the turn passes to the next player.
    ///
    /// # Errors
    ///
    /// Checked in order: [`GameErrorKind::NotInProgress`],
    /// [`GameErrorKind::NotYourTurn`], [`GameErrorKind::InvalidPlayer`] (unknown
    /// attacker or target, or a self-strike), [`GameErrorKind::InvalidCoordinate`],
    /// [`GameErrorKind::AlreadyStruck`].
    #[instrument(skip(self), fields(game_id = %self.id(), player = %attacker, target = %target))]
    pub fn strike(
        &mut self,
        attacker: &str,
        target: &str,
        coordinate: &str,
    ) -> Result<StrikeOutcome, GameError> {
        if *self.status() != GameStatus::InProgress {
            return Err(GameError::new(GameErrorKind::NotInProgress));
        }
        if self.turn() != attacker {
            return Err(GameError::new(GameErrorKind::NotYourTurn(self.turn().clone())));
        }
        if self.player(attacker).is_none() {
            return Err(GameError::new(GameErrorKind::InvalidPlayer(format!(
                "unknown attacker {attacker}"
            ))));
        }
        if self.player(target).is_none() {
            return Err(GameError::new(GameErrorKind::InvalidPlayer(format!(
                "unknown target {target}"
            ))));
        }
        if attacker == target {
            return Err(GameError::new(GameErrorKind::InvalidPlayer(format!(
                "{attacker} cannot strike their own board"
            ))));
        }

        let cell = Coordinate::validate(coordinate, *self.size())?;
        if self.require_player(target)?.board().is_struck(cell) {
            return Err(GameError::new(GameErrorKind::AlreadyStruck(cell.to_string())));
        }

        let info = self.player_mut(target)?;
        let outcome = match info.board_mut().destroy_plant_at(cell) {
            Some(destroyed) => {
                info.sync_capacity();
                debug!(%cell, destroyed, remaining = info.capacity(), "Plant destroyed");
                StrikeOutcome::Hit
            }
            None => {
                info.board_mut().record_miss(cell);
                debug!(%cell, "Strike missed");
                StrikeOutcome::Miss
            }
        };

        let collapsed = outcome == StrikeOutcome::Hit && self.require_player(target)?.is_collapsed();
        if collapsed {
            self.set_status(GameStatus::Ended);
            self.set_winner(attacker);
            info!(winner = %attacker, "Game ended");
        } else {
            let next = self.next_in_turn(attacker);
            self.set_turn(&next);
        }

        self.debug_check();
        Ok(outcome)
    }

    /// The player after `current` in cyclic alphabetical order.
    fn next_in_turn(&self, current: &str) -> String {
        let order = self.turn_order();
        let index = order.iter().position(|name| *name == current).unwrap_or(0);
        order[(index + 1) % order.len()].to_string()
    }

    fn require_pending(&self) -> Result<(), GameError> {
        if *self.status() != GameStatus::Pending {
            return Err(GameError::new(GameErrorKind::GameAlreadyStarted));
        }
        Ok(())
    }

    fn debug_check(&self) {
        if cfg!(debug_assertions) {
            if let Err(violations) = EnergyWarInvariants::check_all(self) {
                panic!("Invariant violations: {violations:?}");
            }
        }
    }
}
