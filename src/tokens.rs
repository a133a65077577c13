//! Game identifiers and player secrets.
//!
//! Both are drawn from the operating system's CSPRNG. Lengths come from the
//! `[tokens]` section of the server configuration.

use derive_getters::Getters;
use rand::Rng;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::config::ConfigError;

/// Characters used in game identifiers.
pub const GAME_ID_ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz0123456789";

/// Characters used in player secrets.
pub const SECRET_ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Shortest secret the server accepts as configuration.
pub const MIN_SECRET_LEN: usize = 16;

/// Shortest game id the server accepts as configuration.
pub const MIN_GAME_ID_LEN: usize = 6;

/// Lengths of generated identifiers and secrets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct TokenPolicy {
    /// Characters in a game id.
    #[serde(default = "default_game_id_len")]
    game_id_len: usize,
    /// Characters in a player secret.
    #[serde(default = "default_secret_len")]
    secret_len: usize,
}

fn default_game_id_len() -> usize {
    10
}

fn default_secret_len() -> usize {
    32
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self {
            game_id_len: default_game_id_len(),
            secret_len: default_secret_len(),
        }
    }
}

impl TokenPolicy {
    /// Creates a policy after checking both lengths against their minimums.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if either length is below its minimum.
    #[instrument]
    pub fn new(game_id_len: usize, secret_len: usize) -> Result<Self, ConfigError> {
        let policy = Self {
            game_id_len,
            secret_len,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Checks both lengths against their minimums.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if either length is below its minimum.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.game_id_len < MIN_GAME_ID_LEN {
            return Err(ConfigError::new(format!(
                "tokens.game_id_len must be at least {MIN_GAME_ID_LEN}"
            )));
        }
        if self.secret_len < MIN_SECRET_LEN {
            return Err(ConfigError::new(format!(
                "tokens.secret_len must be at least {MIN_SECRET_LEN}"
            )));
        }
        Ok(())
    }

    /// Draws a fresh game id.
    pub fn game_id(&self) -> String {
        random_string(GAME_ID_ALPHABET, self.game_id_len)
    }

    /// Draws a fresh player secret.
    pub fn secret(&self) -> String {
        random_string(SECRET_ALPHABET, self.secret_len)
    }
}

fn random_string(alphabet: &str, len: usize) -> String {
    let alphabet = alphabet.as_bytes();
    let mut rng = OsRng;
    (0..len)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())] as char)
        .collect()
}
